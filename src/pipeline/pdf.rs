//! PDF extraction: per-page text plus rasterised image regions via pdfium.
//!
//! ## Why render the page and crop, instead of pulling the raw image stream?
//!
//! Raw image streams come in every colour space and filter PDF allows
//! (CMYK JPEG, JBIG2, soft masks…). Rendering the page at a fixed DPI and
//! cropping to each image object's bounding box yields exactly what a reader
//! sees, including clipping and masks, as a plain RGBA bitmap.
//!
//! The page is rendered at most once, and only if it has image objects.
//! The cost is one full-page bitmap per such page: about 35 MB for A4 at
//! 300 DPI. Oversized pages (posters, CAD sheets) are rendered below the
//! configured DPI so the longer side stays within [`MAX_RENDER_SIDE`] pixels.

use crate::config::PipelineConfig;
use crate::error::{ExtractError, ItemError};
use crate::output::{ExtractionResult, RawImage};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Longest side, in pixels, of a rendered page bitmap.
pub const MAX_RENDER_SIDE: f32 = 16384.0;

/// Extract text and images from the PDF at `path`.
///
/// Pages are joined by a blank line. If the document cannot be opened the
/// result is empty text with no images; if a later page fails, everything
/// read before it is kept.
pub fn extract(path: &Path, config: &PipelineConfig) -> ExtractionResult {
    let mut text_parts: Vec<String> = Vec::new();
    let mut images: Vec<RawImage> = Vec::new();

    if let Err(e) = extract_into(path, config, &mut text_parts, &mut images) {
        warn!("[PDF] Failed on {}: {}", path.display(), e);
    }

    ExtractionResult {
        text: Some(text_parts.join("\n\n")),
        images,
    }
}

fn extract_into(
    path: &Path,
    config: &PipelineConfig,
    text_parts: &mut Vec<String>,
    images: &mut Vec<RawImage>,
) -> Result<(), ExtractError> {
    let pdfium = bind_pdfium(config.pdfium_library_path.as_deref())?;

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ExtractError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} ({} pages)", path.display(), pages.len());

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let text = match page.text() {
            Ok(t) => t.all(),
            Err(e) => {
                debug!("Page {}: no extractable text ({:?})", page_num, e);
                String::new()
            }
        };
        text_parts.push(text);

        let regions = image_regions(&page);
        if regions.is_empty() {
            continue;
        }

        let page_width = page.width().value;
        let page_height = page.height().value;
        let scale = render_scale(page_width, page_height, config.dpi);
        if scale < config.dpi as f32 / POINTS_PER_INCH {
            debug!(
                "Page {}: {}x{} pt, rendering at {:.2} px/pt instead of {} DPI",
                page_num, page_width, page_height, scale, config.dpi
            );
        }

        let page_image = match render_page(&page, scale) {
            Ok(img) => img,
            Err(detail) => {
                warn!(
                    "Page {} of {}: render failed, dropping its {} image(s): {}",
                    page_num,
                    path.display(),
                    regions.len(),
                    detail
                );
                continue;
            }
        };

        for (i, region) in regions.into_iter().enumerate() {
            let img_num = i + 1;
            let cropped = region
                .map_err(|detail| ItemError::RenderFailed {
                    page: page_num,
                    index: img_num,
                    detail,
                })
                .and_then(|r| {
                    crop_region(&page_image, page_height, &r, scale).map_err(|detail| {
                        ItemError::RenderFailed {
                            page: page_num,
                            index: img_num,
                            detail,
                        }
                    })
                });

            match cropped {
                Ok(img) => {
                    debug!(
                        "Page {} image {} → {}x{} px",
                        page_num,
                        img_num,
                        img.width(),
                        img.height()
                    );
                    images.push(RawImage::new(img, image_name(page_num, img_num)));
                }
                Err(e) => warn!("⚠️ Skipping image {}: {}", image_name(page_num, img_num), e),
            }
        }
    }

    Ok(())
}

/// Deterministic file name for image `img_num` on page `page_num` (both 1-based).
pub fn image_name(page_num: usize, img_num: usize) -> String {
    format!("img_{}_{}.png", page_num, img_num)
}

/// Bounding box of an image object in PDF points (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

/// Bounding boxes of every image object on the page, in content-stream order.
///
/// An object whose bounds cannot be read keeps its slot (so later images keep
/// their index) but carries the error.
fn image_regions(page: &PdfPage) -> Vec<Result<Region, String>> {
    page.objects()
        .iter()
        .filter(|object| object.object_type() == PdfPageObjectType::Image)
        .map(|object| {
            object
                .bounds()
                .map(|b| Region {
                    left: b.left().value,
                    bottom: b.bottom().value,
                    right: b.right().value,
                    top: b.top().value,
                })
                .map_err(|e| format!("{:?}", e))
        })
        .collect()
}

/// Pixels per point for a page of the given size: `dpi / 72`, lowered when
/// the longer side would exceed [`MAX_RENDER_SIDE`].
pub fn render_scale(page_width_pt: f32, page_height_pt: f32, dpi: u32) -> f32 {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let longest = page_width_pt.max(page_height_pt);
    if longest * scale > MAX_RENDER_SIDE {
        MAX_RENDER_SIDE / longest
    } else {
        scale
    }
}

fn render_page(page: &PdfPage, scale: f32) -> Result<DynamicImage, String> {
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| format!("{:?}", e))?;
    Ok(bitmap.as_image())
}

/// Cut `region` out of a page rendered at `scale` pixels per point.
///
/// The region is intersected with the page; a region with no visible area
/// is an error.
pub fn crop_region(
    page_image: &DynamicImage,
    page_height: f32,
    region: &Region,
    scale: f32,
) -> Result<DynamicImage, String> {
    let width = page_image.width() as f32;
    let height = page_image.height() as f32;

    let x0 = (region.left * scale).floor().clamp(0.0, width);
    let x1 = (region.right * scale).ceil().clamp(0.0, width);
    let y0 = ((page_height - region.top) * scale).floor().clamp(0.0, height);
    let y1 = ((page_height - region.bottom) * scale).ceil().clamp(0.0, height);

    if x1 <= x0 || y1 <= y0 {
        return Err(format!(
            "image region {:?} has no visible area on the page",
            region
        ));
    }

    Ok(page_image.crop_imm(
        x0 as u32,
        y0 as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    ))
}

/// Bind to a pdfium shared library.
///
/// Resolution order: explicit path, `PDFIUM_LIB_PATH`, the working
/// directory, then the system library search path. An explicit or
/// environment path may name the library file or the folder holding it.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, ExtractError> {
    let from_env = std::env::var("PDFIUM_LIB_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let bindings = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(dir) if dir.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        }
        Some(lib) => Pdfium::bind_to_library(&lib),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    };

    bindings
        .map(Pdfium::new)
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))
}
