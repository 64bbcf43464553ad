//! PPTX extraction: a `# Slide N` heading per slide, the text of every text
//! shape, and every picture shape's image.
//!
//! Slides follow the presentation's own slide list (`p:sldIdLst`), which is
//! the order a viewer shows them in; `slide10.xml` does not sort before
//! `slide2.xml`. Shapes follow the slide's shape tree order.

use crate::error::{ExtractError, ItemError};
use crate::output::{ExtractionResult, RawImage};
use crate::pipeline::ooxml::{self, Package, A_NAMESPACE, P_NAMESPACE, R_NAMESPACE};
use roxmltree::Node;
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Extract slide text and pictures from the PPTX at `path`.
///
/// If the package cannot be opened the result is empty text with no images.
/// A slide that cannot be read keeps its `# Slide N` heading and is otherwise
/// left out; the slides around it are unaffected.
pub fn extract(path: &Path) -> ExtractionResult {
    let mut text_parts: Vec<String> = Vec::new();
    let mut images: Vec<RawImage> = Vec::new();

    if let Err(e) = extract_into(path, &mut text_parts, &mut images) {
        warn!("[PPTX] Failed on {}: {}", path.display(), e);
    }

    ExtractionResult {
        text: Some(text_parts.join("\n\n")),
        images,
    }
}

fn extract_into(
    path: &Path,
    text_parts: &mut Vec<String>,
    images: &mut Vec<RawImage>,
) -> Result<(), ExtractError> {
    let mut package = Package::open(path)?;
    let slides = slide_parts(&mut package)?;
    debug!("{}: {} slides", path.display(), slides.len());

    for (idx, slide_part) in slides.iter().enumerate() {
        let slide_num = idx + 1;
        text_parts.push(format!("# Slide {}", slide_num));

        let (shapes, rels) = match read_slide(&mut package, slide_part) {
            Ok(slide) => slide,
            Err(e) => {
                warn!("[PPTX] Slide {} of {}: {}", slide_num, path.display(), e);
                continue;
            }
        };

        let mut picture_count = 0;
        for shape in shapes {
            match shape {
                Shape::Text(text) => text_parts.push(text),
                Shape::Picture { embed } => {
                    picture_count += 1;
                    let name = image_name(slide_num, picture_count);
                    let loaded = load_picture(&mut package, slide_part, &rels, embed.as_deref(), &name);
                    match loaded {
                        Ok(img) => images.push(img),
                        Err(e) => warn!("⚠️ Skipping image {}: {}", name, e),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Shapes and relationships of one slide. A failure here only costs that slide.
fn read_slide(
    package: &mut Package,
    slide_part: &str,
) -> Result<(Vec<Shape>, Vec<ooxml::Relationship>), ExtractError> {
    let xml = package.read_xml(slide_part)?;
    let shapes = slide_shapes(&xml, slide_part)?;
    let rels = package.relationships(slide_part)?;
    Ok((shapes, rels))
}

/// Name for the `ordinal`-th picture (1-based) on slide `slide_num`.
///
/// The first picture keeps the plain `img_slide{N}.png`; later pictures on
/// the same slide get a suffix so they do not overwrite it on disk.
pub fn image_name(slide_num: usize, ordinal: usize) -> String {
    if ordinal <= 1 {
        format!("img_slide{}.png", slide_num)
    } else {
        format!("img_slide{}_{}.png", slide_num, ordinal)
    }
}

/// Part names of all slides, in presentation order.
fn slide_parts(package: &mut Package) -> Result<Vec<String>, ExtractError> {
    let presentation = package
        .relationships("")?
        .into_iter()
        .find(|r| r.rel_type == OFFICE_DOCUMENT_REL)
        .map(|r| ooxml::resolve_target("", &r.target))
        .unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string());

    let xml = package.read_xml(&presentation)?;
    let ids = slide_rel_ids(&xml, &presentation)?;
    let rels = package.relationships(&presentation)?;

    let ordered: Vec<String> = ids
        .iter()
        .filter_map(|id| rels.iter().find(|r| &r.id == id))
        .map(|r| ooxml::resolve_target(&presentation, &r.target))
        .collect();

    if !ordered.is_empty() {
        return Ok(ordered);
    }

    // No slide list: fall back to numeric order of the slide part names.
    let mut fallback: Vec<(u32, String)> = package
        .part_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    fallback.sort();
    Ok(fallback.into_iter().map(|(_, name)| name).collect())
}

/// `ppt/slides/slide12.xml` → `Some(12)`.
fn slide_number(part: &str) -> Option<u32> {
    part.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// `r:id` values of `p:sldIdLst/p:sldId`, in order.
fn slide_rel_ids(xml: &str, part: &str) -> Result<Vec<String>, ExtractError> {
    let doc = ooxml::parse_xml(xml, part)?;
    let ids = doc
        .descendants()
        .filter(|n| is_p(n, "sldIdLst"))
        .flat_map(|list| list.children().filter(|n| is_p(n, "sldId")))
        .filter_map(|n| n.attribute((R_NAMESPACE, "id")).map(str::to_string))
        .collect();
    Ok(ids)
}

/// A top-level shape the extractor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A shape with a text body; paragraphs joined by `\n`.
    Text(String),
    /// A picture; `embed` is the relationship id of its image, if any.
    Picture { embed: Option<String> },
}

/// Text and picture shapes of a slide's shape tree, in order.
pub fn slide_shapes(xml: &str, part: &str) -> Result<Vec<Shape>, ExtractError> {
    let doc = ooxml::parse_xml(xml, part)?;
    let sp_tree = doc
        .root_element()
        .children()
        .find(|n| is_p(n, "cSld"))
        .and_then(|c| c.children().find(|n| is_p(n, "spTree")))
        .ok_or_else(|| ExtractError::Xml {
            part: part.to_string(),
            detail: "no <p:cSld>/<p:spTree> element".to_string(),
        })?;

    let shapes = sp_tree
        .children()
        .filter_map(|child| {
            if is_p(&child, "sp") {
                child
                    .children()
                    .find(|n| is_p(n, "txBody"))
                    .map(|body| Shape::Text(text_body(body)))
            } else if is_p(&child, "pic") {
                let embed = child
                    .descendants()
                    .find(|n| is_a(n, "blip"))
                    .and_then(|blip| blip.attribute((R_NAMESPACE, "embed")))
                    .map(str::to_string);
                Some(Shape::Picture { embed })
            } else {
                None
            }
        })
        .collect();
    Ok(shapes)
}

fn text_body(body: Node) -> String {
    body.children()
        .filter(|n| is_a(n, "p"))
        .map(|p| {
            let mut line = String::new();
            for node in p.descendants().filter(|n| n.is_element()) {
                if is_a(&node, "t") {
                    line.push_str(node.text().unwrap_or_default());
                } else if is_a(&node, "br") {
                    line.push('\n');
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn load_picture(
    package: &mut Package,
    slide_part: &str,
    rels: &[ooxml::Relationship],
    embed: Option<&str>,
    name: &str,
) -> Result<RawImage, ItemError> {
    let decode_failed = |detail: String| ItemError::DecodeFailed {
        name: name.to_string(),
        detail,
    };
    let embed = embed.ok_or_else(|| decode_failed("picture has no embedded image".into()))?;
    let rel = rels
        .iter()
        .find(|r| r.id == embed)
        .ok_or_else(|| decode_failed(format!("relationship '{embed}' not found")))?;
    if rel.external {
        return Err(decode_failed(format!("'{}' is a linked image", rel.target)));
    }
    let part = ooxml::resolve_target(slide_part, &rel.target);
    let bytes = package
        .read_part(&part)
        .map_err(|e| decode_failed(e.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|e| decode_failed(e.to_string()))?;
    Ok(RawImage::new(img, name))
}

fn is_p(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(P_NAMESPACE)
}

fn is_a(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(A_NAMESPACE)
}
