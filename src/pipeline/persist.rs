//! Persist extracted images as PNG files under a document's `images` folder.

use crate::error::ItemError;
use crate::output::{RawImage, SavedImage};
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use tracing::{debug, warn};

/// Name of the per-document image folder.
pub const IMAGES_DIR: &str = "images";

/// Result of persisting one document's images.
#[derive(Debug, Default)]
pub struct Persisted {
    /// Successfully written images, in extraction order.
    pub saved: Vec<SavedImage>,
    /// Images that could not be written.
    pub failed: usize,
}

/// Write every image into `<doc_dir>/images/`, in order.
///
/// The folder is created only when there is something to write. A failed
/// write is logged and left out of [`Persisted::saved`]; it does not stop the
/// remaining images. Later images with the same name overwrite earlier ones.
pub fn save_images(images: &[RawImage], doc_dir: &Path) -> Persisted {
    let mut result = Persisted::default();
    if images.is_empty() {
        return result;
    }

    let img_dir = doc_dir.join(IMAGES_DIR);
    if let Err(e) = std::fs::create_dir_all(&img_dir) {
        warn!(
            "Failed to create image folder {}: {}; dropping {} image(s)",
            img_dir.display(),
            e,
            images.len()
        );
        result.failed = images.len();
        return result;
    }

    for raw in images {
        match save_one(raw, &img_dir) {
            Ok(saved) => {
                debug!("Saved image {}", saved.path.display());
                result.saved.push(saved);
            }
            Err(e) => {
                warn!("⚠️ Failed to save image {}: {}", raw.suggested_name, e);
                result.failed += 1;
            }
        }
    }

    result
}

fn save_one(raw: &RawImage, img_dir: &Path) -> Result<SavedImage, ItemError> {
    let path = img_dir.join(&raw.suggested_name);
    // PNG has no floating-point colour types.
    let widened;
    let image = match &raw.image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            widened = DynamicImage::ImageRgba8(raw.image.to_rgba8());
            &widened
        }
        other => other,
    };
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| ItemError::SaveFailed {
            path: path.clone(),
            source,
        })?;
    Ok(SavedImage { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb32FImage;

    fn rgb(name: &str) -> RawImage {
        RawImage::new(DynamicImage::new_rgb8(3, 2), name)
    }

    #[test]
    fn no_images_creates_no_folder() {
        let dir = tempfile::tempdir().unwrap();
        let p = save_images(&[], dir.path());
        assert!(p.saved.is_empty());
        assert!(!dir.path().join(IMAGES_DIR).exists());
    }

    #[test]
    fn saves_in_order_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let p = save_images(&[rgb("img_1_1.png"), rgb("img_2_1.png")], dir.path());
        assert_eq!(p.failed, 0);
        let names: Vec<_> = p
            .saved
            .iter()
            .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["img_1_1.png", "img_2_1.png"]);
        let reopened = image::open(&p.saved[0].path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (3, 2));
    }

    #[test]
    fn failed_save_is_excluded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // The name points into a folder that does not exist, so the write fails.
        let p = save_images(
            &[rgb("a.png"), rgb("missing/bad.png"), rgb("b.png")],
            dir.path(),
        );
        assert_eq!(p.failed, 1);
        assert_eq!(p.saved.len(), 2);
        assert!(p.saved[1].path.ends_with("b.png"));
    }

    #[test]
    fn float_images_are_narrowed() {
        let dir = tempfile::tempdir().unwrap();
        let float = RawImage::new(DynamicImage::ImageRgb32F(Rgb32FImage::new(2, 2)), "f.png");
        let p = save_images(&[float], dir.path());
        assert_eq!(p.failed, 0);
        assert!(image::open(&p.saved[0].path).is_ok());
    }

    #[test]
    fn duplicate_names_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let p = save_images(&[rgb("img_1.png"), rgb("img_1.png")], dir.path());
        assert_eq!(p.saved.len(), 2);
        assert_eq!(p.saved[0], p.saved[1]);
    }
}
