//! Image description via OCR.
//!
//! [`ImageDescriber`] is the engine seam: given a bitmap, return the text it
//! can read or an error. [`describe`] wraps any engine with the fixed policy
//! every caller relies on: trimmed text, a fallback sentence when nothing
//! was read, an inline error sentence when the engine failed. It always
//! returns a usable string.

use crate::error::ItemError;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Description used when OCR finds no text.
pub const NO_TEXT_FALLBACK: &str =
    "No readable text detected. Consider using a captioning model.";

/// An OCR backend.
pub trait ImageDescriber: Send + Sync {
    /// Text recognised in `image` (may be empty).
    fn recognize(&self, image: &DynamicImage) -> Result<String, ItemError>;
}

/// Describe `image`, never failing.
pub fn describe(describer: &dyn ImageDescriber, image: &DynamicImage) -> String {
    match describer.recognize(image) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                NO_TEXT_FALLBACK.to_string()
            } else {
                text.to_string()
            }
        }
        Err(e) => failure_text(&e),
    }
}

/// Describe the image stored at `path`, never failing.
pub fn describe_file(describer: &dyn ImageDescriber, path: &Path) -> String {
    match image::open(path) {
        Ok(img) => describe(describer, &img),
        Err(e) => failure_text(&e),
    }
}

fn failure_text(e: &dyn std::fmt::Display) -> String {
    format!("Failed to describe image: {e}")
}

/// Runs the `tesseract` command-line tool.
///
/// The bitmap is written to a temporary PNG, recognised with
/// `tesseract <png> stdout -l <lang>`, and the temp file is removed on drop.
#[derive(Debug, Clone)]
pub struct TesseractDescriber {
    program: PathBuf,
    language: String,
}

impl TesseractDescriber {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractDescriber {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl ImageDescriber for TesseractDescriber {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ItemError> {
        let tmp = tempfile::Builder::new()
            .prefix("docuspark-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ItemError::OcrFailed(e.to_string()))?;
        image
            .save_with_format(tmp.path(), ImageFormat::Png)
            .map_err(|e| ItemError::OcrFailed(e.to_string()))?;

        let output = Command::new(&self.program)
            .arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| ItemError::OcrFailed(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ItemError::OcrFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).replace('\x0c', "");
        debug!("OCR read {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct Fixed(Result<&'static str, &'static str>);

    impl ImageDescriber for Fixed {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, ItemError> {
            self.0
                .map(str::to_string)
                .map_err(|e| ItemError::OcrFailed(e.to_string()))
        }
    }

    fn pixel() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn recognised_text_is_trimmed() {
        assert_eq!(describe(&Fixed(Ok("  Total: 42\n\n")), &pixel()), "Total: 42");
    }

    #[test]
    fn whitespace_only_falls_back() {
        assert_eq!(describe(&Fixed(Ok(" \n\t ")), &pixel()), NO_TEXT_FALLBACK);
        assert_eq!(describe(&Fixed(Ok("")), &pixel()), NO_TEXT_FALLBACK);
    }

    #[test]
    fn engine_error_becomes_text() {
        let text = describe(&Fixed(Err("engine exploded")), &pixel());
        assert_eq!(text, "Failed to describe image: engine exploded");
    }

    #[test]
    fn unreadable_file_becomes_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png").unwrap();
        let text = describe_file(&Fixed(Ok("unused")), &path);
        assert!(text.starts_with("Failed to describe image: "), "got: {text}");
    }

    #[test]
    fn missing_tesseract_becomes_text() {
        let describer = TesseractDescriber::new("/definitely/not/tesseract", "eng");
        let text = describe(&describer, &pixel());
        assert!(text.starts_with("Failed to describe image: "), "got: {text}");
    }

    #[cfg(unix)]
    #[test]
    fn tesseract_stdout_is_used() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("tesseract");
        std::fs::write(&tool, "#!/bin/sh\nprintf 'INVOICE\\n\\f'\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let describer = TesseractDescriber::new(&tool, "eng");
        assert_eq!(describer.recognize(&pixel()).unwrap(), "INVOICE\n");
        assert_eq!(describe(&describer, &pixel()), "INVOICE");
    }
}
