//! Markdown assembly: append an "Extracted Images" section to the text.
//!
//! Layout (pieces joined by `\n`):
//!
//! ```text
//! <base text>
//!
//!
//! ## Extracted Images
//!
//! ![Figure 1](sub/images/img_1_1.png)
//! **Description:** <OCR text>
//!
//! ![Figure 2](…)
//! …
//! ```
//!
//! Links are relative to the output root and always use `/`.

use crate::output::SavedImage;
use crate::pipeline::describe::{describe_file, ImageDescriber};
use std::path::{Component, Path};

/// Merge `base_text` with the saved images of one document.
///
/// With no images the text is returned unchanged. Figures are numbered from
/// 1 in the order of `images`.
pub fn assemble(
    base_text: &str,
    images: &[SavedImage],
    output_root: &Path,
    describer: &dyn ImageDescriber,
) -> String {
    if images.is_empty() {
        return base_text.to_string();
    }

    let mut lines: Vec<String> = Vec::with_capacity(2 + images.len() * 2);
    lines.push(base_text.to_string());
    lines.push("\n\n## Extracted Images\n".to_string());

    for (idx, saved) in images.iter().enumerate() {
        let rel = relative_link(&saved.path, output_root);
        lines.push(format!("![Figure {}]({})", idx + 1, rel));
        let description = describe_file(describer, &saved.path);
        lines.push(format!("**Description:** {}\n", description));
    }

    lines.join("\n")
}

/// `path` relative to `base`, lexically, with `/` separators.
///
/// Both paths are expected to be spelled the same way (both relative to the
/// working directory, or both absolute); no file system access is made.
pub fn relative_link(path: &Path, base: &Path) -> String {
    let path: Vec<Component> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base: Vec<Component> = base.components().filter(|c| *c != Component::CurDir).collect();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat("..".to_string()).take(base.len() - common);
    let downs = path[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());

    let parts: Vec<String> = ups.chain(downs).collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use image::DynamicImage;
    use std::path::PathBuf;

    struct Echo(&'static str);

    impl ImageDescriber for Echo {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, ItemError> {
            Ok(self.0.to_string())
        }
    }

    fn write_png(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::new_rgb8(2, 2).save(path).unwrap();
    }

    #[test]
    fn no_images_returns_text_unchanged() {
        let out = assemble("hello\n", &[], Path::new("clean_md"), &Echo("x"));
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn exact_layout_for_two_figures() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("clean_md");
        let a = root.join("images/img_1_1.png");
        let b = root.join("images/img_2_1.png");
        write_png(&a);
        write_png(&b);

        let saved = vec![SavedImage { path: a }, SavedImage { path: b }];
        let out = assemble("Body", &saved, &root, &Echo("  CHART  "));
        assert_eq!(
            out,
            "Body\n\n\n## Extracted Images\n\n\
             ![Figure 1](images/img_1_1.png)\n**Description:** CHART\n\n\
             ![Figure 2](images/img_2_1.png)\n**Description:** CHART\n"
        );
    }

    #[test]
    fn nested_document_links_from_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("clean_md");
        let img = root.join("a/b/c/images/img_slide1.png");
        write_png(&img);

        let out = assemble("", &[SavedImage { path: img }], &root, &Echo(""));
        assert!(out.contains("![Figure 1](a/b/c/images/img_slide1.png)"), "got: {out}");
        assert!(out.contains("No readable text detected."), "got: {out}");
    }

    #[test]
    fn unreadable_image_still_gets_a_figure() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let bad = root.join("images/img_1.png");
        std::fs::create_dir_all(bad.parent().unwrap()).unwrap();
        std::fs::write(&bad, b"garbage").unwrap();

        let out = assemble("t", &[SavedImage { path: bad }], &root, &Echo("x"));
        assert!(out.contains("![Figure 1](images/img_1.png)"));
        assert!(out.contains("**Description:** Failed to describe image: "));
    }

    #[test]
    fn relative_link_cases() {
        assert_eq!(
            relative_link(Path::new("clean_md/x/images/i.png"), Path::new("clean_md")),
            "x/images/i.png"
        );
        assert_eq!(
            relative_link(Path::new("./clean_md/i.png"), Path::new("clean_md")),
            "i.png"
        );
        assert_eq!(
            relative_link(Path::new("other/i.png"), Path::new("clean_md")),
            "../other/i.png"
        );
        assert_eq!(relative_link(&PathBuf::from("clean_md"), Path::new("clean_md")), ".");
    }
}
