//! DOCX extraction: body paragraphs as lines, plus every image the main
//! document part links to.
//!
//! Image names use a 1-based counter over *all* relationships of the main
//! part, not just image ones, so an image's name stays tied to its position
//! in the relationship list (`img_3.png` is always the third relationship).

use crate::error::{ExtractError, ItemError};
use crate::output::{ExtractionResult, RawImage};
use crate::pipeline::ooxml::{self, Package, W_NAMESPACE};
use roxmltree::Node;
use std::path::Path;
use tracing::warn;

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Extract paragraph text and embedded images from the DOCX at `path`.
///
/// On an open/parse failure the result is empty text with no images.
pub fn extract(path: &Path) -> ExtractionResult {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut images: Vec<RawImage> = Vec::new();

    if let Err(e) = extract_into(path, &mut paragraphs, &mut images) {
        warn!("[DOCX] Failed on {}: {}", path.display(), e);
    }

    ExtractionResult {
        text: Some(paragraphs.join("\n")),
        images,
    }
}

fn extract_into(
    path: &Path,
    paragraphs: &mut Vec<String>,
    images: &mut Vec<RawImage>,
) -> Result<(), ExtractError> {
    let mut package = Package::open(path)?;
    let main_part = main_document_part(&mut package)?;

    let xml = package.read_xml(&main_part)?;
    paragraphs.extend(body_paragraphs(&xml, &main_part)?);

    for (idx, rel) in package.relationships(&main_part)?.iter().enumerate() {
        if !rel.target.contains("image") {
            continue;
        }
        let name = image_name(idx + 1);
        match load_image(&mut package, &main_part, rel, &name) {
            Ok(img) => images.push(img),
            Err(e) => warn!("⚠️ Skipping image {}: {}", name, e),
        }
    }

    Ok(())
}

/// `img_{n}.png` for the n-th relationship (1-based).
pub fn image_name(rel_index: usize) -> String {
    format!("img_{}.png", rel_index)
}

fn main_document_part(package: &mut Package) -> Result<String, ExtractError> {
    let root_rels = package.relationships("")?;
    Ok(root_rels
        .into_iter()
        .find(|r| r.rel_type == OFFICE_DOCUMENT_REL)
        .map(|r| ooxml::resolve_target("", &r.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
}

fn load_image(
    package: &mut Package,
    main_part: &str,
    rel: &ooxml::Relationship,
    name: &str,
) -> Result<RawImage, ItemError> {
    let decode_failed = |detail: String| ItemError::DecodeFailed {
        name: name.to_string(),
        detail,
    };
    if rel.external {
        return Err(decode_failed(format!(
            "'{}' is an external link, not an embedded part",
            rel.target
        )));
    }
    let part = ooxml::resolve_target(main_part, &rel.target);
    let bytes = package
        .read_part(&part)
        .map_err(|e| decode_failed(e.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|e| decode_failed(e.to_string()))?;
    Ok(RawImage::new(img, name))
}

/// Text of every paragraph that is a direct child of `w:body`, in order.
pub fn body_paragraphs(xml: &str, part: &str) -> Result<Vec<String>, ExtractError> {
    let doc = ooxml::parse_xml(xml, part)?;
    let body = doc
        .root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| ExtractError::Xml {
            part: part.to_string(),
            detail: "no <w:body> element".to_string(),
        })?;

    Ok(body
        .children()
        .filter(|n| is_w(n, "p"))
        .map(|p| {
            let mut text = String::new();
            collect_run_text(p, &mut text);
            text
        })
        .collect())
}

/// Concatenate the visible run text under `node`.
///
/// Paragraph/run properties hold tab *stops*, not tabs, and text boxes are
/// separate stories, so those subtrees are skipped.
fn collect_run_text(node: Node, out: &mut String) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(W_NAMESPACE) {
            collect_run_text(child, out);
            continue;
        }
        match child.tag_name().name() {
            "pPr" | "rPr" | "txbxContent" => {}
            "t" => out.push_str(child.text().unwrap_or_default()),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            "noBreakHyphen" => out.push('-'),
            _ => collect_run_text(child, out),
        }
    }
}

fn is_w(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(W_NAMESPACE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NAMESPACE}"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn paragraphs_in_order() {
        let xml = document(
            "<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space=\"preserve\"> world</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        let paras = body_paragraphs(&xml, "word/document.xml").unwrap();
        assert_eq!(paras, vec!["Hello world", "", "Second"]);
    }

    #[test]
    fn tabs_and_breaks() {
        let xml = document(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>",
        );
        let paras = body_paragraphs(&xml, "word/document.xml").unwrap();
        assert_eq!(paras, vec!["a\tb\nc"]);
    }

    #[test]
    fn hyperlink_runs_are_included() {
        let xml = document(
            "<w:p><w:r><w:t>see </w:t></w:r><w:hyperlink><w:r><w:t>here</w:t></w:r></w:hyperlink></w:p>",
        );
        let paras = body_paragraphs(&xml, "word/document.xml").unwrap();
        assert_eq!(paras, vec!["see here"]);
    }

    #[test]
    fn table_paragraphs_are_not_body_paragraphs() {
        let xml = document(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        let paras = body_paragraphs(&xml, "word/document.xml").unwrap();
        assert_eq!(paras, vec!["before", "after"]);
    }

    #[test]
    fn missing_body_is_error() {
        let xml = format!(r#"<w:document xmlns:w="{W_NAMESPACE}"/>"#);
        assert!(body_paragraphs(&xml, "word/document.xml").is_err());
    }

    #[test]
    fn image_names() {
        assert_eq!(image_name(1), "img_1.png");
        assert_eq!(image_name(7), "img_7.png");
    }

    #[test]
    fn unreadable_file_gives_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();
        let result = extract(&path);
        assert_eq!(result.text.as_deref(), Some(""));
        assert!(result.images.is_empty());
    }
}
