//! Office Open XML package plumbing shared by the DOCX and PPTX extractors.
//!
//! A `.docx` / `.pptx` file is a zip archive of XML "parts" linked together by
//! relationship (`.rels`) parts. This module opens the archive, reads parts,
//! parses relationship lists and resolves relationship targets to part names.

use crate::error::ExtractError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const R_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// An opened OOXML package.
pub struct Package {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = ZipArchive::new(file).map_err(|source| ExtractError::Package {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }

    /// Raw bytes of the part `name` (no leading slash).
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ExtractError::MissingPart {
                    path: self.path.clone(),
                    part: name.to_string(),
                })
            }
            Err(source) => {
                return Err(ExtractError::Package {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut content)
            .map_err(|source| ExtractError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(content)
    }

    /// A part decoded as UTF-8 text (a leading BOM is dropped).
    pub fn read_xml(&mut self, name: &str) -> Result<String, ExtractError> {
        let bytes = self.read_part(name)?;
        let text = String::from_utf8(bytes).map_err(|e| ExtractError::Xml {
            part: name.to_string(),
            detail: e.to_string(),
        })?;
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    /// Relationships of `source_part`, in file order. A part without a
    /// `.rels` companion simply has no relationships.
    pub fn relationships(&mut self, source_part: &str) -> Result<Vec<Relationship>, ExtractError> {
        let rels_part = rels_path_for(source_part);
        if !self.has_part(&rels_part) {
            return Ok(Vec::new());
        }
        let xml = self.read_xml(&rels_part)?;
        parse_relationships(&xml, &rels_part)
    }
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Parse a `.rels` part. `part` is only used in error messages.
pub fn parse_relationships(xml: &str, part: &str) -> Result<Vec<Relationship>, ExtractError> {
    let doc = parse_xml(xml, part)?;
    let rels = doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .filter(|n| matches!(n.tag_name().namespace(), None | Some(RELS_NAMESPACE)))
        .filter_map(|n| {
            Some(Relationship {
                id: n.attribute("Id")?.to_string(),
                rel_type: n.attribute("Type").unwrap_or_default().to_string(),
                target: n.attribute("Target")?.to_string(),
                external: n.attribute("TargetMode") == Some("External"),
            })
        })
        .collect();
    Ok(rels)
}

pub fn parse_xml<'a>(xml: &'a str, part: &str) -> Result<roxmltree::Document<'a>, ExtractError> {
    roxmltree::Document::parse(xml).map_err(|e| ExtractError::Xml {
        part: part.to_string(),
        detail: e.to_string(),
    })
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship `target` against the part that declares it.
///
/// `("ppt/slides/slide1.xml", "../media/image1.png")` → `ppt/media/image1.png`.
/// Absolute targets (`/word/media/x.png`) are taken from the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        source_part
            .rsplit_once('/')
            .map(|(dir, _)| dir.split('/').collect())
            .unwrap_or_default()
    };

    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rels_path() {
        assert_eq!(
            rels_path_for("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for("root.xml"), "_rels/root.xml.rels");
    }

    #[test]
    fn resolve_relative_targets() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(
            resolve_target("word/document.xml", "media/image2.jpeg"),
            "word/media/image2.jpeg"
        );
        assert_eq!(
            resolve_target("word/document.xml", "./media/x.png"),
            "word/media/x.png"
        );
    }

    #[test]
    fn resolve_absolute_target() {
        assert_eq!(
            resolve_target("word/document.xml", "/word/media/image1.png"),
            "word/media/image1.png"
        );
    }

    #[test]
    fn parse_relationships_keeps_order_and_mode() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.org" TargetMode="External"/>
</Relationships>"#;
        let rels = parse_relationships(xml, "word/_rels/document.xml.rels").unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].id, "rId1");
        assert_eq!(rels[1].target, "media/image1.png");
        assert!(!rels[1].external);
        assert!(rels[2].external);
    }

    #[test]
    fn malformed_rels_is_error() {
        let err = parse_relationships("<Relationships>", "x.rels").unwrap_err();
        assert!(matches!(err, ExtractError::Xml { .. }));
    }
}
