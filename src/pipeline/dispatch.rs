//! Format dispatch: lowercase extension → exactly one extractor.
//!
//! The set of formats is closed, so it is an enum plus a lookup table rather
//! than a registry of trait objects. Adding a format means adding a variant,
//! a table row and a match arm; the compiler finds every place that needs it.

use crate::config::PipelineConfig;
use crate::output::ExtractionResult;
use crate::pipeline::{docx, generic, pdf, pptx};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// The four extractor families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    /// TXT, HTML and RTF, converted by pandoc.
    Generic,
}

/// Extension (lowercase, with dot) → kind.
const EXTENSION_TABLE: &[(&str, DocumentKind)] = &[
    (".pdf", DocumentKind::Pdf),
    (".docx", DocumentKind::Docx),
    (".pptx", DocumentKind::Pptx),
    (".txt", DocumentKind::Generic),
    (".html", DocumentKind::Generic),
    (".htm", DocumentKind::Generic),
    (".rtf", DocumentKind::Generic),
];

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Pdf,
        DocumentKind::Docx,
        DocumentKind::Pptx,
        DocumentKind::Generic,
    ];

    /// Look up an extension such as `".PDF"` or `"pdf"`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        let dotted = if ext.starts_with('.') {
            ext
        } else {
            format!(".{ext}")
        };
        EXTENSION_TABLE
            .iter()
            .find(|(e, _)| *e == dotted)
            .map(|(_, kind)| *kind)
    }

    /// Kind of the file at `path`, or `None` for unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// All extensions that map to this kind.
    pub fn extensions(self) -> impl Iterator<Item = &'static str> {
        EXTENSION_TABLE
            .iter()
            .filter(move |(_, k)| *k == self)
            .map(|(e, _)| *e)
    }

    /// Short label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Pptx => "PPTX",
            DocumentKind::Generic => "Pandoc",
        }
    }
}

/// Run the extractor for `kind` on `path`.
///
/// Extractors never return `Err`: document-level failures are already logged
/// and folded into the returned [`ExtractionResult`].
pub fn dispatch(kind: DocumentKind, path: &Path, config: &PipelineConfig) -> ExtractionResult {
    debug!("Dispatching {} to {} extractor", path.display(), kind.label());
    match kind {
        DocumentKind::Pdf => pdf::extract(path, config),
        DocumentKind::Docx => docx::extract(path),
        DocumentKind::Pptx => pptx::extract(path),
        DocumentKind::Generic => generic::extract(path, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(DocumentKind::from_extension(".PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_extension(".Pptx"), Some(DocumentKind::Pptx));
        assert_eq!(DocumentKind::from_extension(".HTM"), Some(DocumentKind::Generic));
    }

    #[test]
    fn unsupported_extensions() {
        assert_eq!(DocumentKind::from_extension(".csv"), None);
        assert_eq!(DocumentKind::from_extension(".doc"), None);
        assert_eq!(DocumentKind::from_extension(""), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
        assert_eq!(DocumentKind::from_path(Path::new("notes.md")), None);
    }

    #[test]
    fn from_path_uses_last_extension() {
        assert_eq!(
            DocumentKind::from_path(Path::new("dir.pdf/report.final.RTF")),
            Some(DocumentKind::Generic)
        );
    }

    #[test]
    fn generic_covers_four_extensions() {
        let exts: Vec<_> = DocumentKind::Generic.extensions().collect();
        assert_eq!(exts, vec![".txt", ".html", ".htm", ".rtf"]);
        assert_eq!(DocumentKind::Pdf.extensions().count(), 1);
    }
}
