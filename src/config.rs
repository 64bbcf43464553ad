//! Configuration for a docuspark run.
//!
//! Every knob lives in [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The orchestrator receives the config as a value,
//! so tests can point the pipeline at any pair of temporary roots.

use crate::error::DocuSparkError;
use crate::pipeline::describe::ImageDescriber;
use crate::pipeline::dispatch::DocumentKind;
use crate::progress::PipelineProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one pipeline run.
///
/// # Example
/// ```rust
/// use docuspark::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_root("data")
///     .output_root("clean_md")
///     .dpi(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_language, "eng");
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Root of the tree to convert. Default: `data`.
    pub input_root: PathBuf,

    /// Root of the mirrored Markdown tree. Default: `clean_md`.
    pub output_root: PathBuf,

    /// Document kinds that are processed; files of any other kind are
    /// silently ignored. Default: all kinds.
    pub enabled_kinds: Vec<DocumentKind>,

    /// Resolution used when rasterising image regions of PDF pages. Default: 300.
    pub dpi: u32,

    /// Tesseract language code. Default: `eng`.
    pub ocr_language: String,

    /// Tesseract executable. Default: `tesseract` (looked up on `PATH`).
    pub tesseract_path: PathBuf,

    /// Pandoc executable used for TXT/HTML/RTF. Default: `pandoc`.
    pub pandoc_path: PathBuf,

    /// Explicit pdfium shared library. If `None`, `PDFIUM_LIB_PATH` is
    /// consulted, then the working directory, then the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Number of files converted at the same time. Default: 1 (sequential).
    ///
    /// Files sharing an output folder still run one after another, so
    /// raising this never changes output content; only the interleaving of
    /// log lines and progress events differs.
    pub concurrency: usize,

    /// Pre-constructed describer. Takes precedence over the tesseract default.
    pub describer: Option<Arc<dyn ImageDescriber>>,

    /// Optional per-file progress events.
    pub progress_callback: Option<Arc<dyn PipelineProgressCallback>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("data"),
            output_root: PathBuf::from("clean_md"),
            enabled_kinds: DocumentKind::ALL.to_vec(),
            dpi: 300,
            ocr_language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            pandoc_path: PathBuf::from("pandoc"),
            pdfium_library_path: None,
            concurrency: 1,
            describer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("input_root", &self.input_root)
            .field("output_root", &self.output_root)
            .field("enabled_kinds", &self.enabled_kinds)
            .field("dpi", &self.dpi)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_path", &self.tesseract_path)
            .field("pandoc_path", &self.pandoc_path)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("concurrency", &self.concurrency)
            .field(
                "describer",
                &self.describer.as_ref().map(|_| "<dyn ImageDescriber>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether files of `kind` take part in this run.
    pub fn is_enabled(&self, kind: DocumentKind) -> bool {
        self.enabled_kinds.contains(&kind)
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn input_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_root = path.into();
        self
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_root = path.into();
        self
    }

    pub fn enabled_kinds(mut self, kinds: impl IntoIterator<Item = DocumentKind>) -> Self {
        let mut kinds: Vec<DocumentKind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        self.config.enabled_kinds = kinds;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = path.into();
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn describer(mut self, describer: Arc<dyn ImageDescriber>) -> Self {
        self.config.describer = Some(describer);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn PipelineProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, DocuSparkError> {
        let c = &self.config;
        if c.input_root.as_os_str().is_empty() || c.output_root.as_os_str().is_empty() {
            return Err(DocuSparkError::InvalidConfig(
                "input and output roots must be non-empty paths".into(),
            ));
        }
        if c.input_root == c.output_root {
            return Err(DocuSparkError::InvalidConfig(format!(
                "input and output roots must differ, both are '{}'",
                c.input_root.display()
            )));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(DocuSparkError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.enabled_kinds.is_empty() {
            return Err(DocuSparkError::InvalidConfig(
                "at least one document kind must be enabled".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_deployment() {
        let c = PipelineConfig::default();
        assert_eq!(c.input_root, PathBuf::from("data"));
        assert_eq!(c.output_root, PathBuf::from("clean_md"));
        assert_eq!(c.dpi, 300);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.enabled_kinds.len(), 4);
    }

    #[test]
    fn builder_clamps_dpi_and_concurrency() {
        let c = PipelineConfig::builder()
            .dpi(10)
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 72);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn builder_rejects_same_roots() {
        let err = PipelineConfig::builder()
            .input_root("x")
            .output_root("x")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must differ"), "got: {err}");
    }

    #[test]
    fn builder_rejects_no_kinds() {
        let err = PipelineConfig::builder()
            .enabled_kinds(Vec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, DocuSparkError::InvalidConfig(_)));
    }

    #[test]
    fn restricting_kinds() {
        let c = PipelineConfig::builder()
            .enabled_kinds([DocumentKind::Pdf, DocumentKind::Pdf])
            .build()
            .unwrap();
        assert!(c.is_enabled(DocumentKind::Pdf));
        assert!(!c.is_enabled(DocumentKind::Docx));
        assert_eq!(c.enabled_kinds.len(), 1);
    }
}
