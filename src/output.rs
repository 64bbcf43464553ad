//! Data carried between pipeline stages, and the report a run returns.

use image::DynamicImage;
use serde::Serialize;
use std::path::PathBuf;

/// What an extractor hands back for one document.
///
/// `text == None` means the document could not be converted at all and the
/// file is skipped. `Some(String::new())` is a successful, textless
/// extraction and still produces a Markdown file.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub text: Option<String>,
    pub images: Vec<RawImage>,
}

impl ExtractionResult {
    /// Total failure: the orchestrator skips the file.
    pub fn absent() -> Self {
        Self {
            text: None,
            images: Vec::new(),
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            images: Vec::new(),
        }
    }
}

/// A decoded image held in memory together with the file name the extractor
/// suggests for it. Names are hints; duplicates are not resolved.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub image: DynamicImage,
    pub suggested_name: String,
}

impl RawImage {
    pub fn new(image: DynamicImage, suggested_name: impl Into<String>) -> Self {
        Self {
            image,
            suggested_name: suggested_name.into(),
        }
    }
}

/// A [`RawImage`] that was written to the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedImage {
    pub path: PathBuf,
}

/// Terminal state of one discovered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Markdown written; `images_failed` counts images that could not be saved.
    Written {
        images_saved: usize,
        images_failed: usize,
    },
    /// Nothing written for this file.
    Skipped { reason: String },
}

/// Outcome of one file in the run.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, FileStatus::Written { .. })
    }
}

/// Aggregate counters for a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Supported files found under the input root.
    pub discovered: usize,
    pub written: usize,
    pub skipped: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    pub total_duration_ms: u64,
}

/// Everything a run produced, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
    pub stats: RunStats,
}

impl RunReport {
    pub(crate) fn from_outcomes(files: Vec<FileOutcome>, total_duration_ms: u64) -> Self {
        let mut stats = RunStats {
            discovered: files.len(),
            total_duration_ms,
            ..RunStats::default()
        };
        for f in &files {
            match &f.status {
                FileStatus::Written {
                    images_saved,
                    images_failed,
                } => {
                    stats.written += 1;
                    stats.images_saved += images_saved;
                    stats.images_failed += images_failed;
                }
                FileStatus::Skipped { .. } => stats.skipped += 1,
            }
        }
        Self { files, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_differ() {
        assert!(ExtractionResult::absent().text.is_none());
        assert_eq!(ExtractionResult::with_text("").text.as_deref(), Some(""));
    }

    #[test]
    fn report_counts_outcomes() {
        let files = vec![
            FileOutcome {
                input: "data/a.pdf".into(),
                output: "clean_md/a.md".into(),
                status: FileStatus::Written {
                    images_saved: 2,
                    images_failed: 1,
                },
            },
            FileOutcome {
                input: "data/b.rtf".into(),
                output: "clean_md/b.md".into(),
                status: FileStatus::Skipped {
                    reason: "conversion failed".into(),
                },
            },
        ];
        let report = RunReport::from_outcomes(files, 12);
        assert_eq!(report.stats.discovered, 2);
        assert_eq!(report.stats.written, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(report.stats.images_saved, 2);
        assert_eq!(report.stats.images_failed, 1);
    }

    #[test]
    fn outcome_serialises_flat() {
        let outcome = FileOutcome {
            input: "data/a.txt".into(),
            output: "clean_md/a.md".into(),
            status: FileStatus::Skipped {
                reason: "x".into(),
            },
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""status":"skipped""#), "got: {json}");
        assert!(json.contains(r#""reason":"x""#), "got: {json}");
    }
}
