//! # docuspark
//!
//! Turn a folder tree of mixed documents into a mirrored tree of Markdown
//! files, ready for search indexing or LLM ingestion.
//!
//! Every image found in a document is saved as a PNG next to its Markdown
//! file and described with OCR text, so figures stay searchable.
//!
//! ## Pipeline Overview
//!
//! ```text
//! data/                                   clean_md/
//!  ├─ report.pdf   ─┐                      ├─ report.md
//!  └─ deck/         │  1. Discover          ├─ images/img_1_1.png
//!      └─ q3.pptx  ─┤  2. Dispatch by ext   └─ deck/
//!                   │  3. Extract text        ├─ q3.md
//!                   │     + images            └─ images/img_slide2.png
//!                   │  4. Save PNGs
//!                   └─ 5. Append figures + OCR descriptions, write .md
//! ```
//!
//! | Extension              | Extractor                     |
//! |------------------------|-------------------------------|
//! | `.pdf`                 | pdfium (text + cropped images) |
//! | `.docx`                | OOXML paragraphs + media      |
//! | `.pptx`                | OOXML slides + pictures       |
//! | `.txt .html .htm .rtf` | external `pandoc`             |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docuspark::{run, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .input_root("data")
//!         .output_root("clean_md")
//!         .build()?;
//!     let report = run(&config).await?;
//!     eprintln!("{} written, {} skipped", report.stats.written, report.stats.skipped);
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! - `pdfium` shared library, bound at runtime (`PDFIUM_LIB_PATH`, `./`, or system)
//! - `tesseract` on `PATH` for image descriptions
//! - `pandoc` on `PATH` for text, HTML and RTF
//!
//! A missing tool only affects the files or images that need it.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docuspark` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use convert::{convert_file, run, run_sync};
pub use error::{DocuSparkError, ExtractError, ItemError};
pub use output::{
    ExtractionResult, FileOutcome, FileStatus, RawImage, RunReport, RunStats, SavedImage,
};
pub use pipeline::describe::{ImageDescriber, TesseractDescriber};
pub use pipeline::discover::SourceDocument;
pub use pipeline::dispatch::DocumentKind;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
