//! Run entry points: walk the input tree and convert every supported file.
//!
//! Per file the states are
//! `Discovered → Dispatched → Extracted → ImagesPersisted → Assembled → Written`,
//! or `Skipped` when extraction yields no text (or the Markdown cannot be
//! written). Only a missing input root fails the whole run.
//!
//! Extraction, OCR and conversion are blocking calls into native libraries
//! and subprocesses, so each file runs on tokio's blocking pool. With the
//! default `concurrency = 1` files are handled strictly one after another.
//! Above that, files in different output folders overlap; files that share
//! a folder always run in discovery order.

use crate::config::PipelineConfig;
use crate::error::DocuSparkError;
use crate::output::{FileOutcome, FileStatus, RunReport};
use crate::pipeline::assemble::assemble;
use crate::pipeline::describe::{ImageDescriber, TesseractDescriber};
use crate::pipeline::discover::{discover, SourceDocument};
use crate::pipeline::dispatch::dispatch;
use crate::pipeline::persist::save_images;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Convert every supported file under `config.input_root`.
///
/// # Returns
/// `Ok(RunReport)` once every file has been attempted, even if some were
/// skipped (check `report.stats.skipped`). Outcomes are in discovery order
/// regardless of `concurrency`.
///
/// # Errors
/// Only fatal conditions: the input root does not exist or cannot be listed.
/// Nothing is written in that case.
pub async fn run(config: &PipelineConfig) -> Result<RunReport, DocuSparkError> {
    let total_start = Instant::now();
    info!(
        "Starting DocuSpark ingestion: {} → {}",
        config.input_root.display(),
        config.output_root.display()
    );

    // ── Step 1: Discover ─────────────────────────────────────────────────
    let discover_config = config.clone();
    let documents = tokio::task::spawn_blocking(move || discover(&discover_config))
        .await
        .map_err(|e| DocuSparkError::Internal(format!("Discovery task panicked: {}", e)))??;
    let total = documents.len();
    info!("Found {} supported file(s)", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── Step 2: Convert each file ────────────────────────────────────────
    // Files that share an output folder share Markdown and image names
    // (`a.docx` and `a.pptx` both write `a.md`), so each folder is one
    // sequential chain and only distinct folders run in parallel.
    let describer = resolve_describer(config);
    let groups = group_by_output_dir(documents, &config.output_root);
    debug!("{} output folder(s)", groups.len());

    let mut indexed: Vec<(usize, FileOutcome)> = stream::iter(groups.into_iter().map(|group| {
        let config = config.clone();
        let describer = Arc::clone(&describer);
        async move {
            let mut done = Vec::with_capacity(group.len());
            for (i, doc) in group {
                let outcome = convert_one(doc, i + 1, total, &config, &describer).await;
                done.push((i, outcome));
            }
            done
        }
    }))
    .buffered(config.concurrency)
    .flat_map(stream::iter)
    .collect()
    .await;
    indexed.sort_by_key(|(i, _)| *i);
    let outcomes: Vec<FileOutcome> = indexed.into_iter().map(|(_, o)| o).collect();

    // ── Step 3: Report ───────────────────────────────────────────────────
    let report = RunReport::from_outcomes(outcomes, total_start.elapsed().as_millis() as u64);
    info!(
        "Done! {} written, {} skipped, {} image(s) saved in {}ms → '{}'",
        report.stats.written,
        report.stats.skipped,
        report.stats.images_saved,
        report.stats.total_duration_ms,
        config.output_root.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(report.stats.written, report.stats.skipped);
    }

    Ok(report)
}

/// Split documents into chains keyed by output folder, in order of first
/// appearance. Each entry keeps its discovery index.
fn group_by_output_dir(
    documents: Vec<SourceDocument>,
    output_root: &Path,
) -> Vec<Vec<(usize, SourceDocument)>> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut groups: Vec<Vec<(usize, SourceDocument)>> = Vec::new();
    for (i, doc) in documents.into_iter().enumerate() {
        let slot = *slots
            .entry(doc.output_dir(output_root))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[slot].push((i, doc));
    }
    groups
}

/// One file on the blocking pool, with its progress callbacks.
async fn convert_one(
    doc: SourceDocument,
    index: usize,
    total: usize,
    config: &PipelineConfig,
    describer: &Arc<dyn ImageDescriber>,
) -> FileOutcome {
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(&doc.path, index, total);
    }
    let input = doc.path.clone();
    let output = doc.markdown_path(&config.output_root);

    let task_config = config.clone();
    let describer = Arc::clone(describer);
    let outcome = tokio::task::spawn_blocking(move || {
        convert_file(&doc, &task_config, describer.as_ref())
    })
    .await
    .unwrap_or_else(|e| {
        error!("Worker for {} panicked: {}", input.display(), e);
        FileOutcome {
            input,
            output,
            status: FileStatus::Skipped {
                reason: format!("worker panicked: {e}"),
            },
        }
    });

    if let Some(ref cb) = config.progress_callback {
        match &outcome.status {
            FileStatus::Written { images_saved, .. } => {
                cb.on_file_written(&outcome.input, &outcome.output, *images_saved)
            }
            FileStatus::Skipped { reason } => cb.on_file_skipped(&outcome.input, reason),
        }
    }
    outcome
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(config: &PipelineConfig) -> Result<RunReport, DocuSparkError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocuSparkError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config))
}

/// Convert one discovered document: extract, persist images, assemble,
/// write. Blocking; never fails, the outcome says what happened.
pub fn convert_file(
    doc: &SourceDocument,
    config: &PipelineConfig,
    describer: &dyn ImageDescriber,
) -> FileOutcome {
    let out_dir = doc.output_dir(&config.output_root);
    let md_path = doc.markdown_path(&config.output_root);
    let skipped = |reason: String| FileOutcome {
        input: doc.path.clone(),
        output: md_path.clone(),
        status: FileStatus::Skipped { reason },
    };

    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        error!("Cannot create {}: {}", out_dir.display(), e);
        return skipped(format!("cannot create output folder: {e}"));
    }

    info!("Processing: {}", doc.path.display());

    // ── Dispatch + extract ───────────────────────────────────────────────
    let extracted = dispatch(doc.kind, &doc.path, config);
    let Some(text) = extracted.text else {
        warn!("Skipped: {}", doc.path.display());
        return skipped(format!("{} extraction failed", doc.kind.label()));
    };
    debug!(
        "{}: {} chars, {} image(s)",
        doc.path.display(),
        text.len(),
        extracted.images.len()
    );

    // ── Persist images ───────────────────────────────────────────────────
    let persisted = save_images(&extracted.images, &out_dir);

    // ── Assemble + write ─────────────────────────────────────────────────
    let markdown = assemble(&text, &persisted.saved, &config.output_root, describer);
    if let Err(e) = write_markdown(&md_path, &markdown) {
        error!("Failed to write {}: {}", md_path.display(), e);
        return skipped(format!("cannot write Markdown: {e}"));
    }

    FileOutcome {
        input: doc.path.clone(),
        output: md_path,
        status: FileStatus::Written {
            images_saved: persisted.saved.len(),
            images_failed: persisted.failed,
        },
    }
}

/// Replace `path` with `content` via a temp file + rename, so a crash never
/// leaves a half-written Markdown file behind.
fn write_markdown(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)
}

/// Configured describer, or tesseract with the configured binary and language.
fn resolve_describer(config: &PipelineConfig) -> Arc<dyn ImageDescriber> {
    match config.describer {
        Some(ref describer) => Arc::clone(describer),
        None => Arc::new(TesseractDescriber::new(
            config.tesseract_path.clone(),
            config.ocr_language.clone(),
        )),
    }
}
