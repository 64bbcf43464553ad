//! CLI binary for docuspark.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PipelineConfig`, runs the pipeline and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use docuspark::{
    run, DocuSparkError, DocumentKind, PipelineConfig, PipelineProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over all discovered files plus a log
/// line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for documents…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        self.activate_bar(total_files);
    }

    fn on_file_start(&self, input: &Path, _index: usize, _total_files: usize) {
        self.bar.set_message(file_label(input));
    }

    fn on_file_written(&self, input: &Path, output: &Path, images_saved: usize) {
        let images = if images_saved == 0 {
            String::new()
        } else {
            dim(&format!("  ({images_saved} image(s))"))
        };
        self.bar.println(format!(
            "  {} {} → {}{}",
            green("✓"),
            input.display(),
            output.display(),
            images
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, input: &Path, reason: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            yellow("⚠"),
            input.display(),
            dim(reason)
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _written: usize, _skipped: usize) {
        self.bar.finish_and_clear();
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert ./data into ./clean_md
  docuspark

  # Other folders, German OCR
  docuspark --input ~/inbox --output ~/inbox-md --lang deu

  # Only PDFs and slides, four files at a time
  docuspark --only pdf --only pptx --concurrency 4

  # Machine-readable run report
  docuspark --json > report.json

EXTERNAL TOOLS:
  pdfium      shared library for PDF text and images
  tesseract   OCR for image descriptions (tesseract-ocr package)
  pandoc      conversion of .txt, .html, .htm and .rtf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Directory or file of an existing libpdfium
  RUST_LOG            Override log filtering (e.g. docuspark=debug)
"#;

/// Convert a folder of documents into Markdown with described images.
#[derive(Parser, Debug)]
#[command(
    name = "docuspark",
    version,
    about = "Convert PDF, DOCX, PPTX, TXT, HTML and RTF files into Markdown with extracted images",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder to scan recursively.
    #[arg(short, long, env = "DOCUSPARK_INPUT", default_value = "data")]
    input: PathBuf,

    /// Folder that receives the mirrored Markdown tree.
    #[arg(short, long, env = "DOCUSPARK_OUTPUT", default_value = "clean_md")]
    output: PathBuf,

    /// Restrict to these document kinds (repeatable). Default: all.
    #[arg(long, value_enum)]
    only: Vec<KindArg>,

    /// PDF image rendering DPI (72–600).
    #[arg(long, env = "DOCUSPARK_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Number of files converted at once.
    #[arg(short, long, env = "DOCUSPARK_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Tesseract language code(s), e.g. eng or eng+fra.
    #[arg(long, env = "DOCUSPARK_LANG", default_value = "eng")]
    lang: String,

    /// Tesseract executable.
    #[arg(long, env = "DOCUSPARK_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Pandoc executable.
    #[arg(long, env = "DOCUSPARK_PANDOC", default_value = "pandoc")]
    pandoc: PathBuf,

    /// Directory or file of the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium: Option<PathBuf>,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "DOCUSPARK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCUSPARK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCUSPARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCUSPARK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Pdf,
    Docx,
    Pptx,
    /// .txt, .html, .htm and .rtf through pandoc
    Text,
}

impl From<KindArg> for DocumentKind {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::Pdf => DocumentKind::Pdf,
            KindArg::Docx => DocumentKind::Docx,
            KindArg::Pptx => DocumentKind::Pptx,
            KindArg::Text => DocumentKind::Generic,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the progress bar active, per-file lines come from the bar; keep
    // library logs to errors so they don't tear it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new);
    let progress_cb = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn PipelineProgressCallback>);
    let config = build_config(&cli, progress_cb)?;

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {}",
            bold("🚀 Starting DocuSpark ingestion"),
            dim(&format!(
                "{} → {}",
                config.input_root.display(),
                config.output_root.display()
            ))
        );
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let report = match run(&config).await {
        Ok(report) => report,
        Err(e @ DocuSparkError::InputRootMissing { .. }) => {
            if let Some(ref cb) = cli_progress {
                cb.bar.finish_and_clear();
            }
            eprintln!("{} {}", red("❌"), e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("Run failed"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        let s = &report.stats;
        eprintln!(
            "{} Done! Clean Markdown saved to '{}'",
            green("✅"),
            bold(&config.output_root.display().to_string())
        );
        eprintln!(
            "   {} written  /  {} skipped  /  {} image(s)  —  {}ms",
            s.written,
            if s.skipped == 0 {
                dim("0")
            } else {
                yellow(&s.skipped.to_string())
            },
            s.images_saved,
            s.total_duration_ms,
        );
        if s.images_failed > 0 {
            eprintln!("   {} image(s) could not be saved", red(&s.images_failed.to_string()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .input_root(&cli.input)
        .output_root(&cli.output)
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .ocr_language(&cli.lang)
        .tesseract_path(&cli.tesseract)
        .pandoc_path(&cli.pandoc);

    if !cli.only.is_empty() {
        builder = builder.enabled_kinds(cli.only.iter().copied().map(DocumentKind::from));
    }
    if let Some(ref lib) = cli.pdfium {
        builder = builder.pdfium_library_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
