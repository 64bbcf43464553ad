//! Progress-callback trait for per-file pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe a
//! run as it walks the input tree. The CLI uses this to drive its progress
//! bar; library callers can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use docuspark::{PipelineConfig, PipelineProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_file_written(&self, input: &Path, _output: &Path, _images: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("done: {}", input.display());
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { written: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes each file.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the
/// per-file methods may be called from several blocking-pool threads at once.
/// All methods default to no-ops.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once, after discovery, with the number of supported files.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is dispatched to its extractor.
    ///
    /// # Arguments
    /// * `input`       — source document path
    /// * `index`       — 1-indexed position in discovery order
    /// * `total_files` — number of supported files in the run
    fn on_file_start(&self, input: &Path, index: usize, total_files: usize) {
        let _ = (input, index, total_files);
    }

    /// Called after a file's Markdown has been written.
    fn on_file_written(&self, input: &Path, output: &Path, images_saved: usize) {
        let _ = (input, output, images_saved);
    }

    /// Called when a file ends up skipped.
    fn on_file_skipped(&self, input: &Path, reason: &str) {
        let _ = (input, reason);
    }

    /// Called once after every file has been attempted.
    fn on_run_complete(&self, written: usize, skipped: usize) {
        let _ = (written, skipped);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        written: AtomicUsize,
        skipped: AtomicUsize,
        total: AtomicUsize,
    }

    impl PipelineProgressCallback for TrackingCallback {
        fn on_run_start(&self, total_files: usize) {
            self.total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _input: &Path, _index: usize, _total_files: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_written(&self, _input: &Path, _output: &Path, _images_saved: usize) {
            self.written.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _input: &Path, _reason: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(2);
        cb.on_file_start(Path::new("data/a.pdf"), 1, 2);
        cb.on_file_written(Path::new("data/a.pdf"), Path::new("clean_md/a.md"), 3);
        cb.on_file_skipped(Path::new("data/b.rtf"), "pandoc failed");
        cb.on_run_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_run_start(3);
        tracker.on_file_start(Path::new("a"), 1, 3);
        tracker.on_file_written(Path::new("a"), Path::new("a.md"), 0);
        tracker.on_file_start(Path::new("b"), 2, 3);
        tracker.on_file_skipped(Path::new("b"), "bad");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.written.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_file_start(Path::new("x.docx"), 1, 10);
    }
}
