//! Error types for the docuspark library.
//!
//! Three error types mirror the three scopes a failure can have:
//!
//! * [`DocuSparkError`] — **Fatal**: the run cannot proceed at all (missing
//!   input root, invalid configuration). Returned as `Err` from
//!   [`crate::convert::run`].
//!
//! * [`ExtractError`] — **Document-level**: one file could not be opened or
//!   converted. Extractors catch it, log it and fall back to an empty (or
//!   absent) result; the run moves on to the next file.
//!
//! * [`ItemError`] — **Item-level**: one embedded image failed to render,
//!   decode, save or be recognised. The image is dropped (or described by an
//!   error string) and its siblings are unaffected.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum DocuSparkError {
    /// The configured input root does not exist (or is not a directory).
    #[error("Input folder '{path}' does not exist.")]
    InputRootMissing { path: PathBuf },

    /// The input tree could not be enumerated.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A document-level failure: the whole file is affected.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be read from disk.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable OOXML (zip) package.
    #[error("'{path}' is not a valid Office package: {source}")]
    Package {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A required part is missing from an OOXML package.
    #[error("'{path}' has no part '{part}'")]
    MissingPart { path: PathBuf, part: String },

    /// A package part is not well-formed XML.
    #[error("Malformed XML in '{part}': {detail}")]
    Xml { part: String, detail: String },

    /// pdfium could not be loaded.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or place the library next to the binary."
    )]
    PdfiumBindingFailed(String),

    /// pdfium refused to open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The external converter could not be started or exited non-zero.
    #[error("Converter '{tool}' failed on '{path}': {detail}")]
    ConversionFailed {
        tool: String,
        path: PathBuf,
        detail: String,
    },
}

/// A failure confined to a single embedded image.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The image's region could not be rasterised.
    #[error("Image {index} on page {page}: rasterisation failed: {detail}")]
    RenderFailed {
        page: usize,
        index: usize,
        detail: String,
    },

    /// The embedded payload could not be found or decoded.
    #[error("Image '{name}': decode failed: {detail}")]
    DecodeFailed { name: String, detail: String },

    /// The bitmap could not be written to the output tree.
    #[error("Failed to save image '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The OCR engine failed.
    #[error("{0}")]
    OcrFailed(String),
}
