//! Pipeline stages for document-to-Markdown conversion.
//!
//! Each submodule implements one step; [`crate::convert`] strings them
//! together per file.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ dispatch ──▶ pdf | docx | pptx | generic ──▶ persist ──▶ assemble ──▶ .md
//!  (walk)      (by ext)       (text + raw images)          (PNG files)  (+ describe)
//! ```
//!
//! 1. [`discover`] — walk the input tree in a fixed order, keep supported files
//! 2. [`dispatch`] — pick the extractor for a file's extension
//! 3. [`pdf`], [`docx`], [`pptx`], [`generic`] — produce text plus in-memory
//!    images; [`ooxml`] holds the zip/relationship plumbing DOCX and PPTX share
//! 4. [`persist`] — write images as PNG under the document's `images` folder
//! 5. [`assemble`] — append the "Extracted Images" section, calling
//!    [`describe`] for each saved image

pub mod assemble;
pub mod describe;
pub mod discover;
pub mod dispatch;
pub mod docx;
pub mod generic;
pub mod ooxml;
pub mod pdf;
pub mod persist;
pub mod pptx;
