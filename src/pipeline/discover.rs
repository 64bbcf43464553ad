//! Input discovery: walk the input tree and map each supported file onto the
//! output tree.
//!
//! The walk is top-down and deterministic: a directory's own files, sorted
//! by name, come before its subdirectories, which are also visited in name
//! order.

use crate::config::PipelineConfig;
use crate::error::DocuSparkError;
use crate::pipeline::dispatch::DocumentKind;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A supported file found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path of the file as found (input root joined with the relative path).
    pub path: PathBuf,
    /// Directory of the file relative to the input root (empty at the root).
    pub relative_dir: PathBuf,
    pub kind: DocumentKind,
}

impl SourceDocument {
    /// Mirrored folder under `output_root` that receives this document.
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative_dir)
    }

    /// `output_root/relative_dir/<stem>.md`
    pub fn markdown_path(&self, output_root: &Path) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_stem()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".md");
        self.output_dir(output_root).join(name)
    }
}

/// Every enabled, supported document under `config.input_root`.
///
/// # Errors
/// [`DocuSparkError::InputRootMissing`] if the input root is not a directory,
/// [`DocuSparkError::ReadDirFailed`] if the root itself cannot be listed.
/// Unreadable subdirectories are logged and skipped.
pub fn discover(config: &PipelineConfig) -> Result<Vec<SourceDocument>, DocuSparkError> {
    let root = &config.input_root;
    if !root.is_dir() {
        return Err(DocuSparkError::InputRootMissing { path: root.clone() });
    }

    debug!(
        "Scanning {} for {}",
        root.display(),
        config
            .enabled_kinds
            .iter()
            .flat_map(|k| k.extensions())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut found = Vec::new();
    let (files, dirs) = list_dir(root).map_err(|source| DocuSparkError::ReadDirFailed {
        path: root.clone(),
        source,
    })?;
    collect(config, Path::new(""), files, &mut found);

    let mut pending: Vec<PathBuf> = dirs.into_iter().rev().map(PathBuf::from).collect();
    while let Some(rel_dir) = pending.pop() {
        let abs = root.join(&rel_dir);
        match list_dir(&abs) {
            Ok((files, dirs)) => {
                collect(config, &rel_dir, files, &mut found);
                pending.extend(dirs.into_iter().rev().map(|d| rel_dir.join(d)));
            }
            Err(e) => warn!("Cannot read directory {}: {}", abs.display(), e),
        }
    }

    debug!("Discovered {} supported file(s) under {}", found.len(), root.display());
    Ok(found)
}

fn collect(
    config: &PipelineConfig,
    rel_dir: &Path,
    files: Vec<OsString>,
    found: &mut Vec<SourceDocument>,
) {
    for name in files {
        let rel_path = rel_dir.join(&name);
        let Some(kind) = DocumentKind::from_path(&rel_path) else {
            continue;
        };
        if !config.is_enabled(kind) {
            continue;
        }
        found.push(SourceDocument {
            path: config.input_root.join(&rel_path),
            relative_dir: rel_dir.to_path_buf(),
            kind,
        });
    }
}

/// Sorted file names and sorted subdirectory names of `dir`.
fn list_dir(dir: &Path) -> std::io::Result<(Vec<OsString>, Vec<OsString>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.file_name());
        } else {
            files.push(entry.file_name());
        }
    }
    files.sort();
    dirs.sort();
    Ok((files, dirs))
}
