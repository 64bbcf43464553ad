//! TXT / HTML / RTF extraction through pandoc.
//!
//! The whole file is handed to `pandoc <file> --to markdown`; pandoc picks
//! the reader from the extension. This is the only extractor whose failure
//! skips the file instead of producing an empty document.

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::output::ExtractionResult;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Convert the file at `path` to Markdown with the configured pandoc.
pub fn extract(path: &Path, config: &PipelineConfig) -> ExtractionResult {
    match convert_with_pandoc(&config.pandoc_path, path) {
        Ok(text) => ExtractionResult::with_text(text),
        Err(e) => {
            warn!("[Pandoc] Failed on {}: {}", path.display(), e);
            ExtractionResult::absent()
        }
    }
}

/// Run `pandoc` and return its standard output verbatim.
pub fn convert_with_pandoc(pandoc: &Path, input: &Path) -> Result<String, ExtractError> {
    let failed = |detail: String| ExtractError::ConversionFailed {
        tool: pandoc.display().to_string(),
        path: input.to_path_buf(),
        detail,
    };

    let output = Command::new(pandoc)
        .arg(input)
        .arg("--to")
        .arg("markdown")
        .output()
        .map_err(|e| failed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!("{} {}", output.status, stderr.trim())));
    }

    let text = String::from_utf8(output.stdout)
        .map_err(|e| failed(format!("output is not UTF-8: {e}")))?;
    debug!("pandoc: {} → {} bytes", input.display(), text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_signals_absent_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        std::fs::write(&input, "hello").unwrap();

        let config = PipelineConfig::builder()
            .pandoc_path(dir.path().join("no-such-pandoc"))
            .build()
            .unwrap();
        let result = extract(&input, &config);
        assert!(result.text.is_none());
        assert!(result.images.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_status() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("pandoc");
        std::fs::write(&tool, "#!/bin/sh\necho 'unknown reader' >&2\nexit 21\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let input = dir.path().join("a.rtf");
        std::fs::write(&input, "{\\rtf1}").unwrap();

        let err = convert_with_pandoc(&tool, &input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown reader"), "got: {msg}");
    }
}
