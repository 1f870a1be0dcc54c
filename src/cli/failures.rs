//! Append-only log of per-document failures.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use fs2::FileExt;
use serde::Serialize;

use crate::core::DocumentFailure;

/// Failure log path next to an output file: `<output>.failures.jsonl`
pub fn failures_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".failures.jsonl");
    PathBuf::from(name)
}

/// Append failures as JSONL under an exclusive file lock
pub fn append_failures(path: &Path, failures: &[DocumentFailure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open failures log: {}", path.display()))?;

    file.lock_exclusive()
        .with_context(|| format!("Failed to lock failures log: {}", path.display()))?;

    #[derive(Serialize)]
    struct FailureLine<'a> {
        ts: String,
        #[serde(flatten)]
        failure: &'a DocumentFailure,
    }

    let ts = Utc::now().to_rfc3339();
    for failure in failures {
        let line = FailureLine {
            ts: ts.clone(),
            failure,
        };
        let json = serde_json::to_string(&line).context("Failed to serialize failure")?;
        writeln!(file, "{}", json).context("Failed to write failure")?;
    }
    file.flush().context("Failed to flush failures log")?;

    // Lock is released when file is dropped
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdjudicationError;
    use tempfile::TempDir;

    #[test]
    fn test_failures_path() {
        assert_eq!(
            failures_path(Path::new("/tmp/out.json")),
            PathBuf::from("/tmp/out.json.failures.jsonl")
        );
    }

    #[test]
    fn test_append_is_cumulative() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.jsonl");
        let failure = DocumentFailure::new(
            Some(9),
            AdjudicationError::Malformed("no text".to_string()),
        );

        append_failures(&path, &[failure.clone()]).unwrap();
        append_failures(&path, &[failure]).unwrap();
        append_failures(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["file_id"], 9);
        assert_eq!(parsed["kind"], "malformed");
        assert!(parsed["ts"].as_str().unwrap().contains('T'));
    }
}
