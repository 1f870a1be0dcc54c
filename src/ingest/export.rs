//! Loading exported task files from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;

/// Expand glob patterns into a sorted, deduplicated file list.
///
/// A pattern that matches nothing is an error so typos surface early.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("Invalid input pattern: {}", pattern))? {
            let path = entry.with_context(|| format!("Failed to read match for: {}", pattern))?;
            if path.is_file() {
                paths.push(path);
                matched = true;
            }
        }
        if !matched {
            anyhow::bail!("No input files match: {}", pattern);
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Load tasks from an export file (a JSON array, or a single task object)
pub async fn load_export(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read export: {}", path.display()))?;

    let parsed: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse export JSON: {}", path.display()))?;

    match parsed {
        Value::Array(tasks) => Ok(tasks),
        task @ Value::Object(_) => Ok(vec![task]),
        _ => anyhow::bail!("Export is neither a task list nor a task: {}", path.display()),
    }
}

/// Load and concatenate every export matched by the patterns
pub async fn load_exports(patterns: &[String]) -> Result<Vec<Value>> {
    let mut tasks = Vec::new();
    for path in expand_inputs(patterns)? {
        let mut loaded = load_export(&path).await?;
        tracing::info!(path = %path.display(), tasks = loaded.len(), "Loaded export");
        tasks.append(&mut loaded);
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_array_and_single_task() {
        let temp = TempDir::new().unwrap();
        let many = temp.path().join("many.json");
        let one = temp.path().join("one.json");
        std::fs::write(&many, r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        std::fs::write(&one, r#"{"id": 3}"#).unwrap();

        assert_eq!(load_export(&many).await.unwrap().len(), 2);
        assert_eq!(load_export(&one).await.unwrap().len(), 1);

        let pattern = temp.path().join("*.json").to_string_lossy().to_string();
        let tasks = load_exports(&[pattern]).await.unwrap();
        assert_eq!(tasks.len(), 3);
    }

    #[test]
    fn test_unmatched_pattern_fails() {
        let temp = TempDir::new().unwrap();
        let pattern = temp.path().join("missing-*.json").to_string_lossy().to_string();
        assert!(expand_inputs(&[pattern]).is_err());
    }
}
