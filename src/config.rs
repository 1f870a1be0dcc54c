//! Configuration for adjudication runs.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ADJUDICATOR_OVERLAP, ADJUDICATOR_FILTER_AGREEMENTS)
//! 2. Config file (explicit path, $ADJUDICATOR_CONFIG, .adjudicator/config.yaml
//!    in the current directory or a parent, then the user config directory)
//! 3. Defaults
//!
//! The annotator pair is assembled here once and passed down explicitly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::AdjudicationOptions;
use crate::domain::{AnnotatorIdentity, Annotators};
use crate::ingest::IngestConfig;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub annotators: Option<Annotators>,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub adjudication: AdjudicationOptions,
    #[serde(default)]
    pub attributes: IngestConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Interval intersection instead of exact span equality
    #[serde(default)]
    pub overlap: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_beta")]
    pub beta: f64,
}

fn default_beta() -> f64 {
    1.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            beta: default_beta(),
        }
    }
}

/// Resolved configuration for one run
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub annotators: Annotators,
    pub overlap: bool,
    pub adjudication: AdjudicationOptions,
    pub ingest: IngestConfig,
    pub beta: f64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            annotators: Annotators::new(
                AnnotatorIdentity::new("reference", Vec::new()),
                AnnotatorIdentity::new("prediction", Vec::new()),
            ),
            overlap: false,
            adjudication: AdjudicationOptions::default(),
            ingest: IngestConfig::default(),
            beta: default_beta(),
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    fn from_file(config: ConfigFile, path: PathBuf) -> Self {
        let defaults = Self::default();
        Self {
            annotators: config.annotators.unwrap_or(defaults.annotators),
            overlap: config.matching.overlap,
            adjudication: config.adjudication,
            ingest: config.attributes,
            beta: config.scoring.beta,
            config_file: Some(path),
        }
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) -> Result<()> {
        if let Some(overlap) = env_flag("ADJUDICATOR_OVERLAP")? {
            self.overlap = overlap;
        }
        if let Some(filter) = env_flag("ADJUDICATOR_FILTER_AGREEMENTS")? {
            self.adjudication.filter_agreements = filter;
        }
        Ok(())
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value)
            .map(Some)
            .with_context(|| format!("Invalid boolean in {}: {}", name, value)),
        Err(_) => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".adjudicator").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("adjudicator").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
pub fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => match std::env::var("ADJUDICATOR_CONFIG") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => find_config_file(),
        },
    };

    let mut resolved = match config_path {
        Some(path) => {
            let file = load_config_file(&path)?;
            ResolvedConfig::from_file(file, path)
        }
        None => ResolvedConfig::default(),
    };

    resolved.apply_env()?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
annotators:
  reference: {{ name: alice, ids: [1] }}
  prediction: {{ name: bob, ids: [2, 7] }}
matching:
  overlap: true
adjudication:
  filter_agreements: true
attributes:
  ignored: [Negation]
scoring:
  beta: 0.5
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(config.matching.overlap);
        assert!(config.adjudication.filter_agreements);
        assert_eq!(config.adjudication.from_name, "annotator");
        assert_eq!(config.attributes.doc_time_rel, "DocTimeRel");
        assert_eq!(config.attributes.ignored, vec!["Negation".to_string()]);
        assert_eq!(config.scoring.beta, 0.5);

        let resolved = ResolvedConfig::from_file(config, config_path.clone());
        assert_eq!(resolved.annotators.prediction.ids, vec![2, 7]);
        assert_eq!(resolved.annotators.reference.name, "alice");
        assert_eq!(resolved.config_file, Some(config_path));
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: ConfigFile = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        let resolved = ResolvedConfig::from_file(config, PathBuf::from("x.yaml"));
        assert!(!resolved.overlap);
        assert!(!resolved.adjudication.filter_agreements);
        assert_eq!(resolved.adjudication.origin, "prediction");
        assert_eq!(resolved.beta, 1.0);
        assert_eq!(resolved.annotators.reference.name, "reference");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
