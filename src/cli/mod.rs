//! Command-line interface for adjudicator.
//!
//! Provides commands for scoring inter-annotator agreement, writing
//! adjudication files for review, and showing the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::fs;

use crate::config::{load_config, ResolvedConfig};
use crate::core::{adjudicate_corpus, score_corpus, TracingObserver};
use crate::ingest::load_exports;
use crate::report::ScoreReport;

pub mod failures;

/// adjudicator - Compare two annotators and build adjudication files
#[derive(Parser, Debug)]
#[command(name = "adjudicator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to discovery of .adjudicator/config.yaml)
    #[arg(short, long, global = true, env = "ADJUDICATOR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score agreement between the reference and prediction annotators
    Score {
        /// Export files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Match spans by overlap instead of exact offsets
        #[arg(long)]
        overlap: bool,

        /// F-score beta (overrides config)
        #[arg(long)]
        beta: Option<f64>,

        /// Write the JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write an adjudication task file highlighting disagreements
    Adjudicate {
        /// Export files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output task file (JSON array)
        #[arg(short, long)]
        output: PathBuf,

        /// Drop agreements and omit fully agreeing documents
        #[arg(long)]
        filter_agreements: bool,

        /// Match spans by overlap instead of exact offsets
        #[arg(long)]
        overlap: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        match self.command {
            Commands::Score {
                inputs,
                overlap,
                beta,
                output,
            } => {
                let config = with_overrides(config, overlap, None, beta);
                score(&inputs, &config, output.as_deref()).await
            }
            Commands::Adjudicate {
                inputs,
                output,
                filter_agreements,
                overlap,
            } => {
                let config = with_overrides(config, overlap, Some(filter_agreements), None);
                adjudicate(&inputs, &config, &output).await
            }
            Commands::Config => show_config(&config),
        }
    }
}

/// Command-line flags only ever switch options on
fn with_overrides(
    mut config: ResolvedConfig,
    overlap: bool,
    filter_agreements: Option<bool>,
    beta: Option<f64>,
) -> ResolvedConfig {
    config.overlap |= overlap;
    if let Some(filter) = filter_agreements {
        config.adjudication.filter_agreements |= filter;
    }
    if let Some(beta) = beta {
        config.beta = beta;
    }
    config
}

async fn score(inputs: &[String], config: &ResolvedConfig, output: Option<&Path>) -> Result<()> {
    let tasks = load_exports(inputs).await?;
    let outcome = score_corpus(&tasks, config, &TracingObserver);

    let report = ScoreReport::from_outcome(
        &outcome,
        &config.annotators.reference.name,
        &config.annotators.prediction.name,
        config.overlap,
        config.beta,
    );

    print!("{}", report.render_table());
    for failure in &report.failures {
        eprintln!(
            "  failed: file {} [{}] {}",
            failure
                .file_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "?".to_string()),
            failure.kind,
            failure.message
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        eprintln!("\n[Report written to {}]", path.display());
    }

    Ok(())
}

async fn adjudicate(inputs: &[String], config: &ResolvedConfig, output: &Path) -> Result<()> {
    let tasks = load_exports(inputs).await?;
    let outcome = adjudicate_corpus(&tasks, config, &TracingObserver);

    let json = serde_json::to_string_pretty(&outcome.records)
        .context("Failed to serialize adjudication records")?;
    fs::write(output, json)
        .await
        .with_context(|| format!("Failed to write adjudication file: {}", output.display()))?;

    let failures_path = failures::failures_path(output);
    failures::append_failures(&failures_path, &outcome.failures)?;

    eprintln!(
        "[{} records written to {}; {} omitted as full agreement]",
        outcome.records.len(),
        output.display(),
        outcome.omitted
    );
    if !outcome.failures.is_empty() {
        eprintln!(
            "[{} documents failed; see {}]",
            outcome.failures.len(),
            failures_path.display()
        );
    }

    Ok(())
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!(
        "Config file: {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    let yaml = serde_yaml::to_string(config).context("Failed to render configuration")?;
    println!("{}", yaml);
    Ok(())
}
