use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use metasample_core::{PairedSample, SampleInput};
use serde::Serialize;
use std::path::Path;

/// What one repetition selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Inputs(Vec<SampleInput<i64>>),
    Pairs(Vec<PairedSample<String>>),
}

impl Selection {
    pub fn len(&self) -> usize {
        match self {
            Selection::Inputs(inputs) => inputs.len(),
            Selection::Pairs(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One display line per selected item.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Selection::Inputs(inputs) => inputs.iter().map(ToString::to_string).collect(),
            Selection::Pairs(pairs) => pairs.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Result of one repetition, as printed or serialised.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub strategy: String,
    pub repetition: usize,
    pub seed: String,
    pub generated_at: DateTime<Utc>,
    pub selected: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl RunReport {
    pub fn new(
        strategy: &str,
        repetition: usize,
        seed: impl ToString,
        selected: Selection,
        summary: Option<String>,
    ) -> Self {
        RunReport {
            strategy: strategy.to_string(),
            repetition,
            seed: seed.to_string(),
            generated_at: Utc::now(),
            selected,
            summary,
        }
    }
}

/// Read a domain file: a JSON array of paired samples over text values.
pub fn load_domain(path: &Path) -> Result<Vec<PairedSample<String>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read domain file {}", path.display()))?;
    let domain: Vec<PairedSample<String>> = serde_json::from_str(&contents)
        .with_context(|| format!("malformed domain file {}", path.display()))?;
    if domain.is_empty() {
        anyhow::bail!("domain file {} holds no pairs", path.display());
    }
    Ok(domain)
}

/// Format header output
pub fn format_header(strategy: &str) -> String {
    let title = format!("Sampling with {}", strategy);
    let rule = "=".repeat(title.len());
    format!("{}\n{}\n", title.bright_green().bold(), rule.bright_green())
}

/// Format one repetition as text
pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} {} (seed {})\n",
        "Repetition".bright_blue().bold(),
        report.repetition.to_string().bright_blue().bold(),
        report.seed.bright_yellow()
    ));
    for (position, line) in report.selected.lines().iter().enumerate() {
        output.push_str(&format!("  {:>4}. {}\n", position + 1, line));
    }
    if let Some(summary) = &report.summary {
        output.push_str(&summary.bright_cyan().to_string());
    }
    output
}

/// Format success message
pub fn format_success(repetitions: usize, selected: usize) -> String {
    format!(
        "{}\n",
        format!(
            "Selected {} item(s) over {} repetition(s)",
            selected, repetitions
        )
        .bright_green()
        .bold()
    )
}

/// Format the note printed when fewer items came back than requested
pub fn format_shortfall(requested: usize, selected: usize) -> String {
    format!(
        "{}\n",
        format!(
            "Requested {} but only {} could be selected",
            requested, selected
        )
        .bright_yellow()
    )
}

/// Format domain statistics header
pub fn format_stats_header(pairs: usize) -> String {
    let title = format!("Domain Statistics ({} pairs)", pairs);
    let rule = "=".repeat(title.len());
    format!("{}\n{}\n", title.bright_blue().bold(), rule.bright_blue())
}
