//! Batch report rendering: JSON for machines, a colored summary for people

use crate::scanner::BatchResults;
use anyhow::Result;
use colored::*;
use gpusense_core::{ClassificationResult, ExecutionMode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-mode counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub failed: usize,
    pub modes: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_results(results: &BatchResults) -> Self {
        let mut summary = Self {
            total_files: results.len(),
            ..Default::default()
        };
        for mode in ExecutionMode::all() {
            summary.modes.insert(mode.to_string(), 0);
        }

        for result in results.values() {
            if result.is_failure() {
                summary.failed += 1;
            }
            *summary
                .modes
                .entry(result.execution_mode.to_string())
                .or_insert(0) += 1;
        }
        summary
    }

    pub fn count(&self, mode: ExecutionMode) -> usize {
        self.modes.get(mode.as_str()).copied().unwrap_or(0)
    }
}

pub fn render_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

fn colored_mode(mode: ExecutionMode) -> ColoredString {
    match mode {
        ExecutionMode::Gpu => mode.as_str().red().bold(),
        ExecutionMode::GpuPreferred => mode.as_str().yellow().bold(),
        ExecutionMode::CpuPreferred => mode.as_str().cyan(),
        ExecutionMode::Cpu => mode.as_str().green(),
    }
}

/// Print per-file verdicts and mode totals to stderr
pub fn print_summary(results: &BatchResults) {
    let summary = BatchSummary::from_results(results);

    eprintln!();
    eprintln!("{}", "━".repeat(80).cyan());
    eprintln!("{}", "  Execution Target Classification".cyan().bold());
    eprintln!("{}", "━".repeat(80).cyan());
    eprintln!();

    for (path, result) in results {
        print_file_line(path, result);
    }

    eprintln!();
    eprintln!("  {:<20} {:>8}", "Mode", "Files");
    eprintln!("  {}", "-".repeat(30));
    for mode in ExecutionMode::all() {
        eprintln!("  {:<20} {:>8}", colored_mode(mode), summary.count(mode));
    }
    eprintln!("  {}", "-".repeat(30));
    eprintln!("  {:<20} {:>8}", "total", summary.total_files);

    if summary.failed > 0 {
        eprintln!();
        eprintln!(
            "  {} {} file(s) could not be analyzed and default to cpu.",
            "!".yellow(),
            summary.failed.to_string().red().bold()
        );
    }
    eprintln!("{}", "━".repeat(80).cyan());
    eprintln!();
}

fn print_file_line(path: &str, result: &ClassificationResult) {
    let marker = if result.is_failure() {
        "✗".red()
    } else {
        "✓".green()
    };
    eprintln!(
        "  {} {:<50} {:<15} {:.2}",
        marker,
        path,
        colored_mode(result.execution_mode),
        result.confidence
    );
    if result.is_failure() {
        eprintln!("      {}", result.reason.dimmed());
    }
}
