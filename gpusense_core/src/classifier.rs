//! Execution-mode decision over finished evidence
//!
//! Rules are checked in priority order; the first match wins.

use crate::config::ConfidenceConfig;
use crate::evidence::Evidence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicted execution target of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// No GPU-related evidence
    Cpu,
    /// Code explicitly requests a CUDA device
    Gpu,
    /// Framework in use, but only small allocations seen
    CpuPreferred,
    /// Framework in use with at least one large allocation
    GpuPreferred,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Cpu => "cpu",
            ExecutionMode::Gpu => "gpu",
            ExecutionMode::CpuPreferred => "cpu_preferred",
            ExecutionMode::GpuPreferred => "gpu_preferred",
        }
    }

    pub fn all() -> [ExecutionMode; 4] {
        [
            ExecutionMode::Gpu,
            ExecutionMode::GpuPreferred,
            ExecutionMode::CpuPreferred,
            ExecutionMode::Cpu,
        ]
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one file's evidence
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub mode: ExecutionMode,
    pub confidence: f64,
    pub reason: String,
}

pub const NO_EVIDENCE_REASON: &str = "No GPU-related calls or imports detected.";

/// Turns evidence into a verdict
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    confidence: ConfidenceConfig,
}

impl Classifier {
    pub fn new(confidence: ConfidenceConfig) -> Self {
        Self { confidence }
    }

    /// Apply the decision rules; the first one that matches wins
    pub fn classify(&self, evidence: &Evidence) -> Verdict {
        let explicit = evidence.explicit_calls.len();
        let imports = evidence.imports.len();
        let small = evidence.small_calls.len();
        let big = evidence.big_calls.len();

        // Priority 1: explicit device request overrides everything
        if explicit > 0 {
            return self.verdict(
                ExecutionMode::Gpu,
                format!("Detected {} explicit GPU device call(s).", explicit),
                evidence,
            );
        }

        if imports > 0 {
            // Priority 2: only small allocations
            if small > 0 && big == 0 {
                return self.verdict(
                    ExecutionMode::CpuPreferred,
                    format!(
                        "Detected {} small tensor call(s) and {} relevant import(s).",
                        small, imports
                    ),
                    evidence,
                );
            }

            // Priority 3: at least one large allocation
            if big > 0 {
                return self.verdict(
                    ExecutionMode::GpuPreferred,
                    format!(
                        "Detected {} big tensor call(s) and {} relevant import(s).",
                        big, imports
                    ),
                    evidence,
                );
            }

            // Priority 4: framework imported, no sized allocations
            return self.verdict(
                ExecutionMode::CpuPreferred,
                format!(
                    "Detected {} relevant import(s) without sized tensor allocations.",
                    imports
                ),
                evidence,
            );
        }

        // Priority 5: default
        Verdict {
            mode: ExecutionMode::Cpu,
            confidence: self.confidence.no_evidence,
            reason: NO_EVIDENCE_REASON.to_string(),
        }
    }

    fn verdict(&self, mode: ExecutionMode, reason: String, evidence: &Evidence) -> Verdict {
        Verdict {
            mode,
            confidence: self.score(evidence.explicit_calls.len() + evidence.imports.len()),
            reason,
        }
    }

    /// `base + per_evidence * units`, rounded to hundredths and capped
    fn score(&self, units: usize) -> f64 {
        let raw = self.confidence.base + self.confidence.per_evidence * units as f64;
        let rounded = (raw * 100.0).round() / 100.0;
        rounded.min(self.confidence.ceiling)
    }
}
