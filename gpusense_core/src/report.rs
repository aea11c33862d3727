//! Per-file classification record handed back to callers

use crate::classifier::{ExecutionMode, Verdict};
use crate::error::{AnalysisError, FailureKind};
use crate::evidence::{Evidence, TensorCall};
use serde::{Deserialize, Serialize};

/// Evidence behind a verdict, in reportable form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationDetails {
    /// Recognized frameworks imported, sorted
    pub imports: Vec<String>,
    pub uses_cuda: bool,
    /// Explicit-device callees, deduplicated in first-seen order
    pub explicit_gpu_calls: Vec<String>,
    /// Line of every explicit-device call
    pub lines_considered: Vec<usize>,
    pub small_calls: Vec<TensorCall>,
    pub big_calls: Vec<TensorCall>,
    /// Recognized constructors with no static size
    pub unestimated_calls: Vec<TensorCall>,
}

impl From<Evidence> for ClassificationDetails {
    fn from(evidence: Evidence) -> Self {
        Self {
            uses_cuda: !evidence.explicit_calls.is_empty(),
            explicit_gpu_calls: evidence.explicit_call_texts(),
            lines_considered: evidence.explicit_call_lines(),
            imports: evidence.imports.into_iter().collect(),
            small_calls: evidence.small_calls,
            big_calls: evidence.big_calls,
            unestimated_calls: evidence.unestimated_calls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub execution_mode: ExecutionMode,
    pub confidence: f64,
    pub reason: String,
    pub details: ClassificationDetails,
    /// Set when the file could not be analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ClassificationResult {
    pub fn from_verdict(verdict: Verdict, evidence: Evidence) -> Self {
        Self {
            execution_mode: verdict.mode,
            confidence: verdict.confidence,
            reason: verdict.reason,
            details: evidence.into(),
            failure: None,
        }
    }

    /// Safe default for a file that could not be read or parsed
    pub fn failure(error: &AnalysisError) -> Self {
        Self {
            execution_mode: ExecutionMode::Cpu,
            confidence: 0.0,
            reason: format!("Analysis failed: {}", error),
            details: ClassificationDetails::default(),
            failure: Some(error.kind()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}
