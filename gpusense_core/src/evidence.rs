//! Evidence gathered from a single source file
//!
//! The accumulator is append-only while the tree is walked and read-only
//! afterwards; the classifier only ever sees a finished `Evidence`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Statically estimated element count of a tensor allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum TensorSize {
    Known(u64),
    Unknown,
}

impl TensorSize {
    pub fn known(self) -> Option<u64> {
        match self {
            TensorSize::Known(n) => Some(n),
            TensorSize::Unknown => None,
        }
    }

    /// Small/big bucket for a threshold; unknown sizes have none
    pub fn bucket(self, threshold: u64) -> Option<SizeBucket> {
        self.known().map(|n| {
            if n < threshold {
                SizeBucket::Small
            } else {
                SizeBucket::Big
            }
        })
    }
}

impl From<Option<u64>> for TensorSize {
    fn from(value: Option<u64>) -> Self {
        value.map_or(TensorSize::Unknown, TensorSize::Known)
    }
}

impl From<TensorSize> for Option<u64> {
    fn from(value: TensorSize) -> Self {
        value.known()
    }
}

impl fmt::Display for TensorSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorSize::Known(n) => write!(f, "{}", n),
            TensorSize::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Small,
    Big,
}

/// A call that unconditionally requests the GPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitDeviceCall {
    /// Callee text, e.g. `torch.device` or `model.to`
    pub call: String,
    /// 1-based line of the call
    pub line: usize,
}

/// A recognized tensor constructor and its estimated size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorCall {
    pub framework: String,
    pub operation: String,
    pub estimated_size: TensorSize,
    pub line: usize,
}

/// Everything one traversal found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    pub imports: BTreeSet<String>,
    pub explicit_calls: Vec<ExplicitDeviceCall>,
    pub small_calls: Vec<TensorCall>,
    pub big_calls: Vec<TensorCall>,
    /// Recognized constructors whose size could not be determined
    pub unestimated_calls: Vec<TensorCall>,
}

impl Evidence {
    pub fn record_import(mut self, name: String) -> Self {
        self.imports.insert(name);
        self
    }

    pub fn record_explicit_call(mut self, call: ExplicitDeviceCall) -> Self {
        self.explicit_calls.push(call);
        self
    }

    /// File the call under the bucket its size falls into
    pub fn record_tensor_call(mut self, call: TensorCall, threshold: u64) -> Self {
        match call.estimated_size.bucket(threshold) {
            Some(SizeBucket::Small) => self.small_calls.push(call),
            Some(SizeBucket::Big) => self.big_calls.push(call),
            None => self.unestimated_calls.push(call),
        }
        self
    }

    /// Explicit-call texts, deduplicated in first-seen order
    pub fn explicit_call_texts(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.explicit_calls
            .iter()
            .filter(|c| seen.insert(c.call.as_str()))
            .map(|c| c.call.clone())
            .collect()
    }

    /// Line of every explicit-call occurrence, in traversal order
    pub fn explicit_call_lines(&self) -> Vec<usize> {
        self.explicit_calls.iter().map(|c| c.line).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.explicit_calls.is_empty()
            && self.small_calls.is_empty()
            && self.big_calls.is_empty()
            && self.unestimated_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(op: &str, size: TensorSize) -> TensorCall {
        TensorCall {
            framework: "pytorch".to_string(),
            operation: op.to_string(),
            estimated_size: size,
            line: 1,
        }
    }

    #[test]
    fn test_bucket_boundary() {
        assert_eq!(TensorSize::Known(999).bucket(1000), Some(SizeBucket::Small));
        assert_eq!(TensorSize::Known(1000).bucket(1000), Some(SizeBucket::Big));
        assert_eq!(TensorSize::Known(1001).bucket(1000), Some(SizeBucket::Big));
        assert_eq!(TensorSize::Unknown.bucket(1000), None);
    }

    #[test]
    fn test_record_tensor_call_buckets() {
        let evidence = Evidence::default()
            .record_tensor_call(call("torch.zeros", TensorSize::Known(12)), 1000)
            .record_tensor_call(call("torch.randn", TensorSize::Known(32768)), 1000)
            .record_tensor_call(call("torch.empty", TensorSize::Unknown), 1000);

        assert_eq!(evidence.small_calls.len(), 1);
        assert_eq!(evidence.big_calls.len(), 1);
        assert_eq!(evidence.unestimated_calls.len(), 1);
    }

    #[test]
    fn test_explicit_calls_dedup_keeps_lines() {
        let evidence = Evidence::default()
            .record_explicit_call(ExplicitDeviceCall { call: "model.cuda".into(), line: 4 })
            .record_explicit_call(ExplicitDeviceCall { call: "torch.device".into(), line: 2 })
            .record_explicit_call(ExplicitDeviceCall { call: "model.cuda".into(), line: 9 });

        assert_eq!(evidence.explicit_call_texts(), vec!["model.cuda", "torch.device"]);
        assert_eq!(evidence.explicit_call_lines(), vec![4, 2, 9]);
    }

    #[test]
    fn test_size_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&TensorSize::Known(12)).unwrap(), "12");
        assert_eq!(serde_json::to_string(&TensorSize::Unknown).unwrap(), "null");
    }
}
