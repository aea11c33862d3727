//! Analyzer configuration
//!
//! Recognized frameworks, device-selection patterns, size thresholds and the
//! confidence score parameters. Defaults reproduce the canonical behavior;
//! a TOML file can extend or replace them.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default element-count boundary between "small" and "big" allocations
pub const DEFAULT_TENSOR_THRESHOLD: u64 = 1000;

/// How a framework's shape-based constructors spell their shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeConvention {
    /// `zeros(3, 4)` or `zeros((3, 4))`
    Variadic,
    /// `zeros([3, 4])`: first positional argument (or a shape keyword) is the shape
    ShapeArgument,
}

/// Tensor-construction vocabulary of one framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkProfile {
    /// Tag reported with every tensor call (e.g. "pytorch")
    pub name: String,
    /// Leading names a callee must start with (e.g. "torch" for `torch.zeros`)
    pub module_prefixes: Vec<String>,
    /// Operations whose size comes from a shape
    pub shape_operations: Vec<String>,
    /// Operations whose size comes from a literal (nested) value
    pub literal_operations: Vec<String>,
    /// Keyword arguments that may carry the shape
    #[serde(default)]
    pub shape_keywords: Vec<String>,
    /// Sizes strictly below this are "small"
    pub threshold: u64,
    pub shape_convention: ShapeConvention,
}

impl FrameworkProfile {
    pub fn pytorch() -> Self {
        Self {
            name: "pytorch".to_string(),
            module_prefixes: strings(&["torch"]),
            shape_operations: strings(&["randn", "zeros", "ones", "empty"]),
            literal_operations: strings(&["tensor"]),
            shape_keywords: strings(&["size"]),
            threshold: DEFAULT_TENSOR_THRESHOLD,
            shape_convention: ShapeConvention::Variadic,
        }
    }

    pub fn tensorflow() -> Self {
        Self {
            name: "tensorflow".to_string(),
            module_prefixes: strings(&["tf", "tensorflow"]),
            shape_operations: strings(&["zeros", "ones", "fill", "random.uniform", "random.normal"]),
            literal_operations: strings(&["constant"]),
            shape_keywords: strings(&["shape", "dims"]),
            threshold: DEFAULT_TENSOR_THRESHOLD,
            shape_convention: ShapeConvention::ShapeArgument,
        }
    }

    /// Match a dotted callee against this profile
    pub fn match_operation(&self, callee: &str) -> Option<TensorOperation> {
        let has_prefix = self.module_prefixes.iter().any(|prefix| {
            callee
                .strip_prefix(prefix.as_str())
                .map_or(false, |rest| rest.starts_with('.'))
        });
        if !has_prefix {
            return None;
        }

        let ends_with_op = |op: &String| {
            callee
                .strip_suffix(op.as_str())
                .map_or(false, |head| head.ends_with('.'))
        };

        if self.literal_operations.iter().any(ends_with_op) {
            Some(TensorOperation::Literal)
        } else if self.shape_operations.iter().any(ends_with_op) {
            Some(TensorOperation::Shape)
        } else {
            None
        }
    }
}

/// Which estimation procedure a matched callee uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorOperation {
    Shape,
    Literal,
}

/// Parameters of the additive confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Score of any verdict backed by evidence, before increments
    pub base: f64,
    /// Added per explicit-device call and per recognized import
    pub per_evidence: f64,
    /// Score of the default verdict when nothing was found
    pub no_evidence: f64,
    /// Upper bound applied after rounding
    pub ceiling: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.5,
            per_evidence: 0.1,
            no_evidence: 0.1,
            ceiling: 1.0,
        }
    }
}

/// Immutable configuration shared by every analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Top-level packages whose import counts as evidence
    pub recognized_imports: Vec<String>,
    /// String literals that name a GPU device ("cuda" also matches "cuda:0")
    pub device_literals: Vec<String>,
    /// Callee names that build a device object (`torch.device("cuda")`)
    pub device_constructors: Vec<String>,
    /// Method names that move data to a device (`x.to("cuda")`)
    pub transfer_methods: Vec<String>,
    /// Method names that move data to the GPU unconditionally (`x.cuda()`)
    pub accelerator_methods: Vec<String>,
    pub frameworks: Vec<FrameworkProfile>,
    pub confidence: ConfidenceConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            recognized_imports: strings(&["torch", "tensorflow", "cupy", "jax"]),
            device_literals: strings(&["cuda"]),
            device_constructors: strings(&["device"]),
            transfer_methods: strings(&["to"]),
            accelerator_methods: strings(&["cuda"]),
            frameworks: vec![FrameworkProfile::pytorch(), FrameworkProfile::tensorflow()],
            confidence: ConfidenceConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text; omitted fields keep their defaults
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.frameworks.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one framework profile is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for framework in &self.frameworks {
            if !seen.insert(framework.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "framework '{}' is defined more than once",
                    framework.name
                )));
            }
            if framework.module_prefixes.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "framework '{}' has no module prefixes",
                    framework.name
                )));
            }
        }

        let c = &self.confidence;
        for (field, value) in [
            ("base", c.base),
            ("per_evidence", c.per_evidence),
            ("no_evidence", c.no_evidence),
            ("ceiling", c.ceiling),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "confidence.{} must be within [0, 1], got {}",
                    field, value
                )));
            }
        }

        Ok(())
    }

    /// Whether a string literal names a GPU device
    pub fn is_device_literal(&self, value: &str) -> bool {
        self.device_literals.iter().any(|literal| {
            value == literal
                || value
                    .strip_prefix(literal.as_str())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .map_or(false, |index| {
                        !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
                    })
        })
    }

    /// First framework whose vocabulary matches the dotted callee
    pub fn match_tensor_operation(&self, callee: &str) -> Option<(&FrameworkProfile, TensorOperation)> {
        self.frameworks
            .iter()
            .find_map(|framework| framework.match_operation(callee).map(|op| (framework, op)))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
