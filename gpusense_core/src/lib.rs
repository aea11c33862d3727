//! # gpusense core
//!
//! Static prediction of where a Python source file wants to run.
//!
//! The file is parsed once and walked once. Along the way three recognizers
//! gather evidence:
//!
//! - **Imports** of recognized deep-learning frameworks
//! - **Explicit device calls** such as `torch.device("cuda")`, `x.to("cuda")`
//!   and `x.cuda()`
//! - **Tensor constructors** whose element count is known from literals
//!
//! The classifier then turns that evidence into one of four execution modes
//! (`cpu`, `gpu`, `cpu_preferred`, `gpu_preferred`) with a confidence score
//! and a human-readable reason.
//!
//! ## Quick Start
//!
//! ```rust
//! use gpusense_core::{Analyzer, AnalyzerConfig, ExecutionMode};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(AnalyzerConfig::default());
//! let result = analyzer.classify(
//!     Path::new("train.py"),
//!     "import torch\nx = torch.randn(128, 256)\n",
//! );
//! assert_eq!(result.execution_mode, ExecutionMode::GpuPreferred);
//! ```

pub mod analysis;
pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod evidence;
pub mod report;
pub mod syntax;

// Re-export commonly used types for easy access
pub use analyzer::{classify, Analyzer};
pub use classifier::{Classifier, ExecutionMode, Verdict};
pub use config::{AnalyzerConfig, ConfidenceConfig, FrameworkProfile, ShapeConvention};
pub use error::{AnalysisError, AnalysisResult, ConfigError, FailureKind};
pub use evidence::{Evidence, ExplicitDeviceCall, TensorCall, TensorSize};
pub use report::{ClassificationDetails, ClassificationResult};
