//! Error types for gpusense analysis and configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be analyzed
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Syntax error in {path} at line {line}, column {column}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Python grammar unavailable: {0}")]
    Grammar(String),
}

impl AnalysisError {
    /// Coarse failure category reported alongside the result
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Io { .. } | AnalysisError::Encoding { .. } => FailureKind::Io,
            AnalysisError::Syntax { .. } | AnalysisError::Grammar(_) => FailureKind::Syntax,
        }
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failure category carried by a failed classification
///
/// Callers use this to tell an unreadable file (possibly worth a retry)
/// apart from source that will never parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Io,
    Syntax,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Io => write!(f, "io"),
            FailureKind::Syntax => write!(f, "syntax"),
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        let io = AnalysisError::Io {
            path: PathBuf::from("a.py"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.kind(), FailureKind::Io);

        let syntax = AnalysisError::Syntax {
            path: PathBuf::from("b.py"),
            line: 3,
            column: 7,
            message: "invalid syntax".to_string(),
        };
        assert_eq!(syntax.kind(), FailureKind::Syntax);
        assert_eq!(
            syntax.to_string(),
            "Syntax error in b.py at line 3, column 7: invalid syntax"
        );
    }

    #[test]
    fn test_io_error_mentions_path_and_cause() {
        let err = AnalysisError::Io {
            path: PathBuf::from("/data/job.py"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/data/job.py"));
        assert!(message.contains("permission denied"));
    }
}
