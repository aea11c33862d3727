//! Per-file entry point: source text in, classification out
//!
//! An `Analyzer` only holds immutable configuration and builds a fresh
//! parser for every call, so one instance can be shared across threads.

use crate::analysis::collect_evidence;
use crate::classifier::Classifier;
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::evidence::Evidence;
use crate::report::ClassificationResult;
use crate::syntax::parse_python;
use log::warn;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
    classifier: Classifier,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let classifier = Classifier::new(config.confidence.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classify source text; never fails, errors become failure results
    pub fn classify(&self, path: &Path, source: &str) -> ClassificationResult {
        self.try_classify(path, source)
            .unwrap_or_else(|error| failed(&error))
    }

    /// Classify raw file bytes, treating invalid UTF-8 as an I/O failure
    pub fn classify_bytes(&self, path: &Path, bytes: &[u8]) -> ClassificationResult {
        match std::str::from_utf8(bytes) {
            Ok(source) => self.classify(path, source),
            Err(source) => failed(&AnalysisError::Encoding {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Read and classify a file from disk
    pub fn analyze_file(&self, path: &Path) -> ClassificationResult {
        match std::fs::read(path) {
            Ok(bytes) => self.classify_bytes(path, &bytes),
            Err(source) => failed(&AnalysisError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Classify source text, surfacing the typed error
    pub fn try_classify(&self, path: &Path, source: &str) -> AnalysisResult<ClassificationResult> {
        let evidence = self.collect(path, source)?;
        let verdict = self.classifier.classify(&evidence);
        Ok(ClassificationResult::from_verdict(verdict, evidence))
    }

    /// Parse and walk the source without classifying
    pub fn collect(&self, path: &Path, source: &str) -> AnalysisResult<Evidence> {
        let source = source.strip_prefix(UTF8_BOM).unwrap_or(source);
        let tree = parse_python(path, source)?;
        Ok(collect_evidence(&tree, source.as_bytes(), &self.config))
    }
}

fn failed(error: &AnalysisError) -> ClassificationResult {
    warn!("{}", error);
    ClassificationResult::failure(error)
}

/// Classify one file's text with the given configuration
pub fn classify(path: &Path, source: &str, config: &AnalyzerConfig) -> ClassificationResult {
    Analyzer::new(config.clone()).classify(path, source)
}
