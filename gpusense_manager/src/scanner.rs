//! Source discovery and batch classification

use gpusense_core::{Analyzer, ClassificationResult};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Which files a scan picks up
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Keep files whose name contains "test"
    pub include_tests: bool,
    /// Descend into hidden and virtualenv directories
    pub include_hidden: bool,
    /// Extra substrings; a path containing any of them is skipped
    pub exclude: Vec<String>,
}

/// Results keyed by path relative to the scan root
pub type BatchResults = BTreeMap<String, ClassificationResult>;

/// Find candidate Python files under `root`, sorted by path
pub fn discover_sources(root: &Path, options: &ScanOptions) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || options.include_hidden || !is_skipped_dir(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_candidate(path, options))
        .collect();

    files.sort();
    files
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.contains("venv") || name == "__pycache__"
}

fn is_candidate(path: &Path, options: &ScanOptions) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("py") {
        return false;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !options.include_tests && name.contains("test") {
        return false;
    }

    let full = path.to_string_lossy();
    !options.exclude.iter().any(|pattern| full.contains(pattern.as_str()))
}

/// Classify every discovered file in parallel
///
/// A failing file never stops the scan; it is reported with its failure result.
pub fn scan_directory(root: &Path, analyzer: &Analyzer, options: &ScanOptions) -> BatchResults {
    let files = discover_sources(root, options);
    tracing::info!("Analyzing {} Python file(s) under {}", files.len(), root.display());

    files
        .par_iter()
        .map(|path| {
            tracing::debug!("Analyzing {}...", path.display());
            (relative_key(root, path), analyzer.analyze_file(path))
        })
        .collect()
}

fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
