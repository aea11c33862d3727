//! Import recognizer

use crate::config::AnalyzerConfig;
use crate::syntax::{dotted_name, elements};
use tree_sitter::Node;

/// Recognized framework names imported by an `import` / `from ... import` statement
///
/// Matching is on the root package of the imported module; aliases and
/// imported symbols are ignored. Relative imports never match.
pub fn recognized_imports(node: Node<'_>, source: &[u8], config: &AnalyzerConfig) -> Vec<String> {
    let modules: Vec<String> = match node.kind() {
        "import_statement" => elements(node)
            .into_iter()
            .filter_map(|name| imported_module(name, source))
            .collect(),
        "import_from_statement" => node
            .child_by_field_name("module_name")
            .and_then(|module| dotted_name_of_module(module, source))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    };

    modules
        .iter()
        .filter_map(|module| module.split('.').next())
        .filter(|root| config.recognized_imports.iter().any(|r| r == root))
        .map(str::to_string)
        .collect()
}

/// Module named by one entry of `import a.b, c as d`
fn imported_module(entry: Node<'_>, source: &[u8]) -> Option<String> {
    match entry.kind() {
        "dotted_name" => dotted_name_of_module(entry, source),
        "aliased_import" => entry
            .child_by_field_name("name")
            .and_then(|name| dotted_name_of_module(name, source)),
        _ => None,
    }
}

fn dotted_name_of_module(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => {
            let parts: Option<Vec<&str>> = elements(node)
                .into_iter()
                .map(|part| part.utf8_text(source).ok())
                .collect();
            parts.map(|p| p.join("."))
        }
        // `from . import x` and `from .pkg import x`
        "relative_import" => None,
        _ => dotted_name(node, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_python;
    use std::path::Path;

    fn imports_of(src: &str) -> Vec<String> {
        let config = AnalyzerConfig::default();
        let tree = parse_python(Path::new("t.py"), src).unwrap();
        elements(tree.root_node())
            .into_iter()
            .flat_map(|stmt| recognized_imports(stmt, src.as_bytes(), &config))
            .collect()
    }

    #[test]
    fn test_plain_imports() {
        assert_eq!(imports_of("import torch\n"), vec!["torch"]);
        assert_eq!(imports_of("import os, jax, sys\n"), vec!["jax"]);
        assert!(imports_of("import pandas\nimport numpy as np\n").is_empty());
    }

    #[test]
    fn test_aliased_and_dotted_imports() {
        assert_eq!(imports_of("import tensorflow as tf\n"), vec!["tensorflow"]);
        assert_eq!(imports_of("import torch.nn as nn\n"), vec!["torch"]);
    }

    #[test]
    fn test_from_imports() {
        assert_eq!(imports_of("from cupy import asarray\n"), vec!["cupy"]);
        assert_eq!(imports_of("from tensorflow.keras import layers\n"), vec!["tensorflow"]);
        assert!(imports_of("from . import torch\n").is_empty());
        assert!(imports_of("from .torch import zeros\n").is_empty());
        assert!(imports_of("from mylib import torch\n").is_empty());
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        assert!(imports_of("import torchvision\n").is_empty());
        assert!(imports_of("import jaxlib\n").is_empty());
    }
}
