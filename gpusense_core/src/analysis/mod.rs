//! Evidence collection
//!
//! One pass over the syntax tree. Each node is dispatched on its kind to the
//! matching recognizer and the result is folded into an `Evidence` value:
//! - `imports`: import statements naming recognized frameworks
//! - `device`: calls that pin execution to the GPU
//! - `tensor`: tensor constructors with statically known sizes
//!
//! The walk uses a tree cursor, so stack usage does not grow with nesting.

pub mod device;
pub mod imports;
pub mod tensor;

use crate::config::AnalyzerConfig;
use crate::evidence::Evidence;
use log::debug;
use tree_sitter::{Node, Tree};

/// Walk the whole tree and gather evidence
pub fn collect_evidence(tree: &Tree, source: &[u8], config: &AnalyzerConfig) -> Evidence {
    let mut evidence = Evidence::default();
    let mut cursor = tree.walk();

    loop {
        evidence = fold_node(evidence, cursor.node(), source, config);

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return evidence;
            }
        }
    }
}

/// Fold a single node into the accumulator
fn fold_node(evidence: Evidence, node: Node<'_>, source: &[u8], config: &AnalyzerConfig) -> Evidence {
    match node.kind() {
        "import_statement" | "import_from_statement" => imports::recognized_imports(node, source, config)
            .into_iter()
            .fold(evidence, |acc, name| {
                debug!("recognized import '{}' at line {}", name, node.start_position().row + 1);
                acc.record_import(name)
            }),
        "call" => {
            let mut evidence = evidence;
            if let Some(explicit) = device::explicit_device_call(node, source, config) {
                debug!("explicit device call '{}' at line {}", explicit.call, explicit.line);
                evidence = evidence.record_explicit_call(explicit);
            }
            if let Some((call, framework)) = tensor::tensor_call(node, source, config) {
                debug!(
                    "{} tensor call '{}' at line {}: {} elements",
                    call.framework, call.operation, call.line, call.estimated_size
                );
                evidence = evidence.record_tensor_call(call, framework.threshold);
            }
            evidence
        }
        _ => evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_python;
    use std::path::Path;

    fn collect(src: &str) -> Evidence {
        let tree = parse_python(Path::new("t.py"), src).unwrap();
        collect_evidence(&tree, src.as_bytes(), &AnalyzerConfig::default())
    }

    #[test]
    fn test_empty_source_has_no_evidence() {
        assert!(collect("").is_empty());
        assert!(collect("x = 1\nprint(x)\n").is_empty());
    }

    #[test]
    fn test_nested_calls_are_all_visited() {
        let evidence = collect(
            "import torch\n\
             def build():\n\
             \x20   net = Net(torch.zeros(2, 2)).to('cuda')\n\
             \x20   return net\n",
        );
        assert_eq!(evidence.imports.len(), 1);
        assert_eq!(evidence.explicit_calls.len(), 1);
        assert_eq!(evidence.explicit_calls[0].line, 3);
        assert_eq!(evidence.small_calls.len(), 1);
        assert_eq!(evidence.small_calls[0].estimated_size.known(), Some(4));
    }

    #[test]
    fn test_imports_inside_functions_count() {
        let evidence = collect("def f():\n    import jax\n    return jax\n");
        assert!(evidence.imports.contains("jax"));
    }

    #[test]
    fn test_tensor_buckets_use_framework_threshold() {
        let mut config = AnalyzerConfig::default();
        config.frameworks[1].threshold = 10;
        let src = "import torch\nimport tensorflow as tf\nx = torch.zeros(4, 4)\ny = tf.zeros([4, 4])\n";
        let tree = parse_python(Path::new("t.py"), src).unwrap();
        let evidence = collect_evidence(&tree, src.as_bytes(), &config);

        assert_eq!(evidence.small_calls.len(), 1);
        assert_eq!(evidence.small_calls[0].framework, "pytorch");
        assert_eq!(evidence.big_calls.len(), 1);
        assert_eq!(evidence.big_calls[0].framework, "tensorflow");
    }

    #[test]
    fn test_unknown_sizes_are_kept_apart() {
        let evidence = collect("import torch\nx = torch.zeros(n, n)\n");
        assert!(evidence.small_calls.is_empty());
        assert!(evidence.big_calls.is_empty());
        assert_eq!(evidence.unestimated_calls.len(), 1);
    }

    #[test]
    fn test_deeply_nested_calls_do_not_overflow() {
        let depth = 5_000;
        let src = format!("import torch\nx = {}torch.ones(2){}\n", "f(".repeat(depth), ")".repeat(depth));
        let tree = parse_python(Path::new("deep.py"), &src).unwrap();
        let evidence = collect_evidence(&tree, src.as_bytes(), &AnalyzerConfig::default());
        assert_eq!(evidence.small_calls.len(), 1);
    }
}
