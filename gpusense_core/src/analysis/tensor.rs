//! Tensor size estimator
//!
//! Estimates the element count of recognized tensor constructors from
//! literal arguments only. Anything that needs a runtime value makes the
//! whole estimate unknown; partial products are never reported.

use crate::config::{AnalyzerConfig, FrameworkProfile, ShapeConvention, TensorOperation};
use crate::evidence::{TensorCall, TensorSize};
use crate::syntax::{
    dotted_name, elements, integer_literal, is_scalar_literal, line_of, unwrap_parens,
    CallArguments,
};
use tree_sitter::Node;

/// Recognize a tensor constructor call and estimate its size
///
/// Returns the matched framework profile alongside the call so the caller
/// can bucket it against that framework's threshold.
pub fn tensor_call<'c>(
    call: Node<'_>,
    source: &[u8],
    config: &'c AnalyzerConfig,
) -> Option<(TensorCall, &'c FrameworkProfile)> {
    let callee = dotted_name(call.child_by_field_name("function")?, source)?;
    let (framework, operation) = config.match_tensor_operation(&callee)?;
    let args = CallArguments::of(call, source);

    let estimated_size = match (framework.shape_convention, operation) {
        (_, TensorOperation::Literal) => estimate_literal(&args),
        (ShapeConvention::Variadic, TensorOperation::Shape) => {
            estimate_variadic_shape(&args, &framework.shape_keywords, source)
        }
        (ShapeConvention::ShapeArgument, TensorOperation::Shape) => {
            estimate_shape_argument(&args, &framework.shape_keywords, source)
        }
    };

    let tensor_call = TensorCall {
        framework: framework.name.clone(),
        operation: callee,
        estimated_size,
        line: line_of(call),
    };
    Some((tensor_call, framework))
}

/// `tensor([[1, 2], [3, 4]])`: the data is the first positional argument
fn estimate_literal(args: &CallArguments<'_>) -> TensorSize {
    if args.has_splat {
        return TensorSize::Unknown;
    }
    match args.first() {
        Some(data) => count_leaf_literals(data),
        None => TensorSize::Unknown,
    }
}

/// `zeros(3, 4)`, `zeros((3, 4))` or `zeros(size=(3, 4))`
fn estimate_variadic_shape(args: &CallArguments<'_>, keywords: &[String], source: &[u8]) -> TensorSize {
    if args.has_splat {
        return TensorSize::Unknown;
    }

    match args.positional.as_slice() {
        [] => match args.keyword(keywords) {
            Some(shape) => shape_size(shape, source),
            None => TensorSize::Unknown,
        },
        [single] => shape_size(*single, source),
        dims => dims
            .iter()
            .map(|dim| integer_literal(*dim, source))
            .collect::<Option<Vec<u64>>>()
            .map_or(TensorSize::Unknown, |dims| product(&dims)),
    }
}

/// `zeros([3, 4])`, `fill([2, 3], 9)` or `zeros(shape=[3, 4])`
fn estimate_shape_argument(args: &CallArguments<'_>, keywords: &[String], source: &[u8]) -> TensorSize {
    if args.has_splat {
        return TensorSize::Unknown;
    }
    match args.first().or_else(|| args.keyword(keywords)) {
        Some(shape) => shape_size(shape, source),
        None => TensorSize::Unknown,
    }
}

/// Size described by one shape-bearing expression: an integer or a
/// non-empty literal sequence of integers
fn shape_size(shape: Node<'_>, source: &[u8]) -> TensorSize {
    let shape = unwrap_parens(shape);
    match shape.kind() {
        "integer" => integer_literal(shape, source).map_or(TensorSize::Unknown, TensorSize::Known),
        "list" | "tuple" => {
            let dims = elements(shape);
            if dims.is_empty() {
                return TensorSize::Unknown;
            }
            dims.iter()
                .map(|dim| integer_literal(*dim, source))
                .collect::<Option<Vec<u64>>>()
                .map_or(TensorSize::Unknown, |dims| product(&dims))
        }
        _ => TensorSize::Unknown,
    }
}

fn product(dims: &[u64]) -> TensorSize {
    TensorSize::Known(dims.iter().fold(1u64, |acc, d| acc.saturating_mul(*d)))
}

/// Number of scalar literals at any depth of a nested list/tuple literal
///
/// Uses an explicit work-stack so arbitrarily deep nesting cannot exhaust
/// the call stack. Unknown if the value is not a sequence, if any element
/// is neither a scalar literal nor a sequence, or if there are no leaves.
pub fn count_leaf_literals(value: Node<'_>) -> TensorSize {
    let value = unwrap_parens(value);
    if !matches!(value.kind(), "list" | "tuple") {
        return TensorSize::Unknown;
    }

    let mut leaves: u64 = 0;
    let mut stack = vec![value];
    while let Some(sequence) = stack.pop() {
        for element in elements(sequence) {
            let element = unwrap_parens(element);
            match element.kind() {
                "list" | "tuple" => stack.push(element),
                _ if is_scalar_literal(element) => leaves += 1,
                _ => return TensorSize::Unknown,
            }
        }
    }

    if leaves == 0 {
        TensorSize::Unknown
    } else {
        TensorSize::Known(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_python;
    use std::path::Path;

    fn estimate(code: &str) -> Option<u64> {
        let config = AnalyzerConfig::default();
        let tree = parse_python(Path::new("t.py"), code).unwrap();
        let statement = tree.root_node().named_child(0).unwrap();
        let call = statement.named_child(0).unwrap();
        assert_eq!(call.kind(), "call", "not a call: {}", code);
        tensor_call(call, code.as_bytes(), &config)
            .map(|(c, _)| c)
            .expect("not a recognized tensor op")
            .estimated_size
            .known()
    }

    #[test]
    fn test_pytorch_shape_multiplication() {
        assert_eq!(estimate("torch.zeros(3, 4)"), Some(12));
        assert_eq!(estimate("torch.zeros((2, 5))"), Some(10));
        assert_eq!(estimate("torch.ones(16)"), Some(16));
        assert_eq!(estimate("torch.randn(128, 256)"), Some(128 * 256));
        assert_eq!(estimate("torch.empty()"), None);
        assert_eq!(estimate("torch.zeros(a, b)"), None);
    }

    #[test]
    fn test_pytorch_shape_edge_cases() {
        assert_eq!(estimate("torch.zeros([2, 3])"), Some(6));
        assert_eq!(estimate("torch.zeros(size=(4, 4))"), Some(16));
        assert_eq!(estimate("torch.zeros(3, 4, dtype=torch.float16)"), Some(12));
        assert_eq!(estimate("torch.zeros(0, 4)"), Some(0));
        assert_eq!(estimate("torch.zeros(())"), None);
        assert_eq!(estimate("torch.zeros(3, n)"), None);
        assert_eq!(estimate("torch.zeros(*shape)"), None);
        assert_eq!(estimate("torch.zeros(x.shape)"), None);
        assert_eq!(estimate("torch.zeros(get_shape())"), None);
        assert_eq!(estimate("torch.zeros(2.5, 4)"), None);
        assert_eq!(estimate("torch.zeros((2, 5), 3)"), None);
        assert_eq!(estimate("torch.zeros((2, 'a'))"), None);
        assert_eq!(estimate("torch.zeros(-1)"), None);
    }

    #[test]
    fn test_pytorch_literal_counting() {
        assert_eq!(estimate("torch.tensor([2.0])"), Some(1));
        assert_eq!(estimate("torch.tensor([1, 2, 3])"), Some(3));
        assert_eq!(estimate("torch.tensor([[1, 2], [3, 4]])"), Some(4));
        assert_eq!(estimate("torch.tensor([[1, 2, 3], [4]])"), Some(4));
        assert_eq!(estimate("torch.tensor([-1, 2])"), Some(2));
        assert_eq!(estimate("torch.tensor([])"), None);
        assert_eq!(estimate("torch.tensor([[], []])"), None);
        assert_eq!(estimate("torch.tensor([a, 1])"), None);
        assert_eq!(estimate("torch.tensor(data)"), None);
        assert_eq!(estimate("torch.tensor(3.0)"), None);
    }

    #[test]
    fn test_hundred_by_hundred_literal() {
        let row = format!("[{}]", (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join(", "));
        let rows = vec![row; 100].join(", ");
        assert_eq!(estimate(&format!("torch.tensor([{}])", rows)), Some(100 * 100));
    }

    #[test]
    fn test_tensorflow_shapes() {
        assert_eq!(estimate("tf.zeros([3, 4])"), Some(12));
        assert_eq!(estimate("tf.zeros((2, 5))"), Some(10));
        assert_eq!(estimate("tf.ones([16])"), Some(16));
        assert_eq!(estimate("tf.random.uniform([128, 256])"), Some(128 * 256));
        assert_eq!(estimate("tf.fill([2, 3], 9)"), Some(6));
        assert_eq!(estimate("tf.zeros(shape=[5, 5])"), Some(25));
        assert_eq!(estimate("tf.zeros(7)"), Some(7));
        assert_eq!(estimate("tf.zeros([])"), None);
        assert_eq!(estimate("tf.zeros(shape)"), None);
        assert_eq!(estimate("tf.zeros([n, 4])"), None);
        assert_eq!(estimate("tf.zeros([i for i in range(3)])"), None);
    }

    #[test]
    fn test_tensorflow_constant() {
        assert_eq!(estimate("tf.constant([2.0])"), Some(1));
        assert_eq!(estimate("tf.constant([1, 2, 3])"), Some(3));
        assert_eq!(estimate("tf.constant([[1, 2], [3, 4]])"), Some(4));
        assert_eq!(estimate("tf.constant([[1.0], [2.0]], dtype=tf.float32)"), Some(2));
        assert_eq!(estimate("tf.constant()"), None);
    }

    #[test]
    fn test_saturating_product() {
        assert_eq!(
            estimate("torch.zeros(4294967296, 4294967296, 16)"),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_unrecognized_calls() {
        let config = AnalyzerConfig::default();
        for code in ["np.zeros(3)", "zeros(3)", "torch.matmul(a, b)", "make().zeros(3)"] {
            let tree = parse_python(Path::new("t.py"), code).unwrap();
            let call = tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
            assert!(tensor_call(call, code.as_bytes(), &config).is_none(), "{}", code);
        }
    }

    #[test]
    fn test_deeply_nested_literal_does_not_overflow() {
        let depth = 5_000;
        let code = format!("torch.tensor({}1{})", "[".repeat(depth), "]".repeat(depth));
        let config = AnalyzerConfig::default();
        let tree = parse_python(Path::new("deep.py"), &code).unwrap();
        let call = tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
        let (found, _) = tensor_call(call, code.as_bytes(), &config).unwrap();
        assert_eq!(found.estimated_size, TensorSize::Known(1));
    }
}
