//! Explicit-device detector
//!
//! Recognizes the three call shapes that pin work to the GPU no matter how
//! big the tensors are:
//! - `torch.device("cuda")` (any callee whose last name is a device constructor)
//! - `x.to("cuda")`
//! - `x.cuda()`
//!
//! A device string picked at runtime (`"cuda" if ok else "cpu"`) is not a
//! literal and is ignored.

use crate::config::AnalyzerConfig;
use crate::evidence::ExplicitDeviceCall;
use crate::syntax::{compact_text, line_of, string_literal, unwrap_parens, CallArguments};
use tree_sitter::Node;

pub fn explicit_device_call(
    call: Node<'_>,
    source: &[u8],
    config: &AnalyzerConfig,
) -> Option<ExplicitDeviceCall> {
    let function = unwrap_parens(call.child_by_field_name("function")?);
    let (callee_name, is_method) = match function.kind() {
        "identifier" => (function.utf8_text(source).ok()?, false),
        "attribute" => (
            function.child_by_field_name("attribute")?.utf8_text(source).ok()?,
            true,
        ),
        _ => return None,
    };

    let is_one_of = |names: &[String]| names.iter().any(|n| n == callee_name);

    let matched = if is_method && is_one_of(&config.accelerator_methods) {
        true
    } else if (is_method && is_one_of(&config.transfer_methods))
        || is_one_of(&config.device_constructors)
    {
        let args = CallArguments::of(call, source);
        args.first()
            .and_then(|arg| string_literal(arg, source))
            .map_or(false, |value| config.is_device_literal(&value))
    } else {
        false
    };

    matched.then(|| ExplicitDeviceCall {
        call: compact_text(function, source),
        line: line_of(call),
    })
}
