//! Thin layer over tree-sitter-python
//!
//! Parsing, syntax-error location, and the few node helpers the recognizers
//! share (dotted names, literals, call arguments). Nothing here recurses on
//! input depth: chains and nesting are walked with loops.

use crate::error::{AnalysisError, AnalysisResult};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Parse Python source into a syntax tree
///
/// Rejects trees with ERROR/MISSING nodes and trees the grammar accepts but
/// Python 3 does not (Python 2 statements, misaligned statements, ...).
pub fn parse_python(path: &Path, source: &str) -> AnalysisResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| AnalysisError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalysisError::Grammar("parser returned no tree".to_string()))?;

    let root = tree.root_node();
    let bytes = source.as_bytes();
    let violation =
        first_syntax_error(root, bytes).or_else(|| first_grammar_violation(root, bytes));
    if let Some(error) = violation {
        return Err(AnalysisError::Syntax {
            path: path.to_path_buf(),
            line: error.line,
            column: error.column,
            message: error.message,
        });
    }

    Ok(tree)
}

/// Location and description of the first ERROR or MISSING node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorSite {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

pub fn first_syntax_error(root: Node<'_>, source: &[u8]) -> Option<SyntaxErrorSite> {
    if !root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_missing() || node.is_error() {
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                match node.utf8_text(source).ok().map(str::trim).filter(|t| !t.is_empty()) {
                    Some(text) => format!("invalid syntax near `{}`", snippet(text)),
                    None => "invalid syntax".to_string(),
                }
            };
            let position = node.start_position();
            return Some(SyntaxErrorSite {
                line: position.row + 1,
                column: position.column + 1,
                message,
            });
        }

        // Only subtrees that contain an error are worth entering
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                if cursor.node().has_error() {
                    break;
                }
                continue;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// First construct tree-sitter accepts that Python 3 rejects
///
/// Only meaningful on a tree without ERROR nodes. Every node is visited once
/// with a cursor.
pub fn first_grammar_violation(root: Node<'_>, source: &[u8]) -> Option<SyntaxErrorSite> {
    let mut cursor = root.walk();
    loop {
        if let Some((node, message)) = grammar_violation(cursor.node(), source) {
            let position = node.start_position();
            return Some(SyntaxErrorSite {
                line: position.row + 1,
                column: position.column + 1,
                message,
            });
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn grammar_violation<'t>(node: Node<'t>, source: &[u8]) -> Option<(Node<'t>, String)> {
    match node.kind() {
        "print_statement" | "exec_statement" => {
            let keyword = node.kind().trim_end_matches("_statement");
            Some((node, format!("Python 2 `{}` statement", keyword)))
        }
        "named_expression" => {
            let parent = node.parent()?;
            matches!(
                parent.kind(),
                "expression_statement" | "assignment" | "augmented_assignment"
            )
            .then(|| (node, "unparenthesized assignment expression".to_string()))
        }
        "argument_list" => misordered_argument(node),
        "module" | "block" => misaligned_statement(node, source),
        _ => None,
    }
}

fn misordered_argument(arguments: Node<'_>) -> Option<(Node<'_>, String)> {
    let mut seen_keyword = false;
    let mut seen_mapping_splat = false;
    for argument in elements(arguments) {
        let message = match argument.kind() {
            "keyword_argument" => {
                seen_keyword = true;
                continue;
            }
            "dictionary_splat" => {
                seen_mapping_splat = true;
                continue;
            }
            "list_splat" if seen_mapping_splat => {
                "iterable argument unpacking follows keyword argument unpacking"
            }
            "list_splat" => continue,
            _ if seen_mapping_splat => "positional argument follows keyword argument unpacking",
            _ if seen_keyword => "positional argument follows keyword argument",
            _ => continue,
        };
        return Some((argument, message.to_string()));
    }
    None
}

/// Statements of one suite that start a line must share its indentation
///
/// tree-sitter-python closes a block on any dedent, even one that lands
/// between two enclosing levels.
fn misaligned_statement<'t>(body: Node<'t>, source: &[u8]) -> Option<(Node<'t>, String)> {
    let mut indent = (body.kind() == "module").then_some(0);
    for statement in elements(body) {
        if !starts_line(statement, source) {
            continue;
        }
        let column = statement.start_position().column;
        match indent {
            None => indent = Some(column),
            Some(expected) if column > expected => {
                return Some((statement, "unexpected indent".to_string()));
            }
            Some(expected) if column < expected => {
                return Some((
                    statement,
                    "unindent does not match any outer indentation level".to_string(),
                ));
            }
            Some(_) => {}
        }
    }
    None
}

/// Whether only whitespace precedes a node on its line
fn starts_line(node: Node<'_>, source: &[u8]) -> bool {
    let start = node.start_byte();
    start
        .checked_sub(node.start_position().column)
        .and_then(|line_start| source.get(line_start..start))
        .map_or(false, |prefix| prefix.iter().all(|&b| matches!(b, b' ' | b'\t' | b'\x0c')))
}

fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > 40 {
        let cut: String = first_line.chars().take(40).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

/// 1-based line of a node
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Source text of a node with all whitespace removed
pub fn compact_text(node: Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source)
        .map(|t| t.split_whitespace().collect())
        .unwrap_or_default()
}

/// `a.b.c` for a pure identifier/attribute chain, `None` otherwise
pub fn dotted_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "identifier" => {
                parts.push(current.utf8_text(source).ok()?);
                break;
            }
            "attribute" => {
                let attr = current.child_by_field_name("attribute")?;
                parts.push(attr.utf8_text(source).ok()?);
                current = current.child_by_field_name("object")?;
            }
            _ => return None,
        }
    }
    parts.reverse();
    Some(parts.join("."))
}

/// Strip any number of redundant parentheses
pub fn unwrap_parens(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        let mut cursor = current.walk();
        let inner = current
            .named_children(&mut cursor)
            .find(|child| !child.is_extra());
        match inner {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Named, non-comment children
pub fn elements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// Value of a plain (non-interpolated, non-concatenated) string literal
pub fn string_literal(node: Node<'_>, source: &[u8]) -> Option<String> {
    let node = unwrap_parens(node);
    if node.kind() != "string" {
        return None;
    }

    let mut value = String::new();
    for child in elements(node) {
        match child.kind() {
            "string_start" | "string_end" => {}
            "string_content" => value.push_str(child.utf8_text(source).ok()?),
            _ => return None,
        }
    }
    Some(value)
}

/// Value of a non-negative integer literal (`1_000`, `0x10`, ...)
///
/// Literals too large for `u64` saturate; imaginary literals are rejected.
pub fn integer_literal(node: Node<'_>, source: &[u8]) -> Option<u64> {
    let node = unwrap_parens(node);
    if node.kind() != "integer" {
        return None;
    }
    parse_integer(node.utf8_text(source).ok()?)
}

fn parse_integer(text: &str) -> Option<u64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if cleaned.ends_with(['j', 'J']) {
        return None;
    }
    let cleaned = cleaned.trim_end_matches(['l', 'L']);

    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(u64::from_str_radix(digits, radix).unwrap_or(u64::MAX))
}

/// Whether a node is a scalar literal (number, string, bool or None)
pub fn is_scalar_literal(node: Node<'_>) -> bool {
    let node = unwrap_parens(node);
    match node.kind() {
        "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none" => {
            // f-strings are not constants
            !(node.kind() == "string" && has_interpolation(node))
        }
        "unary_operator" => node
            .child_by_field_name("argument")
            .map(unwrap_parens)
            .map_or(false, |arg| matches!(arg.kind(), "integer" | "float")),
        _ => false,
    }
}

fn has_interpolation(node: Node<'_>) -> bool {
    elements(node).iter().any(|child| child.kind() == "interpolation")
}

/// Arguments of a call, split the way the recognizers need them
#[derive(Debug, Default)]
pub struct CallArguments<'tree> {
    pub positional: Vec<Node<'tree>>,
    pub keywords: Vec<(String, Node<'tree>)>,
    /// `*args` or `**kwargs` present: the real argument list is unknowable
    pub has_splat: bool,
}

impl<'tree> CallArguments<'tree> {
    pub fn of(call: Node<'tree>, source: &[u8]) -> Self {
        let mut args = Self::default();
        let Some(list) = call.child_by_field_name("arguments") else {
            return args;
        };
        if list.kind() != "argument_list" {
            // `f(x for x in xs)`
            args.positional.push(list);
            return args;
        }

        for child in elements(list) {
            match child.kind() {
                "keyword_argument" => {
                    let name = child
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(source).ok())
                        .unwrap_or_default()
                        .to_string();
                    if let Some(value) = child.child_by_field_name("value") {
                        args.keywords.push((name, value));
                    }
                }
                "list_splat" | "dictionary_splat" => args.has_splat = true,
                _ => args.positional.push(child),
            }
        }
        args
    }

    pub fn first(&self) -> Option<Node<'tree>> {
        self.positional.first().copied()
    }

    pub fn keyword(&self, names: &[String]) -> Option<Node<'tree>> {
        self.keywords
            .iter()
            .find(|(name, _)| names.iter().any(|n| n == name))
            .map(|(_, value)| *value)
    }
}
