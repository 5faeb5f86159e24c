//! Shared tree-sitter utilities for language support modules.
//!
//! Provides common functions for parsing source and extracting text from
//! tree-sitter nodes. Used by the grammar-backed extractors.

use super::common::ExtractError;

/// Parse `source` with `language`, rejecting trees that contain errors.
pub fn parse_clean(
    language: &tree_sitter::Language,
    source: &str,
) -> Result<tree_sitter::Tree, ExtractError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(language)
        .map_err(|e| ExtractError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::Grammar("parser returned no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(&root).unwrap_or(1);
        return Err(ExtractError::Syntax(format!("syntax error near line {line}")));
    }

    Ok(tree)
}

/// 1-indexed line of the first `ERROR` or missing node under `node`.
fn first_error_line(node: &tree_sitter::Node) -> Option<usize> {
    let mut current = *node;
    loop {
        if current.is_error() || current.is_missing() {
            return Some(current.start_position().row + 1);
        }
        let mut cursor = current.walk();
        current = current
            .children(&mut cursor)
            .find(tree_sitter::Node::has_error)?;
    }
}

/// Get text content of a tree-sitter node.
///
/// Returns `None` if the node's byte range contains invalid UTF-8.
pub fn node_text(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    match std::str::from_utf8(&content[node.byte_range()]) {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            tracing::trace!(
                byte_range = ?node.byte_range(),
                error = %e,
                node_kind = %node.kind(),
                "Failed to decode node text as UTF-8"
            );
            None
        }
    }
}

/// Text of the named field `field` on `node`.
pub fn field_text(node: &tree_sitter::Node, field: &str, content: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|child| node_text(&child, content))
}
