//! Rust language support.
//!
//! Implements extraction for Rust source files using tree-sitter-rust.
//! Interfaces are the `pub` items at file level; imports are `use`
//! declarations at file level, flattened so that every leaf of a use tree
//! becomes a `path -> name` pair.

use std::collections::HashMap;

use super::common::{ExtractError, Extraction, first_line, squash_whitespace};
use super::tree_sitter_utils::{field_text, node_text, parse_clean};
use super::LanguageSupport;
use crate::types::{Import, Interface, InterfaceKind, Language, SymbolUse, UseKind};

/// Tree-sitter node kind constants for Rust grammar.
///
/// These match the node types defined in tree-sitter-rust. Using constants
/// prevents typos and makes supported node types explicit.
mod node_kinds {
    // Item declarations
    pub const FUNCTION_ITEM: &str = "function_item";
    pub const STRUCT_ITEM: &str = "struct_item";
    pub const ENUM_ITEM: &str = "enum_item";
    pub const UNION_ITEM: &str = "union_item";
    pub const TRAIT_ITEM: &str = "trait_item";
    pub const IMPL_ITEM: &str = "impl_item";
    pub const CONST_ITEM: &str = "const_item";
    pub const STATIC_ITEM: &str = "static_item";
    pub const TYPE_ITEM: &str = "type_item";
    pub const USE_DECLARATION: &str = "use_declaration";

    // Structure nodes
    pub const VISIBILITY_MODIFIER: &str = "visibility_modifier";
    pub const LINE_COMMENT: &str = "line_comment";
    pub const BLOCK_COMMENT: &str = "block_comment";
    pub const ATTRIBUTE_ITEM: &str = "attribute_item";
    pub const TYPE_IDENTIFIER: &str = "type_identifier";
    pub const GENERIC_TYPE: &str = "generic_type";
    pub const SCOPED_TYPE_IDENTIFIER: &str = "scoped_type_identifier";

    // Use statement nodes
    pub const USE_LIST: &str = "use_list";
    pub const SCOPED_USE_LIST: &str = "scoped_use_list";
    pub const USE_WILDCARD: &str = "use_wildcard";
    pub const USE_AS_CLAUSE: &str = "use_as_clause";
    pub const SCOPED_IDENTIFIER: &str = "scoped_identifier";
    pub const IDENTIFIER: &str = "identifier";
    pub const CRATE: &str = "crate";
    pub const SELF: &str = "self";
    pub const SUPER: &str = "super";

    // Expression nodes
    pub const CALL_EXPRESSION: &str = "call_expression";
    pub const STRUCT_EXPRESSION: &str = "struct_expression";
}

/// Rust language support implementation.
pub struct RustLanguage;

impl LanguageSupport for RustLanguage {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn extract(&self, source: &str) -> Result<Extraction, ExtractError> {
        let tree = parse_clean(&tree_sitter_rust::LANGUAGE.into(), source)?;
        let content = source.as_bytes();
        let root = tree.root_node();

        let mut extraction = Extraction {
            summary: module_summary(&root, content),
            imports: extract_use_statements(&root, content),
            ..Extraction::default()
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if let Some(interface) = extract_interface(&child, content) {
                extraction.interfaces.push(interface);
            }
        }

        collect_symbol_uses(&root, content, &mut extraction.symbol_uses);
        Ok(extraction)
    }
}

/// First `//!` line at the top of the file.
fn module_summary(root: &tree_sitter::Node, content: &[u8]) -> String {
    let mut lines = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != node_kinds::LINE_COMMENT {
            if child.kind() == node_kinds::BLOCK_COMMENT {
                continue;
            }
            break;
        }
        let Some(text) = node_text(&child, content) else {
            continue;
        };
        if let Some(doc) = text.trim().strip_prefix("//!") {
            lines.push(doc.trim().to_string());
        }
    }
    first_line(&lines.join("\n"))
}

/// Collect the `use` declarations at file level.
///
/// Leaves sharing a path are merged into one [`Import`], so
/// `use std::{fmt, io::{Read, Write}}` yields `std -> [fmt]` and
/// `std::io -> [Read, Write]`.
fn extract_use_statements(root: &tree_sitter::Node, content: &[u8]) -> Vec<Import> {
    let mut imports: Vec<Import> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() != node_kinds::USE_DECLARATION {
            continue;
        }
        let Some(argument) = child.child_by_field_name("argument") else {
            continue;
        };

        let mut leaves = Vec::new();
        flatten_use_tree(&argument, content, &mut leaves);

        for (path, name) in leaves {
            let (target, name) = match (path.is_empty(), name) {
                (true, Some(name)) => (name, None),
                (true, None) => continue,
                (false, name) => (path.join("::"), name),
            };

            let slot = *slots.entry(target.clone()).or_insert_with(|| {
                imports.push(Import::new(target, Vec::new()));
                imports.len() - 1
            });
            if let Some(name) = name {
                let names = &mut imports[slot].names;
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    imports
}

/// Walk a use tree, emitting `(path, imported name)` leaves.
///
/// A glob leaf has no name. `self` inside a list refers to the path itself.
fn flatten_use_tree(
    root: &tree_sitter::Node,
    content: &[u8],
    leaves: &mut Vec<(Vec<String>, Option<String>)>,
) {
    use node_kinds::{
        CRATE, IDENTIFIER, SCOPED_IDENTIFIER, SCOPED_USE_LIST, SELF, SUPER, USE_AS_CLAUSE,
        USE_LIST, USE_WILDCARD,
    };

    let mut stack = vec![(*root, Vec::<String>::new())];
    while let Some((node, prefix)) = stack.pop() {
        match node.kind() {
            SCOPED_IDENTIFIER => {
                let mut segments = prefix;
                collect_scoped_path(&node, content, &mut segments);
                let name = segments.pop();
                leaves.push((segments, name));
            }
            IDENTIFIER | CRATE | SUPER => {
                if let Some(text) = node_text(&node, content) {
                    leaves.push((prefix, Some(text)));
                }
            }
            SELF => {
                if prefix.is_empty() {
                    leaves.push((Vec::new(), Some("self".to_string())));
                } else {
                    let mut path = prefix;
                    let name = path.pop();
                    leaves.push((path, name));
                }
            }
            USE_AS_CLAUSE => {
                if let Some(path_node) = node.child_by_field_name("path") {
                    stack.push((path_node, prefix));
                }
            }
            USE_WILDCARD => {
                let mut segments = prefix;
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    collect_scoped_path(&child, content, &mut segments);
                }
                leaves.push((segments, None));
            }
            SCOPED_USE_LIST => {
                let mut segments = prefix;
                if let Some(path_node) = node.child_by_field_name("path") {
                    collect_scoped_path(&path_node, content, &mut segments);
                }
                if let Some(list) = node.child_by_field_name("list") {
                    stack.push((list, segments));
                }
            }
            USE_LIST => {
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                for child in children.into_iter().rev() {
                    stack.push((child, prefix.clone()));
                }
            }
            _ => {}
        }
    }
}

/// Append the segments of a scoped path, outermost first.
fn collect_scoped_path(node: &tree_sitter::Node, content: &[u8], segments: &mut Vec<String>) {
    use node_kinds::{CRATE, IDENTIFIER, SCOPED_IDENTIFIER, SELF, SUPER};

    // Paths nest to the left, so walk down collecting names and reverse.
    let mut reversed = Vec::new();
    let mut current = Some(*node);
    while let Some(node) = current {
        current = None;
        match node.kind() {
            SCOPED_IDENTIFIER => {
                if let Some(text) = node
                    .child_by_field_name("name")
                    .and_then(|name| node_text(&name, content))
                {
                    reversed.push(text);
                }
                current = node.child_by_field_name("path");
            }
            IDENTIFIER | CRATE | SELF | SUPER => {
                if let Some(text) = node_text(&node, content) {
                    reversed.push(text);
                }
            }
            _ => {}
        }
    }
    segments.extend(reversed.into_iter().rev());
}

/// A `pub` item at file level.
fn extract_interface(node: &tree_sitter::Node, content: &[u8]) -> Option<Interface> {
    use node_kinds::{
        CONST_ITEM, ENUM_ITEM, FUNCTION_ITEM, STATIC_ITEM, STRUCT_ITEM, TRAIT_ITEM, TYPE_ITEM,
        UNION_ITEM,
    };

    let kind = match node.kind() {
        FUNCTION_ITEM => InterfaceKind::Function,
        STRUCT_ITEM | ENUM_ITEM | UNION_ITEM | TRAIT_ITEM | TYPE_ITEM => InterfaceKind::Class,
        CONST_ITEM | STATIC_ITEM => InterfaceKind::Const,
        _ => return None,
    };
    if !is_public(node, content) {
        return None;
    }

    let name = field_text(node, "name", content)?;
    let signature = match kind {
        InterfaceKind::Function => function_signature(node, content)?,
        InterfaceKind::Class => type_signature(node, &name, content),
        InterfaceKind::Const => const_signature(node, &name, content),
    };

    Some(Interface {
        name,
        kind,
        signature,
        doc_excerpt: outer_doc(node, content),
    })
}

/// Only bare `pub` counts; `pub(crate)` and friends are not exported.
fn is_public(node: &tree_sitter::Node, content: &[u8]) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| child.kind() == node_kinds::VISIBILITY_MODIFIER)
        .and_then(|vis| node_text(&vis, content))
        .is_some_and(|text| text.trim() == "pub")
}

/// Function signature (just the declaration without body).
fn function_signature(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    let body_start = node
        .child_by_field_name("body")
        .map_or(node.end_byte(), |body| body.start_byte());
    let header = std::str::from_utf8(&content[node.start_byte()..body_start]).ok()?;
    let header = header.trim().trim_end_matches(';');
    Some(squash_whitespace(header))
}

fn type_signature(node: &tree_sitter::Node, name: &str, content: &[u8]) -> String {
    let keyword = match node.kind() {
        node_kinds::STRUCT_ITEM => "struct",
        node_kinds::ENUM_ITEM => "enum",
        node_kinds::UNION_ITEM => "union",
        node_kinds::TRAIT_ITEM => "trait",
        _ => "type",
    };
    let params = field_text(node, "type_parameters", content).unwrap_or_default();
    squash_whitespace(&format!("pub {keyword} {name}{params}"))
}

fn const_signature(node: &tree_sitter::Node, name: &str, content: &[u8]) -> String {
    let keyword = if node.kind() == node_kinds::STATIC_ITEM {
        "static"
    } else {
        "const"
    };
    match field_text(node, "type", content) {
        Some(ty) => squash_whitespace(&format!("pub {keyword} {name}: {ty}")),
        None => format!("pub {keyword} {name}"),
    }
}

/// First `///` line directly above an item, skipping attributes.
fn outer_doc(node: &tree_sitter::Node, content: &[u8]) -> String {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        match sibling.kind() {
            node_kinds::ATTRIBUTE_ITEM => {}
            node_kinds::LINE_COMMENT => {
                let text = node_text(&sibling, content).unwrap_or_default();
                match text.trim().strip_prefix("///") {
                    Some(doc) => lines.push(doc.trim().to_string()),
                    None => break,
                }
            }
            _ => break,
        }
        current = sibling.prev_sibling();
    }
    lines.reverse();
    first_line(&lines.join("\n"))
}

/// Record called names and implemented traits anywhere in the file.
///
/// For scoped calls like `Store::open()` the leading segment is recorded,
/// since that is the name a `use` brings into scope. The walk keeps its own
/// stack so deeply nested expressions cannot exhaust the thread stack.
fn collect_symbol_uses(root: &tree_sitter::Node, content: &[u8], uses: &mut Vec<SymbolUse>) {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.kind() == node_kinds::USE_DECLARATION {
            continue;
        }
        record_symbol_use(&node, content, uses);

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}

fn record_symbol_use(node: &tree_sitter::Node, content: &[u8], uses: &mut Vec<SymbolUse>) {
    use node_kinds::{CALL_EXPRESSION, IDENTIFIER, IMPL_ITEM, SCOPED_IDENTIFIER, STRUCT_EXPRESSION};

    match node.kind() {
        CALL_EXPRESSION => {
            if let Some(function) = node.child_by_field_name("function") {
                let name = match function.kind() {
                    IDENTIFIER => node_text(&function, content),
                    SCOPED_IDENTIFIER => leading_segment(&function, content),
                    _ => None,
                };
                if let Some(name) = name {
                    uses.push(SymbolUse {
                        name,
                        kind: UseKind::Call,
                    });
                }
            }
        }
        STRUCT_EXPRESSION => {
            if let Some(name) = node
                .child_by_field_name("name")
                .and_then(|n| type_name(&n, content))
            {
                uses.push(SymbolUse {
                    name,
                    kind: UseKind::Call,
                });
            }
        }
        IMPL_ITEM => {
            if let Some(name) = node
                .child_by_field_name("trait")
                .and_then(|t| type_name(&t, content))
            {
                uses.push(SymbolUse {
                    name,
                    kind: UseKind::Inherit,
                });
            }
        }
        _ => {}
    }
}

fn leading_segment(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    let mut segments = Vec::new();
    collect_scoped_path(node, content, &mut segments);
    segments
        .into_iter()
        .find(|s| !matches!(s.as_str(), "crate" | "self" | "super"))
}

fn type_name(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    use node_kinds::{GENERIC_TYPE, SCOPED_IDENTIFIER, SCOPED_TYPE_IDENTIFIER, TYPE_IDENTIFIER};

    let mut current = *node;
    loop {
        match current.kind() {
            TYPE_IDENTIFIER => return node_text(&current, content),
            GENERIC_TYPE => current = current.child_by_field_name("type")?,
            SCOPED_TYPE_IDENTIFIER | SCOPED_IDENTIFIER => {
                let path = current.child_by_field_name("path")?;
                return match path.kind() {
                    node_kinds::IDENTIFIER => node_text(&path, content),
                    _ => leading_segment(&path, content),
                };
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> Extraction {
        RustLanguage.extract(code).expect("test source should parse")
    }

    fn import(target: &str, names: &[&str]) -> Import {
        Import::new(target, names.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn summary_from_inner_doc_comment() {
        let code = "//! Storage backends.\n//!\n//! Details.\n\nuse std::fmt;\n";
        assert_eq!(extract(code).summary, "Storage backends.");
    }

    #[test]
    fn extracts_simple_use_statement() {
        let imports = extract("use std::collections::HashMap;").imports;
        assert_eq!(imports, vec![import("std::collections", &["HashMap"])]);
    }

    #[test]
    fn extracts_use_with_list() {
        let imports = extract("use std::collections::{HashMap, HashSet};").imports;
        assert_eq!(
            imports,
            vec![import("std::collections", &["HashMap", "HashSet"])]
        );
    }

    #[test]
    fn nested_use_lists_keep_their_paths() {
        let imports = extract("use crate::{db::Store, auth::{login, logout}};").imports;
        assert_eq!(
            imports,
            vec![
                import("crate::db", &["Store"]),
                import("crate::auth", &["login", "logout"]),
            ]
        );
    }

    #[test]
    fn extracts_crate_self_and_super_paths() {
        let code = "use crate::auth::Authenticator;\nuse self::inner::Helper;\nuse super::Config;\n";
        let imports = extract(code).imports;
        assert_eq!(
            imports,
            vec![
                import("crate::auth", &["Authenticator"]),
                import("self::inner", &["Helper"]),
                import("super", &["Config"]),
            ]
        );
    }

    #[test]
    fn glob_and_alias_uses() {
        let code = "use crate::prelude::*;\nuse std::collections::HashMap as Map;\n";
        let imports = extract(code).imports;
        assert_eq!(
            imports,
            vec![
                import("crate::prelude", &[]),
                import("std::collections", &["HashMap"]),
            ]
        );
    }

    #[test]
    fn self_in_list_names_the_module() {
        let imports = extract("use crate::db::{self, Store};").imports;
        assert_eq!(imports, vec![import("crate", &["db"]), import("crate::db", &["Store"])]);
    }

    #[test]
    fn single_segment_use_is_its_own_target() {
        let imports = extract("use serde;").imports;
        assert_eq!(imports, vec![import("serde", &[])]);
    }

    #[test]
    fn extracts_public_items_only() {
        let code = r"
/// Opens a store.
#[must_use]
pub fn open(path: &Path) -> Store { todo!() }

fn private() {}

pub(crate) fn internal() {}

/// A key-value store.
pub struct Store<T> { inner: T }

pub trait Backend {}

pub const MAX: usize = 4;
";
        let interfaces = extract(code).interfaces;
        let names: Vec<_> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["open", "Store", "Backend", "MAX"]);

        assert_eq!(interfaces[0].signature, "pub fn open(path: &Path) -> Store");
        assert_eq!(interfaces[0].doc_excerpt, "Opens a store.");
        assert_eq!(interfaces[1].signature, "pub struct Store<T>");
        assert_eq!(interfaces[1].doc_excerpt, "A key-value store.");
        assert_eq!(interfaces[2].kind, InterfaceKind::Class);
        assert_eq!(interfaces[3].kind, InterfaceKind::Const);
        assert_eq!(interfaces[3].signature, "pub const MAX: usize");
    }

    #[test]
    fn records_calls_constructors_and_trait_impls() {
        let code = r"
use crate::db::Store;
use std::fmt::Display;

struct Wrapper;

impl Display for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { Ok(()) }
}

fn run() {
    let store = Store::open();
    helper();
    let c = Config { debug: true };
}
";
        let uses = extract(code).symbol_uses;
        let has = |name: &str, kind: UseKind| uses.iter().any(|u| u.name == name && u.kind == kind);

        assert!(has("Store", UseKind::Call));
        assert!(has("helper", UseKind::Call));
        assert!(has("Config", UseKind::Call));
        assert!(has("Display", UseKind::Inherit));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let result = RustLanguage.extract("fn broken( {");
        assert!(matches!(result, Err(ExtractError::Syntax(_))));
    }
}
