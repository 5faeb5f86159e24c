//! Python language support.
//!
//! Grammar-backed extraction using tree-sitter-python. Only statements at
//! module level are considered for imports and interfaces: an import nested
//! in an `if`, `try` or function body is conditional and is not recorded.

use super::common::{ExtractError, Extraction, first_line, squash_whitespace};
use super::tree_sitter_utils::{field_text, node_text, parse_clean};
use super::LanguageSupport;
use crate::types::{Import, Interface, InterfaceKind, Language, SymbolUse, UseKind};

/// Tree-sitter node kind constants for the Python grammar.
mod node_kinds {
    pub const EXPRESSION_STATEMENT: &str = "expression_statement";
    pub const STRING: &str = "string";
    pub const COMMENT: &str = "comment";
    pub const IMPORT_STATEMENT: &str = "import_statement";
    pub const IMPORT_FROM_STATEMENT: &str = "import_from_statement";
    pub const FUNCTION_DEFINITION: &str = "function_definition";
    pub const CLASS_DEFINITION: &str = "class_definition";
    pub const DECORATED_DEFINITION: &str = "decorated_definition";
    pub const ASSIGNMENT: &str = "assignment";
    pub const DOTTED_NAME: &str = "dotted_name";
    pub const ALIASED_IMPORT: &str = "aliased_import";
    pub const RELATIVE_IMPORT: &str = "relative_import";
    pub const IMPORT_PREFIX: &str = "import_prefix";
    pub const IDENTIFIER: &str = "identifier";
    pub const ATTRIBUTE: &str = "attribute";
    pub const CALL: &str = "call";
    pub const KEYWORD_ARGUMENT: &str = "keyword_argument";
}

/// Python language support implementation.
pub struct PythonLanguage;

impl LanguageSupport for PythonLanguage {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, source: &str) -> Result<Extraction, ExtractError> {
        let tree = parse_clean(&tree_sitter_python::LANGUAGE.into(), source)?;
        let content = source.as_bytes();
        let root = tree.root_node();

        let mut extraction = Extraction {
            summary: block_docstring(&root, content).unwrap_or_default(),
            ..Extraction::default()
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                node_kinds::IMPORT_STATEMENT => {
                    extraction.imports.extend(parse_import(&child, content));
                }
                node_kinds::IMPORT_FROM_STATEMENT => {
                    extraction.imports.extend(parse_import_from(&child, content));
                }
                node_kinds::EXPRESSION_STATEMENT => {
                    if let Some(interface) = extract_constant(&child, content) {
                        extraction.interfaces.push(interface);
                    }
                }
                _ => {
                    if let Some(interface) = extract_definition(&child, content) {
                        extraction.interfaces.push(interface);
                    }
                }
            }
        }

        collect_symbol_uses(&root, content, &mut extraction.symbol_uses);
        Ok(extraction)
    }
}

/// `import a.b, c as d`
fn parse_import(node: &tree_sitter::Node, content: &[u8]) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        let target = match name.kind() {
            node_kinds::ALIASED_IMPORT => field_text(&name, "name", content),
            _ => node_text(&name, content),
        };
        if let Some(target) = target {
            imports.push(Import::new(target, Vec::new()));
        }
    }
    imports
}

/// `from .pkg import a, b as c` / `from x import *`
fn parse_import_from(node: &tree_sitter::Node, content: &[u8]) -> Option<Import> {
    let module = node.child_by_field_name("module_name")?;
    let target = match module.kind() {
        node_kinds::RELATIVE_IMPORT => relative_target(&module, content),
        _ => node_text(&module, content)?,
    };

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        let imported = match name.kind() {
            node_kinds::ALIASED_IMPORT => field_text(&name, "name", content),
            _ => node_text(&name, content),
        };
        names.extend(imported);
    }

    Some(Import::new(target, names))
}

/// Render a `relative_import` node as dots followed by the dotted name.
fn relative_target(node: &tree_sitter::Node, content: &[u8]) -> String {
    let mut target = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            node_kinds::IMPORT_PREFIX => {
                if let Some(dots) = node_text(&child, content) {
                    target.push_str(dots.trim());
                }
            }
            node_kinds::DOTTED_NAME => {
                if let Some(name) = node_text(&child, content) {
                    target.push_str(&name);
                }
            }
            _ => {}
        }
    }
    target
}

/// A public `def` or `class` at module level, possibly decorated.
fn extract_definition(node: &tree_sitter::Node, content: &[u8]) -> Option<Interface> {
    let definition = if node.kind() == node_kinds::DECORATED_DEFINITION {
        node.child_by_field_name("definition")?
    } else {
        *node
    };

    let name = field_text(&definition, "name", content)?;
    if name.starts_with('_') {
        return None;
    }

    let (kind, signature) = match definition.kind() {
        node_kinds::FUNCTION_DEFINITION => {
            (InterfaceKind::Function, function_signature(&definition, &name, content))
        }
        node_kinds::CLASS_DEFINITION => {
            let signature = match field_text(&definition, "superclasses", content) {
                Some(bases) => format!("class {name}{}", squash_whitespace(&bases)),
                None => format!("class {name}"),
            };
            (InterfaceKind::Class, signature)
        }
        _ => return None,
    };

    let doc_excerpt = definition
        .child_by_field_name("body")
        .and_then(|body| block_docstring(&body, content))
        .unwrap_or_default();

    Some(Interface {
        name,
        kind,
        signature,
        doc_excerpt,
    })
}

fn function_signature(node: &tree_sitter::Node, name: &str, content: &[u8]) -> String {
    let params = field_text(node, "parameters", content).unwrap_or_else(|| "()".to_string());
    let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
    let prefix = if is_async { "async def" } else { "def" };

    let signature = match field_text(node, "return_type", content) {
        Some(ret) => format!("{prefix} {name}{params} -> {ret}"),
        None => format!("{prefix} {name}{params}"),
    };
    squash_whitespace(&signature)
}

/// `UPPER_CASE = value` at module level.
fn extract_constant(node: &tree_sitter::Node, content: &[u8]) -> Option<Interface> {
    let assignment = node.named_child(0)?;
    if assignment.kind() != node_kinds::ASSIGNMENT {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != node_kinds::IDENTIFIER {
        return None;
    }
    let name = node_text(&left, content)?;
    if !is_constant_name(&name) {
        return None;
    }

    let text = node_text(&assignment, content)?;
    Some(Interface {
        name,
        kind: InterfaceKind::Const,
        signature: squash_whitespace(text.lines().next().unwrap_or_default()),
        doc_excerpt: String::new(),
    })
}

fn is_constant_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// First line of the docstring opening a module or block, if any.
fn block_docstring(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != node_kinds::COMMENT)?;
    if first.kind() != node_kinds::EXPRESSION_STATEMENT {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != node_kinds::STRING {
        return None;
    }
    let raw = node_text(&string, content)?;
    Some(first_line(strip_string_quotes(&raw)))
}

/// Remove prefix letters and surrounding quotes from a string literal.
fn strip_string_quotes(raw: &str) -> &str {
    let body = raw.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    body
}

/// Record called names and base classes anywhere in the file.
///
/// Walks with an explicit stack; generated code can nest far deeper than
/// the thread stack allows.
fn collect_symbol_uses(root: &tree_sitter::Node, content: &[u8], uses: &mut Vec<SymbolUse>) {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        record_symbol_use(&node, content, uses);

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}

fn record_symbol_use(node: &tree_sitter::Node, content: &[u8], uses: &mut Vec<SymbolUse>) {
    match node.kind() {
        node_kinds::CALL => {
            if let Some(name) = node
                .child_by_field_name("function")
                .and_then(|f| leading_identifier(&f, content))
            {
                uses.push(SymbolUse {
                    name,
                    kind: UseKind::Call,
                });
            }
        }
        node_kinds::CLASS_DEFINITION => {
            if let Some(bases) = node.child_by_field_name("superclasses") {
                let mut cursor = bases.walk();
                for base in bases.named_children(&mut cursor) {
                    if base.kind() == node_kinds::KEYWORD_ARGUMENT {
                        continue;
                    }
                    if let Some(name) = leading_identifier(&base, content) {
                        uses.push(SymbolUse {
                            name,
                            kind: UseKind::Inherit,
                        });
                    }
                }
            }
        }
        _ => {}
    }
}

/// `foo` for `foo`, `foo.bar.baz`; `None` for anything else.
fn leading_identifier(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    let mut current = *node;
    loop {
        match current.kind() {
            node_kinds::IDENTIFIER => return node_text(&current, content),
            node_kinds::ATTRIBUTE => current = current.child_by_field_name("object")?,
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str) -> Extraction {
        PythonLanguage
            .extract(code)
            .expect("test source should parse")
    }

    #[test]
    fn summary_is_first_docstring_line() {
        let code = "\"\"\"Gradient checkpointing helpers.\n\nLonger text.\n\"\"\"\nimport os\n";
        assert_eq!(extract(code).summary, "Gradient checkpointing helpers.");
    }

    #[test]
    fn missing_docstring_gives_empty_summary() {
        assert_eq!(extract("import os\n").summary, "");
    }

    #[test]
    fn extracts_plain_and_from_imports() {
        let code = "import os.path\nimport numpy as np\nfrom pkg.util import load, save as store\n";
        let imports = extract(code).imports;

        assert_eq!(
            imports,
            vec![
                Import::new("os.path", vec![]),
                Import::new("numpy", vec![]),
                Import::new("pkg.util", vec!["load".into(), "save".into()]),
            ]
        );
    }

    #[test]
    fn extracts_relative_imports() {
        let code = "from . import util\nfrom ..core.db import Session\n";
        let imports = extract(code).imports;

        assert_eq!(imports[0], Import::new(".", vec!["util".into()]));
        assert_eq!(imports[1], Import::new("..core.db", vec!["Session".into()]));
    }

    #[test]
    fn conditional_imports_are_not_recorded() {
        let code = "try:\n    import ujson as json\nexcept ImportError:\n    import json\n\nif True:\n    import fast\n\ndef f():\n    import lazy\n";
        assert!(extract(code).imports.is_empty());
    }

    #[test]
    fn extracts_public_functions_and_classes() {
        let code = r#"
def load(path: str) -> dict:
    """Load a config file."""
    return {}

async def fetch(url):
    pass

def _private():
    pass

@dataclass
class Config(Base):
    """Runtime configuration."""
    pass
"#;
        let interfaces = extract(code).interfaces;
        let names: Vec<_> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["load", "fetch", "Config"]);

        assert_eq!(interfaces[0].kind, InterfaceKind::Function);
        assert_eq!(interfaces[0].signature, "def load(path: str) -> dict");
        assert_eq!(interfaces[0].doc_excerpt, "Load a config file.");
        assert_eq!(interfaces[1].signature, "async def fetch(url)");
        assert_eq!(interfaces[2].kind, InterfaceKind::Class);
        assert_eq!(interfaces[2].signature, "class Config(Base)");
        assert_eq!(interfaces[2].doc_excerpt, "Runtime configuration.");
    }

    #[test]
    fn upper_case_assignments_are_constants() {
        let code = "MAX_RETRIES = 3\nlower = 4\n_HIDDEN = 5\n";
        let interfaces = extract(code).interfaces;

        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].name, "MAX_RETRIES");
        assert_eq!(interfaces[0].kind, InterfaceKind::Const);
        assert_eq!(interfaces[0].signature, "MAX_RETRIES = 3");
    }

    #[test]
    fn records_calls_and_base_classes() {
        let code = "from db import Model, connect\n\nclass User(Model, metaclass=Meta):\n    pass\n\ndef run():\n    connect()\n    db.session.close()\n";
        let uses = extract(code).symbol_uses;

        assert!(uses.contains(&SymbolUse {
            name: "Model".into(),
            kind: UseKind::Inherit
        }));
        assert!(uses.contains(&SymbolUse {
            name: "connect".into(),
            kind: UseKind::Call
        }));
        assert!(uses.contains(&SymbolUse {
            name: "db".into(),
            kind: UseKind::Call
        }));
        assert!(!uses.iter().any(|u| u.name == "Meta"));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let result = PythonLanguage.extract("def broken(:\n    pass\n");
        assert!(matches!(result, Err(ExtractError::Syntax(_))));
    }

    #[test]
    fn strips_all_quote_styles() {
        assert_eq!(strip_string_quotes("\"\"\"doc\"\"\""), "doc");
        assert_eq!(strip_string_quotes("r'''raw'''"), "raw");
        assert_eq!(strip_string_quotes("'x'"), "x");
    }
}
