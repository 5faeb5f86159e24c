//! JavaScript and TypeScript support.
//!
//! Pattern-based extraction: no grammar is loaded, so results are marked
//! heuristic. Only static import forms with literal specifiers are seen;
//! `import(expr)` and computed `require` calls are invisible.

use std::sync::LazyLock;

use regex::Regex;

use super::common::{ExtractError, Extraction, first_line, squash_whitespace};
use super::LanguageSupport;
use crate::types::{Import, Interface, InterfaceKind, Language, SymbolUse, UseKind};

/// JavaScript language support implementation.
pub struct JavaScriptLanguage;

/// TypeScript language support implementation.
pub struct TypeScriptLanguage;

impl LanguageSupport for JavaScriptLanguage {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&self, source: &str) -> Result<Extraction, ExtractError> {
        Ok(extract_script(source))
    }
}

impl LanguageSupport for TypeScriptLanguage {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extract(&self, source: &str) -> Result<Extraction, ExtractError> {
        Ok(extract_script(source))
    }
}

static IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:type\s+)?([\w$\s,{}*]*?)\s*from\s*['"]([^'"]+)['"]"#)
        .expect("import pattern is valid")
});

static IMPORT_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#).expect("bare import pattern is valid")
});

static EXPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*export\s+(?:type\s+)?(\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"]+)['"]"#,
    )
    .expect("re-export pattern is valid")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).expect("require pattern is valid")
});

static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*export\s+(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(function\*?|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("export pattern is valid")
});

static EXTENDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bclass\s+[A-Za-z_$][\w$]*(?:<[^>]*>)?\s+extends\s+([A-Za-z_$][\w$]*)")
        .expect("extends pattern is valid")
});

static CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_$][\w$]*)\s*\(").expect("call pattern is valid"));

fn extract_script(source: &str) -> Extraction {
    let mut imports: Vec<Import> = Vec::new();
    let mut push_import = |target: &str, names: Vec<String>| {
        match imports.iter_mut().find(|i| i.target == target) {
            Some(existing) => {
                for name in names {
                    if !existing.names.contains(&name) {
                        existing.names.push(name);
                    }
                }
            }
            None => imports.push(Import::new(target, names)),
        }
    };

    for caps in IMPORT_FROM.captures_iter(source) {
        push_import(&caps[2], clause_names(&caps[1]));
    }
    for caps in IMPORT_BARE.captures_iter(source) {
        push_import(&caps[1], Vec::new());
    }
    for caps in EXPORT_FROM.captures_iter(source) {
        push_import(&caps[2], clause_names(&caps[1]));
    }
    for caps in REQUIRE.captures_iter(source) {
        push_import(&caps[1], Vec::new());
    }

    let interfaces = EXPORT_DECL
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = match &caps[1] {
                "const" | "let" | "var" => InterfaceKind::Const,
                "class" | "interface" | "type" | "enum" => InterfaceKind::Class,
                _ => InterfaceKind::Function,
            };
            Some(Interface {
                name: caps[2].to_string(),
                kind,
                signature: declaration_line(&source[whole.start()..]),
                doc_excerpt: preceding_jsdoc(&source[..whole.start()]),
            })
        })
        .collect();

    let mut symbol_uses: Vec<SymbolUse> = EXTENDS
        .captures_iter(source)
        .map(|caps| SymbolUse {
            name: caps[1].to_string(),
            kind: UseKind::Inherit,
        })
        .collect();
    symbol_uses.extend(CALL.captures_iter(source).map(|caps| SymbolUse {
        name: caps[1].to_string(),
        kind: UseKind::Call,
    }));

    Extraction {
        summary: leading_comment(source),
        interfaces,
        imports,
        symbol_uses,
    }
}

/// Names bound by an import or re-export clause.
///
/// `x, { a, b as c }` gives `default, a, b`; a namespace import gives none.
fn clause_names(clause: &str) -> Vec<String> {
    let clause = clause.trim();
    let mut names = Vec::new();

    let (head, braces) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            (&clause[..open], Some(&clause[open + 1..close]))
        }
        _ => (clause, None),
    };

    let default = head.trim().trim_end_matches(',').trim();
    if !default.is_empty() && !default.starts_with('*') {
        names.push("default".to_string());
    }

    if let Some(inner) = braces {
        for item in inner.split(',') {
            let item = item.trim();
            let item = item.strip_prefix("type ").unwrap_or(item).trim();
            let original = item.split(" as ").next().unwrap_or_default().trim();
            if !original.is_empty() {
                names.push(original.to_string());
            }
        }
    }

    names
}

/// The declaration text up to its body or initializer.
fn declaration_line(text: &str) -> String {
    let end = text
        .find(['{', '=', ';', '\n'])
        .unwrap_or(text.len());
    squash_whitespace(text[..end].trim())
}

/// First line of a `/** */` block ending right before a declaration.
fn preceding_jsdoc(before: &str) -> String {
    let trimmed = before.trim_end();
    if !trimmed.ends_with("*/") {
        return String::new();
    }
    let Some(start) = trimmed.rfind("/**") else {
        return String::new();
    };
    comment_body(&trimmed[start..])
}

/// Summary from a leading `/** */` block or `//` comment run.
fn leading_comment(source: &str) -> String {
    let mut text = source.trim_start();
    if text.starts_with("#!") {
        text = text.split_once('\n').map_or("", |(_, rest)| rest).trim_start();
    }

    if text.starts_with("/*") {
        let end = text.find("*/").map_or(text.len(), |i| i + 2);
        return comment_body(&text[..end]);
    }

    let run: Vec<&str> = text
        .lines()
        .map(str::trim)
        .take_while(|line| line.starts_with("//"))
        .map(|line| line.trim_start_matches('/').trim())
        .collect();
    first_line(&run.join("\n"))
}

/// Strip block comment markers and return the first meaningful line.
fn comment_body(block: &str) -> String {
    let inner = block
        .trim_start_matches('/')
        .trim_start_matches('*')
        .trim_end_matches('/')
        .trim_end_matches('*');
    let lines: Vec<&str> = inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.starts_with('@'))
        .collect();
    first_line(&lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn extracts_static_imports() {
        let code = r#"
import React, { useState, useEffect as effect } from 'react';
import * as path from "node:path";
import './styles.css';
import type { Config } from './config';
const fs = require('fs');
export { helper } from './helpers';
"#;
        let imports = extract_script(code).imports;

        assert_eq!(
            imports,
            vec![
                Import::new("react", names(&["default", "useState", "useEffect"])),
                Import::new("node:path", vec![]),
                Import::new("./config", names(&["Config"])),
                Import::new("./styles.css", vec![]),
                Import::new("./helpers", names(&["helper"])),
                Import::new("fs", vec![]),
            ]
        );
    }

    #[test]
    fn multi_line_import_clause() {
        let code = "import {\n  alpha,\n  beta,\n} from './greek';\n";
        let imports = extract_script(code).imports;
        assert_eq!(imports, vec![Import::new("./greek", names(&["alpha", "beta"]))]);
    }

    #[test]
    fn dynamic_imports_are_ignored() {
        let code = "const mod = await import(name);\nconst other = require(path);\n";
        assert!(extract_script(code).imports.is_empty());
    }

    #[test]
    fn extracts_exported_declarations() {
        let code = r"
/**
 * Creates a session.
 * @param user the user
 */
export async function createSession(user: User): Promise<Session> {
  return new Session(user);
}

export class SessionStore extends BaseStore {}
export const MAX_SESSIONS = 10;
export interface Session { id: string }
function internal() {}
";
        let interfaces = extract_script(code).interfaces;
        let found: Vec<_> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            found,
            vec!["createSession", "SessionStore", "MAX_SESSIONS", "Session"]
        );

        assert_eq!(interfaces[0].kind, InterfaceKind::Function);
        assert_eq!(interfaces[0].doc_excerpt, "Creates a session.");
        assert_eq!(
            interfaces[0].signature,
            "export async function createSession(user: User): Promise<Session>"
        );
        assert_eq!(interfaces[1].kind, InterfaceKind::Class);
        assert_eq!(interfaces[2].kind, InterfaceKind::Const);
        assert_eq!(interfaces[2].signature, "export const MAX_SESSIONS");
    }

    #[test]
    fn summary_from_leading_block_comment() {
        let code = "/**\n * Session management.\n */\nexport const x = 1;\n";
        assert_eq!(extract_script(code).summary, "Session management.");
    }

    #[test]
    fn summary_from_line_comments_after_shebang() {
        let code = "#!/usr/bin/env node\n// CLI entry point.\n// More.\nmain();\n";
        assert_eq!(extract_script(code).summary, "CLI entry point.");
    }

    #[test]
    fn records_extends_and_calls() {
        let code = "class Admin extends User {}\nvalidate(input);\n";
        let uses = extract_script(code).symbol_uses;
        assert!(uses.contains(&SymbolUse {
            name: "User".into(),
            kind: UseKind::Inherit
        }));
        assert!(uses.contains(&SymbolUse {
            name: "validate".into(),
            kind: UseKind::Call
        }));
    }
}
