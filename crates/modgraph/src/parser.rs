//! Per-file parsing into [`Module`] records.
//!
//! Parsing never fails as a whole: a file that cannot be read, decoded or
//! parsed becomes a degraded record (`parse_error` set, no interfaces or
//! imports) and the reason is returned next to it as a [`ParseFailure`].
//! Keeping the record means edges pointing at the file stay valid.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ParseFailure, ParseFailureKind};
use crate::languages::{ExtractError, Extraction, get_language_support};
use crate::resolver::{self, ImportContext};
use crate::staleness::content_hash;
use crate::types::{Language, Module};

/// Output of parsing one file.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    /// The record, degraded if `failure` is set
    pub module: Module,
    /// Why the record is degraded
    pub failure: Option<ParseFailure>,
}

impl ParsedModule {
    fn ok(module: Module) -> Self {
        Self {
            module,
            failure: None,
        }
    }

    fn degraded(module: Module, failure: ParseFailure) -> Self {
        Self {
            module,
            failure: Some(failure),
        }
    }
}

/// Read and parse the file at `root/key`.
///
/// `key` is the root-relative path with `/` separators.
#[must_use]
pub fn parse_file(
    root: &Path,
    key: &str,
    language: Language,
    ctx: &ImportContext<'_>,
) -> ParsedModule {
    match std::fs::read(root.join(key)) {
        Ok(bytes) => parse_source(key, language, &bytes, ctx),
        Err(e) => {
            warn!(file = %key, error = %e, "Cannot read file, keeping degraded record");
            let module = Module::degraded(key, language, String::new(), 0, e.to_string());
            ParsedModule::degraded(module, ParseFailure::unreadable(PathBuf::from(key), &e))
        }
    }
}

/// Parse file contents already in memory.
#[must_use]
pub fn parse_source(
    key: &str,
    language: Language,
    bytes: &[u8],
    ctx: &ImportContext<'_>,
) -> ParsedModule {
    let hash = content_hash(bytes);
    let lines = count_lines(bytes);

    let Ok(source) = std::str::from_utf8(bytes) else {
        warn!(file = %key, "File is not valid UTF-8, keeping degraded record");
        let failure = ParseFailure::encoding(PathBuf::from(key));
        let module = Module::degraded(key, language, hash, lines, failure.message.clone());
        return ParsedModule::degraded(module, failure);
    };

    match get_language_support(language).extract(source) {
        Ok(extraction) => {
            let module = assemble(key, language, extraction, hash, lines, ctx);
            debug!(
                file = %key,
                interfaces = module.interfaces.len(),
                internal = module.imports_internal.len(),
                external = module.imports_external.len(),
                "Parsed module"
            );
            ParsedModule::ok(module)
        }
        Err(e) => {
            warn!(file = %key, error = %e, "Parse failed, keeping degraded record");
            let kind = match e {
                ExtractError::Syntax(_) => ParseFailureKind::Syntax,
                ExtractError::Grammar(_) => ParseFailureKind::Grammar,
            };
            let failure = ParseFailure::new(PathBuf::from(key), kind, e.to_string());
            let module = Module::degraded(key, language, hash, lines, e.to_string());
            ParsedModule::degraded(module, failure)
        }
    }
}

/// Classify imports and fold an extraction into a module record.
fn assemble(
    key: &str,
    language: Language,
    extraction: Extraction,
    content_hash: String,
    line_count: usize,
    ctx: &ImportContext<'_>,
) -> Module {
    let mut module = Module::new(key, language);
    module.content_hash = content_hash;
    module.line_count = line_count;
    module.summary = extraction.summary;
    module.interfaces = extraction.interfaces;

    let imported_names: BTreeSet<&str> = extraction
        .imports
        .iter()
        .flat_map(|import| import.names.iter().map(String::as_str))
        .collect();
    let mut symbol_uses: Vec<_> = extraction
        .symbol_uses
        .iter()
        .filter(|u| imported_names.contains(u.name.as_str()))
        .cloned()
        .collect();
    symbol_uses.sort();
    symbol_uses.dedup();
    module.symbol_uses = symbol_uses;

    for import in extraction.imports {
        let internal = resolver::is_relative(language, &import.target)
            || !resolver::resolve_import(language, key, &import, ctx).is_empty();
        if internal {
            module.imports_internal.push(import);
        } else {
            module.imports_external.push(import);
        }
    }

    module
}

/// Line count with the same convention as [`str::lines`].
fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|b| **b == b'\n').count();
    match bytes.last() {
        None | Some(b'\n') => newlines,
        Some(_) => newlines + 1,
    }
}
