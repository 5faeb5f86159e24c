//! Common extraction types shared across language implementations.
//!
//! These types are the intermediate output of a language extractor, before
//! imports are classified and the result is folded into a [`crate::Module`].

use crate::types::{Import, Interface, SymbolUse};

/// Everything a language extractor pulls out of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// First line of the module-level documentation
    pub summary: String,
    /// Public interfaces in source order
    pub interfaces: Vec<Interface>,
    /// Import statements, not yet classified internal or external
    pub imports: Vec<Import>,
    /// Called or inherited names, unfiltered
    pub symbol_uses: Vec<SymbolUse>,
}

/// Why an extractor could not produce an [`Extraction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The grammar could not be loaded or returned no tree
    Grammar(String),
    /// The source does not parse cleanly
    Syntax(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grammar(msg) | Self::Syntax(msg) => f.write_str(msg),
        }
    }
}

/// First non-empty line of a block of documentation text.
#[must_use]
pub fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Collapse internal whitespace runs to single spaces.
///
/// Signatures spanning several lines become one line.
#[must_use]
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
