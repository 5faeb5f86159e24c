//! Language-specific extraction.
//!
//! Each supported language implements the `LanguageSupport` trait, which
//! defines how to pull a summary, public interfaces, imports and symbol uses
//! out of one source file.
//!
//! ## Adding a New Language
//!
//! 1. Add the variant to `Language` enum in `types.rs`
//! 2. Create a new module (e.g., `go.rs`)
//! 3. Implement `LanguageSupport` trait
//! 4. Register in `get_language_support()`
//! 5. Teach `resolver.rs` how its import specifiers map to module keys
//!
//! ## Design
//!
//! The set of languages is closed, so dispatch is a `match` on the tag and
//! every implementation emits the same [`Extraction`] shape.

pub mod common;
pub mod javascript;
pub mod python;
pub mod rust;
pub mod tree_sitter_utils;

pub use common::{ExtractError, Extraction};

use crate::types::{Language, ParseConfidence};

/// Get the language support implementation for a language.
#[must_use]
pub fn get_language_support(lang: Language) -> &'static dyn LanguageSupport {
    match lang {
        Language::Python => &python::PythonLanguage,
        Language::Rust => &rust::RustLanguage,
        Language::JavaScript => &javascript::JavaScriptLanguage,
        Language::TypeScript => &javascript::TypeScriptLanguage,
    }
}

/// Trait for language-specific extraction.
pub trait LanguageSupport: Send + Sync {
    /// The language this implementation handles.
    fn language(&self) -> Language;

    /// File extensions this language handles.
    fn extensions(&self) -> &'static [&'static str] {
        self.language().extensions()
    }

    /// Whether extraction is grammar-backed or pattern-based.
    fn confidence(&self) -> ParseConfidence {
        self.language().confidence()
    }

    /// Extract summary, interfaces, imports and symbol uses from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Syntax`] if the source is malformed, or
    /// [`ExtractError::Grammar`] if the grammar cannot be loaded.
    fn extract(&self, source: &str) -> Result<Extraction, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_support() {
        for lang in Language::ALL {
            let support = get_language_support(lang);
            assert_eq!(support.language(), lang);
            assert_eq!(support.extensions(), lang.extensions());
        }
    }

    #[test]
    fn only_script_languages_are_heuristic() {
        assert_eq!(
            get_language_support(Language::JavaScript).confidence(),
            ParseConfidence::Heuristic
        );
        assert_eq!(
            get_language_support(Language::Python).confidence(),
            ParseConfidence::Exact
        );
    }
}
