//! Name composition and validation shared by the registries.
//!
//! Content symbols are written `[part-part]`, entity categories `{name}`.
//! Symbols the pipeline synthesizes use `<...>`, which no content name can
//! produce, so the two namespaces never collide.

use crate::error::GrammarError;
use regex::Regex;
use std::sync::LazyLock;

static NAME_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s()\[\]<>{},]+$").expect("name part regex"));

/// Validate one name part (a symbol name fragment, semantic or category name).
pub fn validate_part(part: &str) -> Result<(), GrammarError> {
    if NAME_PART.is_match(part) {
        Ok(())
    } else {
        Err(GrammarError::InvalidName {
            name: part.to_string(),
            reason: "must be non-empty and free of whitespace, brackets, parentheses and commas"
                .to_string(),
        })
    }
}

/// Compose a content symbol name: `["user", "plural"]` -> `[user-plural]`.
pub fn symbol_name<S: AsRef<str>>(parts: &[S]) -> Result<String, GrammarError> {
    if parts.is_empty() {
        return Err(GrammarError::InvalidName {
            name: String::new(),
            reason: "a symbol name needs at least one part".to_string(),
        });
    }
    for part in parts {
        validate_part(part.as_ref())?;
    }
    let joined: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
    Ok(format!("[{}]", joined.join("-")))
}

/// Strip the brackets from a symbol name: `[user-plural]` -> `user-plural`.
pub fn stem(name: &str) -> &str {
    name.trim_start_matches(['[', '<', '{'])
        .trim_end_matches([']', '>', '}'])
}

/// Turn free text (e.g. a plural noun with spaces) into a name part.
pub fn slug(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalize a lexical term: lower-case, whitespace collapsed to one space.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`normalize_term`], rejecting tokens that start with `<`. Those are
/// reserved for synthesized symbols such as `<empty>` and `<tok:in>`.
pub fn checked_term(term: &str) -> Result<String, GrammarError> {
    let term = normalize_term(term);
    if let Some(token) = term.split(' ').find(|token| token.starts_with('<')) {
        return Err(GrammarError::InvalidName {
            name: token.to_string(),
            reason: "terms may not start with `<`".to_string(),
        });
    }
    Ok(term)
}

pub fn entity_category_name(name: &str) -> String {
    format!("{{{name}}}")
}
