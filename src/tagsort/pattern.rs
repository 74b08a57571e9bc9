//! Regex helpers shared by group, schema and scanner code.
//!
//! User-authored patterns follow whole-string semantics: a pattern either
//! matches an entire tag or file name, or only its beginning. `Regex` itself
//! searches anywhere, so both flavours are compiled with explicit anchors.

use crate::error::{Result, TagsortError};
use regex::Regex;

/// Compiles `pattern` so that it only matches a complete string.
pub fn compile_full(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| TagsortError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compiles `pattern` so that it must match at the start of a string.
pub fn compile_prefix(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|source| TagsortError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
