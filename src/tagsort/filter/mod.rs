//! # Filters
//!
//! The boolean language used to select files by their tags.
//!
//! ```text
//! filter        = [ condition_set, ... ]          OR across the list
//! condition_set = condition "/&|" condition ...   AND across the chain
//! condition     = ["/!|"] ( "/*|" | "/G|" name | "/C|" name | tag )
//! ```
//!
//! Filters come from JSON schema files and are parsed once into [`Filter`]
//! values at load time, so a malformed condition is reported before any file
//! is touched. The string-level functions ([`check_condition`],
//! [`check_condition_set`], [`check_against_filter`]) parse and evaluate in
//! one step; the format-string engine uses them for its conditional operator.

pub mod condition;

pub use condition::Condition;

use crate::error::{Result, TagsortError};
use crate::groups::GroupResolver;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const AND: &str = "/&|";

/// Conditions joined with `/&|`; true when every condition is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    pub fn parse(text: &str) -> Result<Self> {
        let parts = split_condition_set(text);
        if parts.is_empty() {
            return Err(TagsortError::MalformedConditionSet(format!(
                "completely empty (\"{}\")",
                text
            )));
        }
        let conditions = parts
            .into_iter()
            .map(Condition::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, tags: &[String], resolver: &dyn GroupResolver) -> bool {
        self.conditions.iter().all(|c| c.matches(tags, resolver))
    }
}

impl FromStr for ConditionSet {
    type Err = TagsortError;

    fn from_str(s: &str) -> Result<Self> {
        ConditionSet::parse(s)
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.conditions.iter().map(Condition::to_string).collect();
        write!(f, "{}", parts.join(AND))
    }
}

/// Condition sets in priority order; true when any set is.
///
/// An empty filter can be built, but evaluating it is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    sets: Vec<ConditionSet>,
}

impl Filter {
    pub fn parse<S: AsRef<str>>(sets: &[S]) -> Result<Self> {
        let sets = sets
            .iter()
            .map(|s| ConditionSet::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sets })
    }

    /// Builds a filter from its JSON form, which must be an array of strings.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(TagsortError::MalformedFilter(format!(
                "expected an array of condition sets, found {} ({})",
                json_type(value),
                value
            )));
        };
        let mut texts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => texts.push(s.as_str()),
                other => {
                    return Err(TagsortError::WrongTypeInFilter {
                        value: other.to_string(),
                        found: json_type(other),
                    })
                }
            }
        }
        Filter::parse(&texts)
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn condition_sets(&self) -> &[ConditionSet] {
        &self.sets
    }

    pub fn matches(&self, tags: &[String], resolver: &dyn GroupResolver) -> Result<bool> {
        if self.sets.is_empty() {
            tracing::error!("A filter was completely empty");
            return Err(TagsortError::MalformedFilter(
                "completely empty".to_string(),
            ));
        }
        match self.sets.iter().find(|set| set.matches(tags, resolver)) {
            Some(set) => {
                tracing::debug!("Tags {:?} matched condition set {}", tags, set);
                Ok(true)
            }
            None => {
                tracing::debug!("Tags {:?} did not match any condition set in {}", tags, self);
                Ok(false)
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .sets
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Splits a condition set at `/&|`, dropping (and warning about) the empty
/// fragments left by leading, trailing or doubled delimiters.
pub fn split_condition_set(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let parts: Vec<&str> = text.split(AND).collect();
    if parts.iter().any(|p| p.is_empty()) {
        tracing::warn!("A malformed condition set was encountered: \"{}\"", text);
        return parts.into_iter().filter(|p| !p.is_empty()).collect();
    }
    parts
}

pub fn check_condition(tags: &[String], condition: &str, resolver: &dyn GroupResolver) -> Result<bool> {
    Ok(Condition::parse(condition)?.matches(tags, resolver))
}

/// Evaluates a condition set straight from text. Conditions are parsed as
/// they are reached, so evaluation stops at the first false one.
pub fn check_condition_set(tags: &[String], set: &str, resolver: &dyn GroupResolver) -> Result<bool> {
    let parts = split_condition_set(set);
    if parts.is_empty() {
        return Err(TagsortError::MalformedConditionSet(format!(
            "completely empty (\"{}\")",
            set
        )));
    }
    for part in parts {
        if !check_condition(tags, part, resolver)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluates a filter straight from text, stopping at the first condition set
/// that holds. [`Filter::parse`] validates every set up front instead.
pub fn check_against_filter<S: AsRef<str>>(
    tags: &[String],
    filter: &[S],
    resolver: &dyn GroupResolver,
) -> Result<bool> {
    if filter.is_empty() {
        tracing::error!("A filter was completely empty");
        return Err(TagsortError::MalformedFilter(
            "completely empty".to_string(),
        ));
    }
    for set in filter {
        if check_condition_set(tags, set.as_ref(), resolver)? {
            return Ok(true);
        }
    }
    Ok(false)
}
