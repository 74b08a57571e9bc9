use crate::error::{Result, TagsortError};
use crate::groups::GroupResolver;
use std::fmt;
use std::str::FromStr;

pub const NOT: &str = "/!|";
pub const ALL: &str = "/*|";
pub const GROUP: &str = "/G|";
pub const CATEGORY: &str = "/C|";

/// A single predicate over a tag set.
///
/// Grammar: an optional leading `/!|`, then exactly one of `/*|`,
/// `/G|name`, `/C|name` or a bare tag. Names and tags may not contain `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Tag(String),
    Group(String),
    Category(String),
    All,
    Not(Box<Condition>),
}

impl Condition {
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = || TagsortError::MalformedCondition(text.to_string());
        let (negated, body) = match text.strip_prefix(NOT) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let inner = if body == ALL {
            Condition::All
        } else if let Some(name) = body.strip_prefix(GROUP) {
            Condition::Group(valid_name(name).ok_or_else(malformed)?)
        } else if let Some(name) = body.strip_prefix(CATEGORY) {
            Condition::Category(valid_name(name).ok_or_else(malformed)?)
        } else {
            Condition::Tag(valid_name(body).ok_or_else(malformed)?)
        };

        Ok(if negated {
            Condition::Not(Box::new(inner))
        } else {
            inner
        })
    }

    pub fn matches(&self, tags: &[String], resolver: &dyn GroupResolver) -> bool {
        match self {
            Condition::All => true,
            Condition::Tag(tag) => tags.iter().any(|t| t == tag),
            Condition::Group(name) | Condition::Category(name) => {
                resolver.representative_tag(tags, name).is_some()
            }
            Condition::Not(inner) => !inner.matches(tags, resolver),
        }
    }
}

fn valid_name(name: &str) -> Option<String> {
    if name.is_empty() || name.contains('/') {
        None
    } else {
        Some(name.to_string())
    }
}

impl FromStr for Condition {
    type Err = TagsortError;

    fn from_str(s: &str) -> Result<Self> {
        Condition::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Tag(tag) => write!(f, "{}", tag),
            Condition::Group(name) => write!(f, "{}{}", GROUP, name),
            Condition::Category(name) => write!(f, "{}{}", CATEGORY, name),
            Condition::All => write!(f, "{}", ALL),
            Condition::Not(inner) => write!(f, "{}{}", NOT, inner),
        }
    }
}
