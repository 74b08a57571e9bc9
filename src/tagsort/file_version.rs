//! Dotted version numbers carried by schema and group files.

use crate::error::{Result, TagsortError};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted numeric version such as `1.1` or `3.1.4`.
///
/// Missing trailing components compare as zero, so `1` equals `1.0`.
#[derive(Debug, Clone)]
pub struct FileVersion(Vec<u64>);

impl FromStr for FileVersion {
    type Err = TagsortError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .trim()
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| TagsortError::Schema(format!("Unreadable version number: \"{}\"", s)))?;
        Ok(Self(parts))
    }
}

impl FileVersion {
    fn component(&self, index: usize) -> u64 {
        self.0.get(index).copied().unwrap_or(0)
    }
}

impl Ord for FileVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for FileVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FileVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FileVersion {}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Renders a version field that may be written as a JSON string or number.
pub fn version_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fails unless `found` lies within `minimum..=supported`.
pub fn check_supported(
    kind: &'static str,
    found: &Value,
    minimum: &str,
    supported: &str,
) -> Result<()> {
    let text = version_text(found);
    let mismatch = || TagsortError::SchemaVersionMismatch {
        kind,
        found: text.clone(),
        supported: format!("{} to {}", minimum, supported),
    };
    let version: FileVersion = text.parse().map_err(|_| mismatch())?;
    let low: FileVersion = minimum.parse()?;
    let high: FileVersion = supported.parse()?;
    if version < low || version > high {
        return Err(mismatch());
    }
    Ok(())
}
