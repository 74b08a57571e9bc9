//! # Schemas
//!
//! A schema file bundles everything needed to organize files:
//!
//! ```text
//! {
//!   "file_type": "tagsort_schema",
//!   "schema_file_version": "1.1",
//!   "tag_formats": [ { "tag_pattern": "...", "tag_split_pattern": "..." } ],
//!   "unnamed_patterns": [ "IMG_\\d+" ],
//!   "renaming_schemas": [ { "filter": ["/G|Beer"], "format_string": "/?TIG|Beer/|/TAGS|/EXT|" } ],
//!   "movement_schema": [
//!     { "filter": ["/*|"], "subfolder": "All", "sublevels": [ ... ] }
//!   ]
//! }
//! ```
//!
//! Loading validates the structure, the file version, every regex and every
//! filter, so evaluation later only deals with well-formed rules. Several
//! schema files can be appended; rules from earlier files keep priority.

use crate::error::{Result, TagsortError};
use crate::file_version::check_supported;
use crate::filter::Filter;
use crate::model::TagFormat;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const SCHEMA_FILE_TYPE: &str = "tagsort_schema";
pub const SCHEMA_FILE_VERSION: &str = "1.1";
const MINIMUM_SCHEMA_FILE_VERSION: &str = "1.0";

/// Renames files matching `filter` with `format_string`.
#[derive(Debug, Clone)]
pub struct RenamingRule {
    pub filter: Filter,
    pub format_string: String,
}

/// One node of the movement tree.
///
/// A matching node contributes its evaluated `subfolder` as a path segment
/// and hands the file on to its `sublevels`.
#[derive(Debug, Clone)]
pub struct FilterLevel {
    pub filter: Filter,
    pub subfolder: String,
    pub sublevels: Vec<FilterLevel>,
}

impl FilterLevel {
    pub fn new(filter: Filter, subfolder: impl Into<String>) -> Self {
        Self {
            filter,
            subfolder: subfolder.into(),
            sublevels: Vec::new(),
        }
    }

    pub fn with_sublevels(mut self, sublevels: Vec<FilterLevel>) -> Self {
        self.sublevels = sublevels;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub tag_formats: Vec<TagFormat>,
    pub unnamed_patterns: Vec<String>,
    pub renaming_rules: Vec<RenamingRule>,
    pub movement_schema: Vec<FilterLevel>,
}

#[derive(Deserialize)]
struct RawSchema {
    file_type: String,
    schema_file_version: Value,
    #[serde(default)]
    tag_formats: Vec<RawTagFormat>,
    #[serde(default)]
    unnamed_patterns: Vec<String>,
    #[serde(default)]
    renaming_schemas: Vec<RawRenamingRule>,
    #[serde(default)]
    movement_schema: Vec<RawFilterLevel>,
}

#[derive(Deserialize)]
struct RawTagFormat {
    tag_pattern: String,
    tag_split_pattern: String,
}

#[derive(Deserialize)]
struct RawRenamingRule {
    filter: Value,
    format_string: String,
}

#[derive(Deserialize)]
struct RawFilterLevel {
    filter: Value,
    #[serde(default)]
    subfolder: String,
    #[serde(default)]
    sublevels: Vec<RawFilterLevel>,
}

impl RawFilterLevel {
    fn build(self) -> Result<FilterLevel> {
        let sublevels = self
            .sublevels
            .into_iter()
            .map(RawFilterLevel::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(FilterLevel::new(Filter::from_value(&self.filter)?, self.subfolder).with_sublevels(sublevels))
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_formats.is_empty()
            && self.unnamed_patterns.is_empty()
            && self.renaming_rules.is_empty()
            && self.movement_schema.is_empty()
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P, append: bool) -> Result<()> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            tracing::warn!("Schema file does not have a .json extension: {}", path.display());
        }
        let content = fs::read_to_string(path)?;
        self.load_str(&content, append)?;
        tracing::info!("Loaded schema from {}", path.display());
        Ok(())
    }

    pub fn load_str(&mut self, json: &str, append: bool) -> Result<()> {
        let raw: RawSchema = serde_json::from_str(json)?;
        self.load_raw(raw, append)
    }

    pub fn load_value(&mut self, value: Value, append: bool) -> Result<()> {
        let raw: RawSchema = serde_json::from_value(value)?;
        self.load_raw(raw, append)
    }

    fn load_raw(&mut self, raw: RawSchema, append: bool) -> Result<()> {
        if raw.file_type != SCHEMA_FILE_TYPE {
            return Err(TagsortError::Schema(format!(
                "expected file_type \"{}\", found \"{}\"",
                SCHEMA_FILE_TYPE, raw.file_type
            )));
        }
        check_supported(
            "schema file",
            &raw.schema_file_version,
            MINIMUM_SCHEMA_FILE_VERSION,
            SCHEMA_FILE_VERSION,
        )?;

        let tag_formats = raw
            .tag_formats
            .iter()
            .map(|f| TagFormat::new(&f.tag_pattern, &f.tag_split_pattern))
            .collect::<Result<Vec<_>>>()?;
        let renaming_rules = raw
            .renaming_schemas
            .into_iter()
            .map(|rule| {
                Ok(RenamingRule {
                    filter: Filter::from_value(&rule.filter)?,
                    format_string: rule.format_string,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let movement_schema = raw
            .movement_schema
            .into_iter()
            .map(RawFilterLevel::build)
            .collect::<Result<Vec<_>>>()?;

        if !append {
            *self = Schema::default();
        }
        self.tag_formats.extend(tag_formats);
        self.unnamed_patterns.extend(raw.unnamed_patterns);
        self.renaming_rules.extend(renaming_rules);
        self.movement_schema.extend(movement_schema);
        tracing::debug!(
            "Schema holds {} tag formats, {} unnamed patterns, {} renaming rules, {} top-level movement filters",
            self.tag_formats.len(),
            self.unnamed_patterns.len(),
            self.renaming_rules.len(),
            self.movement_schema.len()
        );
        Ok(())
    }
}
