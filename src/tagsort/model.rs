use crate::error::{Result, TagsortError};
use crate::pattern::compile_full;
use regex::Regex;
use std::path::{Path, PathBuf};

/// How tags are embedded in a file name.
///
/// `tag_pattern` must fully match a tagged name and expose the named groups
/// `file`, `raw_tags`, `tags` and `extension`. `tag_split_pattern` splits the
/// `tags` group into individual tags.
#[derive(Debug, Clone)]
pub struct TagFormat {
    pub tag_pattern: Regex,
    pub tag_split_pattern: Regex,
}

impl TagFormat {
    pub fn new(tag_pattern: &str, tag_split_pattern: &str) -> Result<Self> {
        Ok(Self {
            tag_pattern: compile_full(tag_pattern)?,
            tag_split_pattern: Regex::new(tag_split_pattern).map_err(|source| {
                TagsortError::InvalidPattern {
                    pattern: tag_split_pattern.to_string(),
                    source,
                }
            })?,
        })
    }
}

/// A tagged file and everything computed for it along the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Name without tags or extension.
    pub base_name: String,
    /// The full file name as found on disk.
    pub raw_name: String,
    pub original_location: PathBuf,
    /// Extension including its leading dot, or empty.
    pub extension: String,
    /// The tag section of the name, delimiters included.
    pub raw_tag_blob: String,
    /// Tags in the order they appear in the name.
    pub tags: Vec<String>,
    /// Destination folder relative to an output folder.
    pub destination_path: PathBuf,
    pub output_name: String,
    pub move_failed: bool,
    pub rename_failed: bool,
}

impl FileRecord {
    pub fn new(
        base_name: impl Into<String>,
        raw_tag_blob: impl Into<String>,
        extension: impl Into<String>,
        tags: Vec<String>,
        raw_name: impl Into<String>,
        original_location: impl Into<PathBuf>,
    ) -> Self {
        let raw_name = raw_name.into();
        Self {
            base_name: base_name.into(),
            output_name: raw_name.clone(),
            raw_name,
            original_location: original_location.into(),
            extension: extension.into(),
            raw_tag_blob: raw_tag_blob.into(),
            tags,
            destination_path: PathBuf::new(),
            move_failed: false,
            rename_failed: false,
        }
    }

    /// Parses a file name against the known tag formats.
    ///
    /// Returns `None` for untagged names and for names matching an ignore
    /// pattern. The first format that matches wins.
    pub fn from_name(
        name: &str,
        path: &Path,
        formats: &[TagFormat],
        ignore: &[Regex],
    ) -> Option<Self> {
        for format in formats {
            let Some(caps) = format.tag_pattern.captures(name) else {
                continue;
            };
            if ignore.iter().any(|re| re.is_match(name)) {
                tracing::info!("Skipping file due to ignore pattern: {}", path.display());
                return None;
            }
            let group = |key: &str| caps.name(key).map_or("", |m| m.as_str());
            let tags = format
                .tag_split_pattern
                .split(group("tags"))
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            tracing::debug!("Found file to process: {}", path.display());
            return Some(Self::new(
                group("file"),
                group("raw_tags"),
                group("extension"),
                tags,
                name,
                path,
            ));
        }
        tracing::info!("Skipping untagged file: {}", path.display());
        None
    }

    /// `base_name` followed by `extension`, the name unnamed patterns test.
    pub fn untagged_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }
}
