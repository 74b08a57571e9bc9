//! # Tag Groups
//!
//! A group (or category, the two share one namespace) is a named set of tags.
//! Members come in three kinds:
//!
//! - a literal tag, matched exactly and case-sensitively
//! - a regex pattern, which must match the whole tag
//! - a reference to another group, written `/G|name` or `/C|name` in group
//!   files, which pulls in that group's members
//!
//! References may form cycles. Resolution follows each reference at most once
//! along a single path, so `A -> B -> A` terminates while a group reachable
//! through two different parents is still consulted through both.
//!
//! Rule evaluation only needs two questions answered, captured by the
//! [`GroupResolver`] trait. [`GroupTable`] is the implementation loaded from
//! group files.
//!
//! ## File formats
//!
//! ```text
//! { "file_type": "tagsort_tag_groups", "tag_group_file_version": "1.0",
//!   "tag_groups": [ { "name": "Beer", "tags": ["/G|Ales", "stout"], "patterns": ["ipa.*"] } ] }
//!
//! { "file_type": "tagsort_tag_categories", "category_file_version": "1.0",
//!   "categories": [ { "name": "Beer", "tags": ["stout"] } ] }
//!
//! { "appVersion": "3.1.4", "settingsVersion": 3,
//!   "tagGroups": [ { "title": "Beer", "children": [ { "title": "stout" } ] } ] }
//! ```
//!
//! The last one is the TagSpaces export format.

use crate::error::{Result, TagsortError};
use crate::file_version::{check_supported, FileVersion};
use crate::pattern::compile_full;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const GROUP_FILE_TYPE: &str = "tagsort_tag_groups";
pub const CATEGORY_FILE_TYPE: &str = "tagsort_tag_categories";
pub const TAG_GROUP_FILE_VERSION: &str = "1.0";
pub const CATEGORY_FILE_VERSION: &str = "1.0";
pub const TAGSPACES_APP_VERSION: &str = "3.1.4";
pub const TAGSPACES_SETTINGS_VERSION: u64 = 3;

const GROUP_PREFIX: &str = "/G|";
const CATEGORY_PREFIX: &str = "/C|";

/// Answers group questions for rule evaluation.
pub trait GroupResolver {
    /// True if `tag` belongs to `group` or to any group it references.
    fn is_member(&self, tag: &str, group: &str) -> bool;

    /// The first tag, in file order, that belongs to `group`.
    fn representative_tag<'t>(&self, tags: &'t [String], group: &str) -> Option<&'t str> {
        tags.iter()
            .map(String::as_str)
            .find(|tag| self.is_member(tag, group))
    }
}

#[derive(Debug, Clone)]
pub enum GroupMember {
    Tag(String),
    Pattern(Regex),
    Group(String),
}

impl GroupMember {
    /// Reads a `tags` entry from a group file. `/G|name` and `/C|name` are
    /// references, anything else is a literal tag.
    pub fn from_entry(entry: &str) -> Self {
        match entry
            .strip_prefix(GROUP_PREFIX)
            .or_else(|| entry.strip_prefix(CATEGORY_PREFIX))
        {
            Some(name) => GroupMember::Group(name.to_string()),
            None => GroupMember::Tag(entry.to_string()),
        }
    }

    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(GroupMember::Pattern(compile_full(pattern)?))
    }

    fn same_as(&self, other: &GroupMember) -> bool {
        match (self, other) {
            (GroupMember::Tag(a), GroupMember::Tag(b)) => a == b,
            (GroupMember::Group(a), GroupMember::Group(b)) => a == b,
            (GroupMember::Pattern(a), GroupMember::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub members: Vec<GroupMember>,
}

impl Group {
    fn absorb(&mut self, members: Vec<GroupMember>) {
        for member in members {
            if !self.members.iter().any(|m| m.same_as(&member)) {
                self.members.push(member);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    groups: HashMap<String, Group>,
}

#[derive(Deserialize)]
struct RawGroup {
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    patterns: Vec<String>,
}

#[derive(Deserialize)]
struct GroupFile {
    tag_group_file_version: Value,
    tag_groups: Vec<RawGroup>,
}

#[derive(Deserialize)]
struct CategoryFile {
    category_file_version: Value,
    categories: Vec<RawGroup>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagSpacesFile {
    app_version: String,
    settings_version: u64,
    tag_groups: Vec<TagSpacesGroup>,
}

#[derive(Deserialize)]
struct TagSpacesGroup {
    title: String,
    #[serde(default)]
    children: Vec<TagSpacesTag>,
}

#[derive(Deserialize)]
struct TagSpacesTag {
    title: String,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Adds a group, merging into an existing group of the same name.
    pub fn insert(&mut self, name: &str, members: Vec<GroupMember>) {
        match self.groups.get_mut(name) {
            Some(existing) => {
                tracing::warn!(
                    "Tag group \"{}\" multiply defined, merging the definitions",
                    name
                );
                existing.absorb(members);
            }
            None => {
                let mut group = Group {
                    name: name.to_string(),
                    members: Vec::new(),
                };
                group.absorb(members);
                self.groups.insert(name.to_string(), group);
            }
        }
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P, append: bool) -> Result<()> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            tracing::warn!(
                "Tag group file does not have a .json extension: {}",
                path.display()
            );
        }
        let content = fs::read_to_string(path)?;
        self.load_str(&content, append)?;
        tracing::info!("Loaded tag groups from {}", path.display());
        Ok(())
    }

    pub fn load_str(&mut self, json: &str, append: bool) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        self.load_value(value, append)
    }

    /// Loads any of the supported group formats. Without `append` the table
    /// is cleared first.
    pub fn load_value(&mut self, value: Value, append: bool) -> Result<()> {
        let file_type = value
            .get("file_type")
            .and_then(Value::as_str)
            .map(str::to_string);
        let groups = match file_type.as_deref() {
            Some(GROUP_FILE_TYPE) => {
                let file: GroupFile = serde_json::from_value(value)?;
                check_supported(
                    "tag group file",
                    &file.tag_group_file_version,
                    "1.0",
                    TAG_GROUP_FILE_VERSION,
                )?;
                file.tag_groups
            }
            Some(CATEGORY_FILE_TYPE) => {
                let file: CategoryFile = serde_json::from_value(value)?;
                check_supported(
                    "category file",
                    &file.category_file_version,
                    "1.0",
                    CATEGORY_FILE_VERSION,
                )?;
                file.categories
            }
            None if value.get("tagGroups").is_some() => {
                let file: TagSpacesFile = serde_json::from_value(value)?;
                warn_on_newer_tagspaces(&file);
                file.tag_groups
                    .into_iter()
                    .map(|group| RawGroup {
                        name: group.title,
                        tags: group.children.into_iter().map(|tag| tag.title).collect(),
                        patterns: Vec::new(),
                    })
                    .collect()
            }
            _ => {
                return Err(TagsortError::Schema(
                    "Tag group data does not match any known format".to_string(),
                ))
            }
        };

        let mut members_by_group = Vec::with_capacity(groups.len());
        for raw in groups {
            let mut members: Vec<GroupMember> =
                raw.tags.iter().map(|t| GroupMember::from_entry(t)).collect();
            for pattern in &raw.patterns {
                members.push(GroupMember::pattern(pattern)?);
            }
            members_by_group.push((raw.name, members));
        }

        if !append {
            self.groups.clear();
        }
        for (name, members) in members_by_group {
            self.insert(&name, members);
        }
        tracing::debug!("Tag group table now holds {} groups", self.groups.len());
        Ok(())
    }

    fn member_of<'a>(&'a self, tag: &str, group: &str, path: &mut Vec<&'a str>) -> bool {
        let Some(entry) = self.groups.get(group) else {
            tracing::debug!("Reference to unknown tag group \"{}\"", group);
            return false;
        };
        path.push(entry.name.as_str());
        let found = entry.members.iter().any(|member| match member {
            GroupMember::Tag(t) => t == tag,
            GroupMember::Pattern(re) => re.is_match(tag),
            GroupMember::Group(child) => {
                !path.contains(&child.as_str()) && self.member_of(tag, child, path)
            }
        });
        path.pop();
        found
    }
}

fn warn_on_newer_tagspaces(file: &TagSpacesFile) {
    let newer_app = match (
        file.app_version.parse::<FileVersion>(),
        TAGSPACES_APP_VERSION.parse::<FileVersion>(),
    ) {
        (Ok(found), Ok(known)) => found > known,
        _ => true,
    };
    if newer_app || file.settings_version > TAGSPACES_SETTINGS_VERSION {
        tracing::warn!(
            "Newer TagSpaces format found (app {}, settings {}); tag group loading may be incomplete",
            file.app_version,
            file.settings_version
        );
    }
}

impl GroupResolver for GroupTable {
    fn is_member(&self, tag: &str, group: &str) -> bool {
        self.member_of(tag, group, &mut Vec::new())
    }

    fn representative_tag<'t>(&self, tags: &'t [String], group: &str) -> Option<&'t str> {
        if !self.groups.contains_key(group) {
            tracing::warn!("Tag group \"{}\" is not among loaded tag groups", group);
            return None;
        }
        tags.iter()
            .map(String::as_str)
            .find(|tag| self.is_member(tag, group))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Beer styles: `Beer` inherits from two regional groups.
    pub fn beer_groups() -> GroupTable {
        let mut table = GroupTable::new();
        table
            .load_str(
                r#"{
                    "file_type": "tagsort_tag_groups",
                    "tag_group_file_version": "1.0",
                    "tag_groups": [
                        {"name": "American Styles", "tags": ["dipa", "pale_ale", "ipa"]},
                        {"name": "Belgian Styles", "tags": ["dubbel", "tripel"]},
                        {"name": "Beer", "tags": ["/G|American Styles", "/G|Belgian Styles"]},
                        {"name": "Storage", "tags": ["refrigerated", "cellar"]}
                    ]
                }"#,
                false,
            )
            .unwrap();
        table
    }
}
