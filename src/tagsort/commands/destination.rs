//! Picks a destination folder for each file by walking the movement tree.
//!
//! Siblings are tried in declaration order. A complete match (one that ends
//! at a leaf, or at a node with an empty subfolder) always beats a partial
//! one, and the first partial match is kept as a fallback.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TagsortError};
use crate::format::{strip_iters, substitute_operators};
use crate::groups::GroupResolver;
use crate::model::FileRecord;
use crate::schema::FilterLevel;
use std::path::{Path, PathBuf};

/// Result of matching a file against part of the movement tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub complete: bool,
    pub path: PathBuf,
}

impl PathMatch {
    pub fn complete(path: PathBuf) -> Self {
        Self {
            complete: true,
            path,
        }
    }

    pub fn partial(path: PathBuf) -> Self {
        Self {
            complete: false,
            path,
        }
    }

    /// Nothing matched at all.
    pub fn is_miss(&self) -> bool {
        !self.complete && is_empty_path(&self.path)
    }
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

fn join_segment(segment: &Path, below: PathBuf) -> PathBuf {
    if is_empty_path(&below) {
        segment.to_path_buf()
    } else {
        segment.join(below)
    }
}

/// Evaluates one node and, recursively, its sublevels.
pub fn process_filter_level(
    file: &FileRecord,
    level: &FilterLevel,
    resolver: &dyn GroupResolver,
) -> Result<PathMatch> {
    if !level.filter.matches(&file.tags, resolver)? {
        return Ok(PathMatch::default());
    }

    let segment = if level.subfolder.is_empty() {
        PathBuf::new()
    } else {
        PathBuf::from(substitute_operators(
            &strip_iters(&level.subfolder)?,
            file,
            resolver,
        )?)
    };

    // An empty subfolder ends the walk in the parent folder.
    if level.sublevels.is_empty() || level.subfolder.is_empty() {
        return Ok(PathMatch::complete(segment));
    }

    let below = best_match(file, &level.sublevels, resolver)?;
    if below.complete {
        Ok(PathMatch::complete(join_segment(&segment, below.path)))
    } else {
        Ok(PathMatch::partial(join_segment(&segment, below.path)))
    }
}

/// First complete match among `levels`, else the first non-empty partial one.
fn best_match(
    file: &FileRecord,
    levels: &[FilterLevel],
    resolver: &dyn GroupResolver,
) -> Result<PathMatch> {
    let mut partial: Option<PathBuf> = None;
    for level in levels {
        let found = process_filter_level(file, level, resolver)?;
        if found.complete {
            return Ok(found);
        }
        if partial.is_none() && !is_empty_path(&found.path) {
            partial = Some(found.path);
        }
    }
    Ok(partial.map(PathMatch::partial).unwrap_or_default())
}

/// Finds the destination folder for one file.
pub fn generate_path(
    file: &FileRecord,
    movement_schema: &[FilterLevel],
    resolver: &dyn GroupResolver,
) -> Result<PathMatch> {
    if movement_schema.is_empty() {
        tracing::error!("Completely empty movement schema");
        return Err(TagsortError::EmptySchema);
    }
    let found = best_match(file, movement_schema, resolver)?;
    if found.complete {
        tracing::debug!("Good match for moving tags: {:?}", file.tags);
    } else if !found.is_miss() {
        tracing::warn!(
            "Failed to match a fully specified location for tags {:?}, sorted only to {}. Add a /*| filter at that level to catch all files there.",
            file.tags,
            found.path.display()
        );
    }
    Ok(found)
}

/// Sets `destination_path` and `move_failed` on every file.
pub fn determine_destination(
    files: &mut [FileRecord],
    movement_schema: &[FilterLevel],
    resolver: &dyn GroupResolver,
) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    for file in files.iter_mut() {
        let found = generate_path(file, movement_schema, resolver)?;
        file.move_failed = found.is_miss();
        if file.move_failed {
            tracing::warn!("File did not match any movement schema: {}", file.raw_name);
        }
        file.destination_path = found.path;
    }
    Ok(())
}

pub fn run(
    mut files: Vec<FileRecord>,
    movement_schema: &[FilterLevel],
    resolver: &dyn GroupResolver,
) -> Result<CmdResult> {
    determine_destination(&mut files, movement_schema, resolver)?;
    let mut result = CmdResult::default();
    let failed = files.iter().filter(|f| f.move_failed).count();
    if failed > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} file(s) did not match any movement filter",
            failed
        )));
    }
    Ok(result.with_files(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::groups::fixtures::beer_groups;
    use crate::model::fixtures::file;

    fn level(filter: &[&str], subfolder: &str) -> FilterLevel {
        FilterLevel::new(Filter::parse(filter).unwrap(), subfolder)
    }

    fn beer_tree() -> Vec<FilterLevel> {
        vec![
            level(&["/G|Beer"], "Beer/?TIG|Beer/|").with_sublevels(vec![
                level(&["refrigerated"], "Cold"),
                level(&["cellar"], "Cellar").with_sublevels(vec![level(&["aged"], "Aged")]),
            ]),
            level(&["wine"], "Wine"),
        ]
    }

    #[test]
    fn unmatched_level_yields_nothing() {
        let groups = beer_groups();
        let found =
            process_filter_level(&file("x", &["soda"]), &level(&["wine"], "Wine"), &groups).unwrap();
        assert_eq!(found, PathMatch::default());
        assert!(found.is_miss());
    }

    #[test]
    fn leaf_match_is_complete() {
        let groups = beer_groups();
        let found =
            process_filter_level(&file("x", &["wine"]), &level(&["wine"], "Wine"), &groups).unwrap();
        assert_eq!(found, PathMatch::complete(PathBuf::from("Wine")));
    }

    #[test]
    fn complete_child_is_joined() {
        let groups = beer_groups();
        let found = generate_path(&file("x", &["dipa", "refrigerated"]), &beer_tree(), &groups)
            .unwrap();
        assert_eq!(found, PathMatch::complete(PathBuf::from("Beerdipa/Cold")));
    }

    #[test]
    fn partial_match_returns_its_own_segment() {
        let groups = beer_groups();
        let found = generate_path(&file("x", &["dipa"]), &beer_tree(), &groups).unwrap();
        assert_eq!(found, PathMatch::partial(PathBuf::from("Beerdipa")));
    }

    #[test]
    fn deepest_partial_is_kept() {
        let groups = beer_groups();
        let found = generate_path(&file("x", &["dipa", "cellar"]), &beer_tree(), &groups).unwrap();
        assert_eq!(found, PathMatch::partial(PathBuf::from("Beerdipa/Cellar")));
    }

    #[test]
    fn complete_sibling_beats_earlier_partial() {
        let groups = beer_groups();
        let tree = vec![
            level(&["a"], "A").with_sublevels(vec![level(&["zzz"], "Z")]),
            level(&["b"], "B"),
        ];
        let found = generate_path(&file("x", &["a", "b"]), &tree, &groups).unwrap();
        assert_eq!(found, PathMatch::complete(PathBuf::from("B")));
    }

    #[test]
    fn first_partial_wins_among_partials() {
        let groups = beer_groups();
        let tree = vec![
            level(&["a"], "A").with_sublevels(vec![level(&["zzz"], "Z")]),
            level(&["b"], "B").with_sublevels(vec![level(&["zzz"], "Z")]),
        ];
        let found = generate_path(&file("x", &["a", "b"]), &tree, &groups).unwrap();
        assert_eq!(found, PathMatch::partial(PathBuf::from("A")));
    }

    #[test]
    fn empty_subfolder_terminates_in_parent() {
        let groups = beer_groups();
        let tree = vec![level(&["a"], "A").with_sublevels(vec![
            level(&["b"], "").with_sublevels(vec![level(&["c"], "C")]),
        ])];
        let found = generate_path(&file("x", &["a", "b", "c"]), &tree, &groups).unwrap();
        assert_eq!(found, PathMatch::complete(PathBuf::from("A")));
    }

    #[test]
    fn root_level_empty_subfolder_is_a_complete_match() {
        let groups = beer_groups();
        let tree = vec![level(&["/*|"], "")];
        let mut files = vec![file("x", &[])];
        determine_destination(&mut files, &tree, &groups).unwrap();
        assert!(!files[0].move_failed);
        assert_eq!(files[0].destination_path, PathBuf::new());
    }

    #[test]
    fn subfolder_iteration_spans_are_stripped() {
        let groups = beer_groups();
        let tree = vec![level(&["a"], "Box/ITER| /#|/EITER|")];
        let found = generate_path(&file("x", &["a"]), &tree, &groups).unwrap();
        assert_eq!(found.path, PathBuf::from("Box"));
    }

    #[test]
    fn empty_schema_is_an_error() {
        let groups = beer_groups();
        let err = generate_path(&file("x", &["a"]), &[], &groups).unwrap_err();
        assert!(matches!(err, TagsortError::EmptySchema));
    }

    #[test]
    fn empty_file_list_skips_schema_checks() {
        let groups = beer_groups();
        let mut files: Vec<FileRecord> = Vec::new();
        determine_destination(&mut files, &[], &groups).unwrap();
    }

    #[test]
    fn marks_unmatched_files_as_failed() {
        let groups = beer_groups();
        let mut files = vec![file("a", &["wine"]), file("b", &["soda"])];
        determine_destination(&mut files, &beer_tree(), &groups).unwrap();
        assert!(!files[0].move_failed);
        assert_eq!(files[0].destination_path, PathBuf::from("Wine"));
        assert!(files[1].move_failed);
    }

    #[test]
    fn empty_filter_surfaces_when_evaluated() {
        let groups = beer_groups();
        let tree = vec![FilterLevel::new(Filter::default(), "X")];
        let err = generate_path(&file("x", &["a"]), &tree, &groups).unwrap_err();
        assert!(matches!(err, TagsortError::MalformedFilter(_)));
    }

    #[test]
    fn run_reports_failures() {
        let groups = beer_groups();
        let result = run(vec![file("b", &["soda"])], &beer_tree(), &groups).unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.messages.len(), 1);
    }
}
