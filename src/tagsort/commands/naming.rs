//! Chooses output names and resolves collisions between them.
//!
//! A file is renamed when its untagged name looks machine-generated (it
//! matches an unnamed pattern) or when renaming is forced. The first renaming
//! rule whose filter matches supplies the format string.
//!
//! Names are first produced without their iteration spans. When two files in
//! the same destination would end up with the same name, the spans are
//! switched on: the first file becomes occurrence 1, the newcomer 2, and so
//! on. Counts are kept in a [`NameRegistry`] owned by the caller so they
//! survive across batches.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TagsortError};
use crate::format::{evaluate_iters, strip_iters, substitute_operators};
use crate::groups::GroupResolver;
use crate::model::FileRecord;
use crate::pattern::compile_prefix;
use crate::schema::{RenamingRule, Schema};
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct Namer {
    rules: Vec<RenamingRule>,
    unnamed_patterns: Vec<Regex>,
}

impl Namer {
    pub fn new<S: AsRef<str>>(rules: Vec<RenamingRule>, unnamed_patterns: &[S]) -> Result<Self> {
        if rules.is_empty() {
            tracing::error!("Completely empty renaming schemas");
            return Err(TagsortError::Schema(
                "completely empty renaming schemas".to_string(),
            ));
        }
        if unnamed_patterns.is_empty() {
            tracing::warn!("No unnamed patterns given, only forced renames will happen");
        }
        let mut compiled = Vec::with_capacity(unnamed_patterns.len());
        for pattern in unnamed_patterns {
            match compile_prefix(pattern.as_ref()) {
                Ok(re) => compiled.push(re),
                Err(err) => tracing::warn!("Skipping unnamed pattern: {}", err),
            }
        }
        Ok(Self {
            rules,
            unnamed_patterns: compiled,
        })
    }

    pub fn from_schema(schema: &Schema) -> Result<Self> {
        Namer::new(schema.renaming_rules.clone(), &schema.unnamed_patterns)
    }

    /// True if `name` (without tags) matches an unnamed pattern at its start.
    pub fn is_unnamed(&self, name: &str) -> bool {
        self.unnamed_patterns.iter().any(|re| re.is_match(name))
    }

    /// Format string of the first rule matching `tags`.
    pub fn find_format_string(
        &self,
        tags: &[String],
        resolver: &dyn GroupResolver,
    ) -> Result<Option<&str>> {
        for rule in &self.rules {
            if rule.filter.matches(tags, resolver)? {
                return Ok(Some(rule.format_string.as_str()));
            }
        }
        Ok(None)
    }
}

#[derive(Debug)]
struct ProducedName {
    occurrences: u32,
    first_occurrence: PathBuf,
}

/// Names produced so far, keyed by destination and iterless name.
#[derive(Debug, Default)]
pub struct NameRegistry {
    produced: HashMap<(PathBuf, String), ProducedName>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.produced.clear();
    }

    pub fn len(&self) -> usize {
        self.produced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.produced.is_empty()
    }

    /// How many files have produced `name` in `destination`.
    pub fn occurrences(&self, destination: &std::path::Path, name: &str) -> u32 {
        self.produced
            .get(&(destination.to_path_buf(), name.to_string()))
            .map_or(0, |p| p.occurrences)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NamingOptions {
    /// Rename files even when they do not match an unnamed pattern.
    pub force_rename: bool,
    /// Count a forced rename without a matching rule as a failure.
    pub force_fail_on_bad: bool,
    /// Forget previously produced names before this batch.
    pub clear_occurrences: bool,
}

fn warn_on_lost_parts(format: &str) {
    if !format.contains("/TAGS|") {
        tracing::warn!(
            "Renaming without preserving tags will lose tagging, format string: \"{}\"",
            format
        );
    }
    if !format.contains("/EXT|") {
        tracing::warn!(
            "Renaming without preserving the original extension, format string: \"{}\"",
            format
        );
    }
}

/// Output names must stay a single path component.
fn assign_name(file: &mut FileRecord, name: String, format: &str) {
    if name.contains('/') {
        tracing::error!(
            "Format string \"{}\" produced \"{}\" for {}, which is not a plain file name",
            format,
            name,
            file.raw_name
        );
        file.rename_failed = true;
    } else {
        file.output_name = name;
        file.rename_failed = false;
    }
}

/// Sets `output_name` and `rename_failed` on every file.
pub fn determine_names(
    files: &mut [FileRecord],
    namer: &Namer,
    registry: &mut NameRegistry,
    resolver: &dyn GroupResolver,
    options: NamingOptions,
) -> Result<()> {
    if options.clear_occurrences {
        registry.clear();
    }

    for i in 0..files.len() {
        let unnamed = namer.is_unnamed(&files[i].untagged_name());
        if !unnamed && !options.force_rename {
            tracing::info!(
                "Skipped renaming of manually-named file: {}",
                files[i].original_location.display()
            );
            files[i].rename_failed = false;
            continue;
        }

        let Some(format) = namer.find_format_string(&files[i].tags, resolver)? else {
            if !unnamed && !options.force_fail_on_bad {
                tracing::info!(
                    "Skipped renaming of manually-named file: {}",
                    files[i].original_location.display()
                );
                files[i].rename_failed = false;
            } else {
                tracing::warn!("File did not match any renaming schema: {}", files[i].raw_name);
                files[i].rename_failed = true;
            }
            continue;
        };
        warn_on_lost_parts(format);

        let iterless = substitute_operators(&strip_iters(format)?, &files[i], resolver)?;
        if iterless.contains('/') {
            assign_name(&mut files[i], iterless, format);
            continue;
        }
        let key = (files[i].destination_path.clone(), iterless.clone());

        let entry = match registry.produced.entry(key) {
            Entry::Vacant(slot) => {
                tracing::debug!("Scheduling {} to be renamed to {}", files[i].raw_name, iterless);
                slot.insert(ProducedName {
                    occurrences: 1,
                    first_occurrence: files[i].original_location.clone(),
                });
                assign_name(&mut files[i], iterless, format);
                continue;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        tracing::debug!("Duplicate file name {}, invoking /ITER|", iterless);
        if entry.occurrences == 1 {
            match files[..i]
                .iter()
                .position(|f| f.original_location == entry.first_occurrence)
            {
                Some(j) => {
                    let first_name =
                        substitute_operators(&evaluate_iters(format, 1)?, &files[j], resolver)?;
                    tracing::debug!("First duplicate {} now scheduled as {}", iterless, first_name);
                    assign_name(&mut files[j], first_name, format);
                }
                None => tracing::debug!(
                    "First file named {} belongs to an earlier batch, leaving it as is",
                    iterless
                ),
            }
        }
        entry.occurrences += 1;
        let name = substitute_operators(
            &evaluate_iters(format, entry.occurrences)?,
            &files[i],
            resolver,
        )?;
        tracing::debug!("Scheduling {} to be renamed to {}", files[i].raw_name, name);
        assign_name(&mut files[i], name, format);
    }
    Ok(())
}

pub fn run(
    mut files: Vec<FileRecord>,
    namer: &Namer,
    registry: &mut NameRegistry,
    resolver: &dyn GroupResolver,
    options: NamingOptions,
) -> Result<CmdResult> {
    determine_names(&mut files, namer, registry, resolver, options)?;
    let mut result = CmdResult::default();
    let failed = files.iter().filter(|f| f.rename_failed).count();
    if failed > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} file(s) could not be renamed",
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

    fn rule(filter: &[&str], format: &str) -> RenamingRule {
        RenamingRule {
            filter: Filter::parse(filter).unwrap(),
            format_string: format.to_string(),
        }
    }

    fn bottle_namer() -> Namer {
        Namer::new(
            vec![
                rule(&["/G|Beer"], "Beer Bottle/ITER| /#|/EITER|"),
                rule(&["/*|"], "/FILE|/TAGS|/EXT|"),
            ],
            &["IMG_"],
        )
        .unwrap()
    }

    fn names(files: &[FileRecord]) -> Vec<&str> {
        files.iter().map(|f| f.output_name.as_str()).collect()
    }

    #[test]
    fn colliding_names_are_numbered() {
        let groups = beer_groups();
        let mut registry = NameRegistry::new();
        let mut files = vec![
            file("IMG_1", &["dipa"]),
            file("IMG_2", &["ipa"]),
            file("IMG_3", &["tripel"]),
        ];
        determine_names(&mut files, &bottle_namer(), &mut registry, &groups, NamingOptions::default())
            .unwrap();
        assert_eq!(
            names(&files),
            vec!["Beer Bottle 1", "Beer Bottle 2", "Beer Bottle 3"]
        );
        assert!(files.iter().all(|f| !f.rename_failed));
        assert_eq!(registry.occurrences(&PathBuf::new(), "Beer Bottle"), 3);
    }

    #[test]
    fn distinct_destinations_do_not_collide() {
        let groups = beer_groups();
        let mut registry = NameRegistry::new();
        let mut files = vec![
            file("IMG_1", &["dipa"]),
            file("IMG_2", &["ipa"]),
            file("IMG_3", &["tripel"]),
        ];
        for (f, dest) in files.iter_mut().zip(["a", "b", "c"]) {
            f.destination_path = PathBuf::from(dest);
        }
        determine_names(&mut files, &bottle_namer(), &mut registry, &groups, NamingOptions::default())
            .unwrap();
        assert_eq!(names(&files), vec!["Beer Bottle", "Beer Bottle", "Beer Bottle"]);
    }

    #[test]
    fn registry_persists_across_batches() {
        let groups = beer_groups();
        let namer = bottle_namer();
        let mut registry = NameRegistry::new();

        let mut first = vec![file("IMG_1", &["dipa"])];
        determine_names(&mut first, &namer, &mut registry, &groups, NamingOptions::default()).unwrap();
        assert_eq!(names(&first), vec!["Beer Bottle"]);

        let mut second = vec![file("IMG_2", &["dipa"])];
        determine_names(&mut second, &namer, &mut registry, &groups, NamingOptions::default()).unwrap();
        assert_eq!(names(&second), vec!["Beer Bottle 2"]);

        let mut third = vec![file("IMG_3", &["dipa"])];
        let options = NamingOptions {
            clear_occurrences: true,
            ..Default::default()
        };
        determine_names(&mut third, &namer, &mut registry, &groups, options).unwrap();
        assert_eq!(names(&third), vec!["Beer Bottle"]);
    }

    #[test]
    fn manually_named_files_are_left_alone() {
        let groups = beer_groups();
        let mut registry = NameRegistry::new();
        let mut files = vec![file("Holiday", &["dipa"])];
        determine_names(&mut files, &bottle_namer(), &mut registry, &groups, NamingOptions::default())
            .unwrap();
        assert_eq!(files[0].output_name, files[0].raw_name);
        assert!(!files[0].rename_failed);
    }

    #[test]
    fn forced_rename_applies_rules() {
        let groups = beer_groups();
        let mut registry = NameRegistry::new();
        let mut files = vec![file("Holiday", &["dipa"])];
        let options = NamingOptions {
            force_rename: true,
            ..Default::default()
        };
        determine_names(&mut files, &bottle_namer(), &mut registry, &groups, options).unwrap();
        assert_eq!(files[0].output_name, "Beer Bottle");
    }

    #[test]
    fn unmatched_files_follow_failure_rules() {
        let groups = beer_groups();
        let namer = Namer::new(vec![rule(&["/G|Beer"], "Beer/TAGS|/EXT|")], &["IMG_"]).unwrap();

        let mut unnamed = vec![file("IMG_1", &["wine"])];
        determine_names(&mut unnamed, &namer, &mut NameRegistry::new(), &groups, NamingOptions::default())
            .unwrap();
        assert!(unnamed[0].rename_failed);

        let forced = NamingOptions {
            force_rename: true,
            ..Default::default()
        };
        let mut manual = vec![file("Holiday", &["wine"])];
        determine_names(&mut manual, &namer, &mut NameRegistry::new(), &groups, forced).unwrap();
        assert!(!manual[0].rename_failed);
        assert_eq!(manual[0].output_name, manual[0].raw_name);

        let strict = NamingOptions {
            force_rename: true,
            force_fail_on_bad: true,
            ..Default::default()
        };
        let mut manual = vec![file("Holiday", &["wine"])];
        determine_names(&mut manual, &namer, &mut NameRegistry::new(), &groups, strict).unwrap();
        assert!(manual[0].rename_failed);
    }

    #[test]
    fn first_matching_rule_wins() {
        let groups = beer_groups();
        let namer = Namer::new(
            vec![rule(&["ipa"], "first/EXT|"), rule(&["/*|"], "second/EXT|")],
            &["IMG_"],
        )
        .unwrap();
        let mut files = vec![file("IMG_1", &["ipa"]), file("IMG_2", &["stout"])];
        determine_names(&mut files, &namer, &mut NameRegistry::new(), &groups, NamingOptions::default())
            .unwrap();
        assert_eq!(names(&files), vec!["first.txt", "second.txt"]);
    }

    #[test]
    fn unnamed_patterns_anchor_at_start() {
        let namer = bottle_namer();
        assert!(namer.is_unnamed("IMG_0001.jpg"));
        assert!(!namer.is_unnamed("My IMG_0001.jpg"));
    }

    #[test]
    fn occurrence_outside_iter_is_fatal() {
        let groups = beer_groups();
        let namer = Namer::new(vec![rule(&["/*|"], "Bad/#|")], &["IMG_"]).unwrap();
        let mut files = vec![file("IMG_1", &["a"])];
        let err = determine_names(&mut files, &namer, &mut NameRegistry::new(), &groups, NamingOptions::default())
            .unwrap_err();
        assert!(matches!(err, TagsortError::OutsideIterOperator(_)));
    }

    #[test]
    fn names_with_slashes_fail_the_file() {
        let groups = beer_groups();
        let namer = Namer::new(
            vec![
                rule(&["dipa"], "/tmp/outside/escaped/TAGS|/EXT|"),
                rule(&["/*|"], "Ok/ITER|/x/#|/EITER|/TAGS|/EXT|"),
            ],
            &["IMG_"],
        )
        .unwrap();
        let mut registry = NameRegistry::new();
        let mut files = vec![
            file("IMG_1", &["dipa"]),
            file("IMG_2", &["ipa"]),
            file("IMG_3", &["ipa"]),
        ];
        determine_names(&mut files, &namer, &mut registry, &groups, NamingOptions::default())
            .unwrap();

        assert!(files[0].rename_failed);
        assert_eq!(files[0].output_name, files[0].raw_name);
        // Collisions switch the span on, which puts a slash in both names.
        assert!(files[1].rename_failed && files[2].rename_failed);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_rules_are_rejected() {
        assert!(Namer::new(Vec::new(), &["IMG_"]).is_err());
    }

    #[test]
    fn run_reports_failures() {
        let groups = beer_groups();
        let namer = Namer::new(vec![rule(&["/G|Beer"], "Beer/TAGS|/EXT|")], &["IMG_"]).unwrap();
        let result = run(
            vec![file("IMG_1", &["wine"])],
            &namer,
            &mut NameRegistry::new(),
            &groups,
            NamingOptions::default(),
        )
        .unwrap();
        assert_eq!(result.messages.len(), 1);
        assert!(result.files[0].rename_failed);
    }
}
