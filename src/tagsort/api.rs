//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for a
//! tagsort run. It owns the loaded rules ([`GroupTable`] and [`Schema`]) and
//! the [`NameRegistry`] that keeps collision counts across batches, and
//! dispatches to `commands/*.rs`.
//!
//! The facade does no terminal I/O. Every method returns a [`CmdResult`]
//! whose messages the caller decides how to show.
//!
//! ## Pipeline
//!
//! [`TagsortApi::organize`] runs the full sequence for a set of [`Settings`]:
//!
//! 1. scan the input folders for tagged files
//! 2. place each file in the movement tree (skipped when only renaming)
//! 3. name each file (skipped when only moving)
//! 4. copy or move files to their targets
//! 5. clean empty folders, if asked to
//!
//! Each step is also available on its own.

use crate::commands::{self, naming::Namer};
use crate::error::Result;
use crate::groups::GroupTable;
use crate::model::FileRecord;
use crate::schema::Schema;
use crate::settings::Settings;
use std::path::{Path, PathBuf};

pub use crate::commands::clean::clean_folder;
pub use crate::commands::naming::{NameRegistry, NamingOptions};
pub use crate::commands::relocate::MoveOptions;
pub use crate::commands::scan::{FileScanner, ScanOptions};
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};

pub struct TagsortApi {
    groups: GroupTable,
    schema: Schema,
    registry: NameRegistry,
}

impl TagsortApi {
    pub fn new(groups: GroupTable, schema: Schema) -> Self {
        Self {
            groups,
            schema,
            registry: NameRegistry::new(),
        }
    }

    /// Loads and combines every group file and schema file, in order.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        group_files: &[P],
        schema_files: &[Q],
    ) -> Result<Self> {
        let mut groups = GroupTable::new();
        for path in group_files {
            groups.load_file(path, true)?;
        }
        let mut schema = Schema::new();
        for path in schema_files {
            schema.load_file(path, true)?;
        }
        Ok(Self::new(groups, schema))
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    pub fn scan<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        folders: &[P],
        ignore_files: &[Q],
        options: ScanOptions,
    ) -> Result<CmdResult> {
        let mut scanner = FileScanner::new(self.schema.tag_formats.clone());
        for path in ignore_files {
            scanner.load_ignore_file(path)?;
        }
        commands::scan::run(&mut scanner, folders, options)
    }

    pub fn place(&self, files: Vec<FileRecord>) -> Result<CmdResult> {
        commands::destination::run(files, &self.schema.movement_schema, &self.groups)
    }

    pub fn name(&mut self, files: Vec<FileRecord>, options: NamingOptions) -> Result<CmdResult> {
        let namer = Namer::from_schema(&self.schema)?;
        commands::naming::run(files, &namer, &mut self.registry, &self.groups, options)
    }

    pub fn relocate<P: AsRef<Path>>(
        &self,
        files: &[FileRecord],
        output_folders: &[P],
        options: &MoveOptions,
    ) -> Result<CmdResult> {
        commands::relocate::move_files(files, output_folders, options)
    }

    pub fn clean<P: AsRef<Path>>(&self, folder: P, trial_run: bool) -> Result<CmdResult> {
        clean_folder(folder, trial_run)
    }

    /// Runs the whole pipeline described in the module docs.
    pub fn organize(&mut self, settings: &Settings) -> Result<CmdResult> {
        let mut messages = Vec::new();

        let scanned = self.scan(
            &settings.input_folders,
            &settings.ignore_files,
            settings.scan_options(),
        )?;
        messages.extend(scanned.messages);
        let mut files = scanned.files;

        if settings.rename_only {
            // Renamed files stay where they are, so names only collide
            // within a folder.
            for file in &mut files {
                file.destination_path = file
                    .original_location
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
            }
        } else {
            let placed = self.place(files)?;
            messages.extend(placed.messages);
            files = placed.files;
        }

        if !settings.move_only {
            let named = self.name(files, settings.naming_options())?;
            messages.extend(named.messages);
            files = named.files;
        }

        let moved = self.relocate(&files, &settings.output_folders, &settings.move_options())?;
        messages.extend(moved.messages);

        let mut removed_dirs: Vec<PathBuf> = Vec::new();
        for folder in &settings.clean_folders {
            let cleaned = self.clean(folder, settings.trial)?;
            messages.extend(cleaned.messages);
            removed_dirs.extend(cleaned.removed_dirs);
        }

        let mut result = CmdResult::default()
            .with_files(files)
            .with_written_paths(moved.written_paths)
            .with_removed_dirs(removed_dirs);
        for message in messages {
            result.add_message(message);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::fixtures::beer_groups;
    use crate::model::fixtures::file;
    use std::fs;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{
        "file_type": "tagsort_schema",
        "schema_file_version": "1.1",
        "tag_formats": [
            {"tag_pattern": "(?P<file>[^\\[]*)(?P<raw_tags>\\[(?P<tags>[^\\]]*)\\])(?P<extension>\\..*)?",
             "tag_split_pattern": " "}
        ],
        "unnamed_patterns": ["IMG_"],
        "renaming_schemas": [
            {"filter": ["/G|Beer"], "format_string": "Beer Bottle/ITER| /#|/EITER|/TAGS|/EXT|"}
        ],
        "movement_schema": [
            {"filter": ["/G|Beer"], "subfolder": "Beer"}
        ]
    }"#;

    fn api() -> TagsortApi {
        let mut schema = Schema::new();
        schema.load_str(SCHEMA, false).unwrap();
        TagsortApi::new(beer_groups(), schema)
    }

    #[test]
    fn place_dispatches_to_destination() {
        let result = api().place(vec![file("IMG_1", &["ipa"])]).unwrap();
        assert_eq!(result.files[0].destination_path, PathBuf::from("Beer"));
    }

    #[test]
    fn name_keeps_counts_between_calls() {
        let mut api = api();
        api.name(vec![file("IMG_1", &["ipa"])], NamingOptions::default())
            .unwrap();
        let second = api
            .name(vec![file("IMG_2", &["ipa"])], NamingOptions::default())
            .unwrap();
        assert_eq!(second.files[0].output_name, "Beer Bottle 2[ipa].txt");
        assert_eq!(api.registry().len(), 1);
    }

    #[test]
    fn organize_runs_the_pipeline() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        fs::create_dir_all(input.join("nested")).unwrap();
        fs::write(input.join("IMG_1[ipa].jpg"), "1").unwrap();
        fs::write(input.join("IMG_2[ipa].jpg"), "2").unwrap();
        fs::write(input.join("IMG_3[tripel].jpg"), "3").unwrap();
        fs::write(input.join("notes.txt"), "untagged").unwrap();

        let settings = Settings {
            input_folders: vec![input.clone()],
            output_folders: vec![output.clone()],
            clean_folders: vec![input.clone()],
            ..Default::default()
        };
        let result = api().organize(&settings).unwrap();

        assert!(output.join("Beer/Beer Bottle 1[ipa].jpg").exists());
        assert!(output.join("Beer/Beer Bottle 2[ipa].jpg").exists());
        assert!(output.join("Beer/Beer Bottle[tripel].jpg").exists());
        assert!(input.join("notes.txt").exists());
        assert!(!input.join("nested").exists());
        assert_eq!(result.written_paths.len(), 3);
        assert_eq!(result.removed_dirs, vec![input.join("nested")]);
    }

    #[test]
    fn rename_only_numbers_collisions_per_folder() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        for (folder, name) in [
            ("a", "IMG_1[ipa].jpg"),
            ("b", "IMG_2[ipa].jpg"),
            ("b", "IMG_3[ipa].jpg"),
        ] {
            fs::create_dir_all(input.join(folder)).unwrap();
            fs::write(input.join(folder).join(name), name).unwrap();
        }

        let settings = Settings {
            input_folders: vec![input.clone()],
            recursive: true,
            rename_only: true,
            ..Default::default()
        };
        api().organize(&settings).unwrap();

        assert!(input.join("a/Beer Bottle[ipa].jpg").exists());
        assert!(input.join("b/Beer Bottle 1[ipa].jpg").exists());
        assert!(input.join("b/Beer Bottle 2[ipa].jpg").exists());
        assert!(!input.join("a/Beer Bottle 1[ipa].jpg").exists());
    }

    #[test]
    fn names_leaving_the_output_folder_are_not_written() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("IMG_1[ipa].jpg"), "1").unwrap();

        let escape = format!("{}/outside/escaped/TAGS|/EXT|", temp.path().display());
        let mut schema = Schema::new();
        schema
            .load_str(&SCHEMA.replace("Beer Bottle/ITER| /#|/EITER|/TAGS|/EXT|", &escape), false)
            .unwrap();
        let settings = Settings {
            input_folders: vec![input.clone()],
            output_folders: vec![output.clone()],
            ..Default::default()
        };
        let result = TagsortApi::new(beer_groups(), schema)
            .organize(&settings)
            .unwrap();

        assert!(result.files[0].rename_failed);
        assert!(result.written_paths.is_empty());
        assert!(!temp.path().join("outside").exists());
        assert!(input.join("IMG_1[ipa].jpg").exists());
    }
}
