//! Finds tagged files in input folders.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TagsortError};
use crate::model::{FileRecord, TagFormat};
use crate::pattern::compile_full;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Descend into subfolders.
    pub recursive: bool,
    /// Include files and folders whose names start with a dot.
    pub hidden: bool,
}

/// Collects tagged files, skipping ignored names and files already seen.
#[derive(Debug, Default)]
pub struct FileScanner {
    formats: Vec<TagFormat>,
    ignore: Vec<Regex>,
    files: Vec<FileRecord>,
    seen: HashSet<PathBuf>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl FileScanner {
    pub fn new(formats: Vec<TagFormat>) -> Self {
        Self {
            formats,
            ..Default::default()
        }
    }

    pub fn ignore_patterns(&self) -> &[Regex] {
        &self.ignore
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn into_files(self) -> Vec<FileRecord> {
        self.files
    }

    /// Adds one ignore pattern per non-blank line of `path`.
    pub fn load_ignore_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            tracing::error!("Ignore file missing or cannot be opened: {}", path.display());
            TagsortError::Io(err)
        })?;
        self.add_ignore_patterns(content.lines());
        tracing::info!("Loaded ignore file: {}", path.display());
        Ok(())
    }

    /// Bad patterns are skipped with a warning.
    pub fn add_ignore_patterns<'a, I: IntoIterator<Item = &'a str>>(&mut self, lines: I) {
        for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
            match compile_full(line) {
                Ok(re) => self.ignore.push(re),
                Err(err) => tracing::warn!("Regex error in ignore file: {}", err),
            }
        }
        tracing::debug!("{} ignore patterns", self.ignore.len());
    }

    /// Loads one file if it is tagged and new. Returns whether it was added.
    pub fn load_file(&mut self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!("Skipping file with a non-UTF-8 name: {}", path.display());
            return false;
        };
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.seen.contains(&key) {
            tracing::info!("Skipping double processing the file at: {}", path.display());
            return false;
        }
        match FileRecord::from_name(name, path, &self.formats, &self.ignore) {
            Some(file) => {
                self.seen.insert(key);
                self.files.push(file);
                true
            }
            None => false,
        }
    }

    /// Loads every tagged file in `folder`, in file name order.
    pub fn load_folder<P: AsRef<Path>>(&mut self, folder: P, options: ScanOptions) -> Result<usize> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            tracing::error!("Error with input folder: {}", folder.display());
            return Err(TagsortError::Config(format!(
                "input folder does not exist: {}",
                folder.display()
            )));
        }

        let mut walker = WalkDir::new(folder).min_depth(1).sort_by_file_name();
        if !options.recursive {
            walker = walker.max_depth(1);
        }

        let before = self.files.len();
        for entry in walker
            .into_iter()
            .filter_entry(|e| options.hidden || !is_hidden(e))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("Error reading input folder: {}", err);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                self.load_file(entry.path());
            }
        }
        Ok(self.files.len() - before)
    }
}

pub fn run<P: AsRef<Path>>(
    scanner: &mut FileScanner,
    folders: &[P],
    options: ScanOptions,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for folder in folders {
        let found = scanner.load_folder(folder, options)?;
        result.add_message(CmdMessage::info(format!(
            "Found {} tagged file(s) in {}",
            found,
            folder.as_ref().display()
        )));
    }
    Ok(result.with_files(scanner.files().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::bracket_format;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b[ipa].txt");
        touch(temp.path(), "a[dipa cellar].jpg");
        touch(temp.path(), "plain.txt");
        touch(temp.path(), ".hidden[ipa].txt");
        touch(temp.path(), "sub/c[tripel].txt");
        touch(temp.path(), ".secret/d[dubbel].txt");
        temp
    }

    fn names(scanner: &FileScanner) -> Vec<&str> {
        scanner.files().iter().map(|f| f.raw_name.as_str()).collect()
    }

    #[test]
    fn loads_tagged_files_only() {
        let temp = setup();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        let found = scanner.load_folder(temp.path(), ScanOptions::default()).unwrap();
        assert_eq!(found, 2);
        assert_eq!(names(&scanner), vec!["a[dipa cellar].jpg", "b[ipa].txt"]);
        assert_eq!(scanner.files()[0].tags, vec!["dipa", "cellar"]);
    }

    #[test]
    fn recursion_and_hidden_are_opt_in() {
        let temp = setup();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        scanner
            .load_folder(
                temp.path(),
                ScanOptions {
                    recursive: true,
                    hidden: false,
                },
            )
            .unwrap();
        assert_eq!(names(&scanner).len(), 3);
        assert!(names(&scanner).contains(&"c[tripel].txt"));

        let mut scanner = FileScanner::new(vec![bracket_format()]);
        scanner
            .load_folder(
                temp.path(),
                ScanOptions {
                    recursive: true,
                    hidden: true,
                },
            )
            .unwrap();
        assert_eq!(names(&scanner).len(), 5);
        assert!(names(&scanner).contains(&"d[dubbel].txt"));
    }

    #[test]
    fn same_file_is_loaded_once() {
        let temp = setup();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        scanner.load_folder(temp.path(), ScanOptions::default()).unwrap();
        scanner.load_folder(temp.path(), ScanOptions::default()).unwrap();
        assert_eq!(scanner.files().len(), 2);
    }

    #[test]
    fn ignore_file_filters_names() {
        let temp = setup();
        let ignore = temp.path().join("ignore.txt");
        fs::write(&ignore, "a\\[.*\n\n   \n(unclosed\n").unwrap();

        let mut scanner = FileScanner::new(vec![bracket_format()]);
        scanner.load_ignore_file(&ignore).unwrap();
        assert_eq!(scanner.ignore_patterns().len(), 1);
        scanner.load_folder(temp.path(), ScanOptions::default()).unwrap();
        assert_eq!(names(&scanner), vec!["b[ipa].txt"]);
    }

    #[test]
    fn ignore_patterns_must_match_whole_name() {
        let temp = setup();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        scanner.add_ignore_patterns(["ipa"]);
        scanner.load_folder(temp.path(), ScanOptions::default()).unwrap();
        assert_eq!(scanner.files().len(), 2);
    }

    #[test]
    fn missing_ignore_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        let err = scanner.load_ignore_file(temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, TagsortError::Io(_)));
    }

    #[test]
    fn missing_input_folder_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        let err = scanner
            .load_folder(temp.path().join("nope"), ScanOptions::default())
            .unwrap_err();
        assert!(matches!(err, TagsortError::Config(_)));
    }

    #[test]
    fn run_reports_each_folder() {
        let temp = setup();
        let mut scanner = FileScanner::new(vec![bracket_format()]);
        let result = run(&mut scanner, &[temp.path()], ScanOptions::default()).unwrap();
        assert_eq!(result.files.len(), 2);
        assert_eq!(result.messages.len(), 1);
    }
}
