use crate::error::Result;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".tagsortrc";

/// Options for a run, as read from a `.tagsortrc` JSON file.
///
/// The command line produces the same structure, and the two are merged by
/// [`crate::settings::Settings::resolve`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TagsortConfig {
    pub input_folders: Vec<PathBuf>,
    pub ignore_files: Vec<PathBuf>,
    pub recursive: bool,
    pub hidden: bool,

    pub output_folders: Vec<PathBuf>,
    /// Use the first input folder as the output folder.
    pub organize: bool,

    pub group_files: Vec<PathBuf>,
    pub schema_files: Vec<PathBuf>,

    pub all_match_root: bool,
    pub clean_input: bool,
    pub clean_output: bool,
    /// Clean both input and output folders.
    pub clean: bool,
    pub keep: bool,
    pub move_only: bool,
    pub rename_only: bool,
    pub move_all: bool,
    pub rename_manual: bool,
    pub fail_forced_rename: bool,
    pub trial: bool,
    pub posix: bool,

    pub verbose: bool,
    pub quiet: bool,
    pub debug: bool,
    pub log_file: Option<PathBuf>,
    pub overwrite_log: bool,

    /// Overwrite anything in the way. Only honored on the command line.
    pub force: bool,
}

impl TagsortConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: TagsortConfig = serde_json::from_str(&content)?;
        tracing::info!("Loaded config file: {}", path.as_ref().display());
        Ok(config)
    }
}

/// `.tagsortrc` in the user's config directory, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tagsort").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Finds the config file for a run: `explicit` if given, else the first of
/// `folders` holding a `.tagsortrc`, else the user's config file.
pub fn discover<P: AsRef<Path>>(
    explicit: Option<&Path>,
    folders: &[P],
    user_config: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    folders
        .iter()
        .map(|folder| folder.as_ref().join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
        .or_else(|| user_config.filter(|path| path.is_file()))
}

/// Loads the discovered config file, or defaults when there is none.
pub fn load_config<P: AsRef<Path>>(
    explicit: Option<&Path>,
    folders: &[P],
) -> Result<TagsortConfig> {
    match discover(explicit, folders, user_config_path()) {
        Some(path) => TagsortConfig::load(path),
        None => Ok(TagsortConfig::default()),
    }
}
