//! Merges command line options with a config file into the settings for one
//! run.
//!
//! Both sources share the [`TagsortConfig`] shape. Switches are on when
//! either source sets them. Lists come from the command line when it has
//! any, otherwise from the file. Logging options from the file only apply
//! when the command line sets none.

use crate::commands::naming::NamingOptions;
use crate::commands::relocate::MoveOptions;
use crate::commands::scan::ScanOptions;
use crate::config::TagsortConfig;
use crate::error::{Result, TagsortError};
use crate::logging::LogConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub input_folders: Vec<PathBuf>,
    pub ignore_files: Vec<PathBuf>,
    pub recursive: bool,
    pub hidden: bool,
    pub output_folders: Vec<PathBuf>,
    pub group_files: Vec<PathBuf>,
    pub schema_files: Vec<PathBuf>,
    pub all_match_root: bool,
    /// Folders to strip of empty directories after the run.
    pub clean_folders: Vec<PathBuf>,
    pub keep: bool,
    pub move_only: bool,
    pub rename_only: bool,
    pub move_all: bool,
    pub rename_manual: bool,
    pub fail_forced_rename: bool,
    pub trial: bool,
    pub posix: bool,
    pub force: bool,
    pub log: LogConfig,
}

fn pick<T: Clone>(cli: &[T], file: &[T]) -> Vec<T> {
    if cli.is_empty() {
        file.to_vec()
    } else {
        cli.to_vec()
    }
}

/// Logging options are resolved separately so logging can start before the
/// rest of the settings are checked.
pub fn resolve_logging(cli: &TagsortConfig, file: &TagsortConfig) -> LogConfig {
    let source = if cli.verbose || cli.quiet || cli.debug {
        cli
    } else {
        file
    };
    let (log_file, overwrite) = match &cli.log_file {
        Some(path) => (Some(path.clone()), cli.overwrite_log),
        None => (
            file.log_file.clone(),
            cli.overwrite_log || file.overwrite_log,
        ),
    };
    LogConfig {
        level: LogConfig::level_from_flags(source.quiet, source.verbose, source.debug),
        log_file,
        overwrite,
    }
}

impl Settings {
    pub fn resolve(cli: &TagsortConfig, file: &TagsortConfig) -> Result<Self> {
        let mut settings = Settings {
            log: resolve_logging(cli, file),
            hidden: cli.hidden || file.hidden,
            recursive: cli.recursive || file.recursive,
            all_match_root: cli.all_match_root || file.all_match_root,
            keep: cli.keep || file.keep,
            move_only: cli.move_only || file.move_only,
            rename_only: cli.rename_only || file.rename_only,
            move_all: cli.move_all || file.move_all,
            rename_manual: cli.rename_manual || file.rename_manual,
            fail_forced_rename: cli.fail_forced_rename || file.fail_forced_rename,
            trial: cli.trial || file.trial,
            posix: cli.posix || file.posix,
            force: cli.force,
            ..Default::default()
        };

        if settings.move_only && settings.rename_only {
            tracing::warn!("Received both move-only and rename-only, files will be moved and renamed");
            settings.move_only = false;
            settings.rename_only = false;
        }
        if settings.move_all && settings.rename_only {
            tracing::warn!("Ignoring move-all while only renaming files");
        }
        if settings.rename_manual && settings.move_only {
            tracing::warn!("Ignoring rename-manual while only moving files");
        }

        settings.input_folders = pick(&cli.input_folders, &file.input_folders);
        let Some(first_input) = settings.input_folders.first().cloned() else {
            tracing::error!("No input folders specified");
            return Err(TagsortError::Config("no input folders specified".to_string()));
        };
        settings.ignore_files = pick(&cli.ignore_files, &file.ignore_files);

        settings.output_folders = if !cli.output_folders.is_empty() {
            if cli.organize {
                tracing::warn!("Both output folders and organize given on the command line, ignoring organize");
            }
            cli.output_folders.clone()
        } else if cli.organize || (file.organize && file.output_folders.is_empty()) {
            tracing::info!("Organizing files into: {}", first_input.display());
            vec![first_input]
        } else if !file.output_folders.is_empty() {
            if file.organize {
                tracing::warn!("Both output folders and organize given in the config file, ignoring organize");
            }
            file.output_folders.clone()
        } else if settings.rename_only {
            Vec::new()
        } else {
            tracing::error!("Neither output folders nor organize specified");
            return Err(TagsortError::Config(
                "neither output folders nor organize specified".to_string(),
            ));
        };

        settings.group_files = pick(&cli.group_files, &file.group_files);
        settings.schema_files = pick(&cli.schema_files, &file.schema_files);
        if settings.schema_files.is_empty() {
            tracing::error!("No schema specified");
            return Err(TagsortError::Config("no schema specified".to_string()));
        }

        let cli_cleans = cli.clean || cli.clean_input || cli.clean_output;
        let clean_input = cli.clean
            || cli.clean_input
            || (!cli_cleans && (file.clean || file.clean_input));
        let clean_output = cli.clean
            || cli.clean_output
            || (!cli_cleans && (file.clean || file.clean_output));
        if clean_input {
            settings.clean_folders.extend(settings.input_folders.iter().cloned());
        }
        if clean_output {
            settings.clean_folders.extend(settings.output_folders.iter().cloned());
        }

        if settings.keep
            && settings
                .input_folders
                .iter()
                .any(|input| settings.output_folders.contains(input))
        {
            tracing::warn!("Keeping originals while organizing in place would duplicate files, ignoring keep");
            settings.keep = false;
        }

        if settings.force {
            tracing::warn!("Clobbering files in destination, this is not safe");
        }
        if file.force {
            tracing::warn!("The force option has no effect in config files, set it on the command line");
        }

        Ok(settings)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            hidden: self.hidden,
        }
    }

    pub fn naming_options(&self) -> NamingOptions {
        NamingOptions {
            force_rename: self.rename_manual && !self.move_only,
            force_fail_on_bad: self.fail_forced_rename,
            clear_occurrences: false,
        }
    }

    pub fn move_options(&self) -> MoveOptions {
        MoveOptions {
            keep: self.keep,
            trial_run: self.trial,
            force: self.force,
            all_match_root: self.all_match_root,
            move_all: self.move_all && !self.rename_only,
            posix: self.posix,
            rename_only: self.rename_only,
        }
    }
}
