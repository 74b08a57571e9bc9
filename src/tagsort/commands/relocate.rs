//! Copies or moves files to their computed locations.
//!
//! Each file lands at `<output folder>/<destination_path>/<output_name>` in
//! every output folder. The original is removed once at least one copy was
//! written, unless originals are kept. Nothing is ever overwritten without
//! `force`, and a trial run only logs what would happen.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TagsortError};
use crate::model::FileRecord;
use std::fs;
use std::path::{Component, Path, PathBuf};

const WINDOWS_RESERVED: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOptions {
    /// Copy instead of move.
    pub keep: bool,
    /// Only log, touch nothing.
    pub trial_run: bool,
    /// Overwrite files and folders in the way.
    pub force: bool,
    /// Place files matching no movement filter at the output root.
    pub all_match_root: bool,
    /// Move files even when they could not be renamed.
    pub move_all: bool,
    /// Skip the Windows file name checks.
    pub posix: bool,
    /// Rename files where they are instead of moving them.
    pub rename_only: bool,
}

/// Problems a Windows file system would have with `name` at `full_path`.
pub fn check_windows_compat(name: &str, full_path: &Path) -> Vec<String> {
    let mut issues = Vec::new();
    let path = full_path.to_string_lossy();
    // Drive prefixes such as `C:` are legitimate.
    let checked = match path.as_bytes() {
        [drive, b':', ..] if drive.is_ascii_alphabetic() && cfg!(windows) => &path[2..],
        _ => &path[..],
    };
    if checked.contains(&WINDOWS_RESERVED[..]) {
        issues.push(format!(
            "Unsafe file name/path: {}. Windows cannot tolerate the characters <>:\"|?*",
            path
        ));
    }
    if name.contains('\\') {
        issues.push(format!(
            "Unsafe file name: {}. Windows cannot tolerate \\ in file names",
            name
        ));
    }
    if name.ends_with('.') || name.ends_with(' ') {
        issues.push(format!(
            "Unsafe file name: {}. Windows cannot tolerate names ending in a space or a period",
            name
        ));
    }
    for issue in &issues {
        tracing::warn!("{}. Use --posix to silence Windows-specific warnings.", issue);
    }
    issues
}

/// Fails if an output folder location is taken by a regular file, unless
/// forced, in which case the file is removed.
pub fn check_output_location<P: AsRef<Path>>(folders: &[P], options: &MoveOptions) -> Result<()> {
    for folder in folders {
        let folder = folder.as_ref();
        if !folder.is_file() {
            continue;
        }
        if !options.force {
            tracing::error!("Aborting due to bad output folder location: {}", folder.display());
            return Err(TagsortError::Config(format!(
                "a file exists at the output folder location: {}",
                folder.display()
            )));
        }
        tracing::warn!("Overwriting file at: {}", folder.display());
        if !options.trial_run {
            fs::remove_file(folder)?;
        }
    }
    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Clears whatever sits at `target`. Returns false when the file must be
/// skipped.
fn make_room(target: &Path, options: &MoveOptions) -> bool {
    if !target.exists() {
        return true;
    }
    if !options.force {
        tracing::warn!("Skipping to avoid clobbering: {}", target.display());
        return false;
    }
    if target.is_dir() {
        tracing::warn!("Overwriting directory with file: {}", target.display());
        if !options.trial_run {
            if let Err(err) = fs::remove_dir_all(target) {
                tracing::error!("Error removing directory at {}: {}", target.display(), err);
                return false;
            }
        }
    } else {
        tracing::warn!("Overwriting file: {}", target.display());
    }
    true
}

/// Whether `file` would land inside `out_folder`: a relative destination
/// without `..` and an output name that is a single path component.
fn stays_inside(out_folder: &Path, file: &FileRecord) -> bool {
    let destination_ok = file
        .destination_path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    let mut name = Path::new(&file.output_name).components();
    let name_ok = !file.output_name.contains('/')
        && matches!((name.next(), name.next()), (Some(Component::Normal(_)), None));
    destination_ok
        && name_ok
        && out_folder
            .join(&file.destination_path)
            .join(&file.output_name)
            .starts_with(out_folder)
}

/// Copies `file` below `out_folder`. Returns the target path when a copy was
/// written, or would have been on a trial run.
pub fn move_file_to_folder(
    out_folder: &Path,
    file: &FileRecord,
    options: &MoveOptions,
) -> Result<Option<PathBuf>> {
    if !stays_inside(out_folder, file) {
        tracing::error!(
            "Refusing to write {} outside of {}: destination \"{}\", name \"{}\"",
            file.raw_name,
            out_folder.display(),
            file.destination_path.display(),
            file.output_name
        );
        return Ok(None);
    }
    let out_dir = out_folder.join(&file.destination_path);
    let target = out_dir.join(&file.output_name);

    if !options.posix {
        check_windows_compat(&file.output_name, &target);
    }

    if is_same_file(&target, &file.original_location) {
        tracing::info!(
            "Skipping moving file onto itself at: {}",
            file.original_location.display()
        );
        return Ok(None);
    }
    tracing::info!(
        "Moving/renaming file from {} to {}",
        file.original_location.display(),
        target.display()
    );

    if !out_dir.exists() {
        tracing::info!("Creating destination folder: {}", out_dir.display());
        if !options.trial_run {
            fs::create_dir_all(&out_dir)?;
        }
    }

    if !make_room(&target, options) {
        return Ok(None);
    }

    if !options.trial_run {
        if let Err(err) = fs::copy(&file.original_location, &target) {
            tracing::error!("Error copying file to {}: {}", target.display(), err);
            return Ok(None);
        }
    }
    Ok(Some(target))
}

/// Whether `file` should be placed at all.
fn should_move(file: &FileRecord, options: &MoveOptions) -> bool {
    if file.move_failed && !options.all_match_root && !options.rename_only {
        tracing::warn!(
            "Skipping file, as it failed to match any movement schema: {}",
            file.raw_name
        );
        return false;
    }
    if file.rename_failed && !options.move_all {
        tracing::warn!("Skipping file as it could not be renamed: {}", file.raw_name);
        return false;
    }
    true
}

pub fn move_files<P: AsRef<Path>>(
    files: &[FileRecord],
    output_folders: &[P],
    options: &MoveOptions,
) -> Result<CmdResult> {
    if !options.rename_only {
        check_output_location(output_folders, options)?;
    }

    let mut written = Vec::new();
    let mut skipped = 0;
    let mut removed = 0;
    for file in files {
        if !should_move(file, options) {
            skipped += 1;
            continue;
        }

        let mut moved = false;
        if options.rename_only {
            let mut in_place = file.clone();
            in_place.destination_path = PathBuf::new();
            let folder = file
                .original_location
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            if let Some(target) = move_file_to_folder(&folder, &in_place, options)? {
                written.push(target);
                moved = true;
            }
        } else {
            for folder in output_folders {
                if let Some(target) = move_file_to_folder(folder.as_ref(), file, options)? {
                    written.push(target);
                    moved = true;
                }
            }
        }

        if moved && !options.keep {
            tracing::info!("Removing original file at: {}", file.original_location.display());
            if !options.trial_run {
                fs::remove_file(&file.original_location)?;
            }
            removed += 1;
        }
    }

    let mut result = CmdResult::default();
    let verb = if options.trial_run { "Would write" } else { "Wrote" };
    result.add_message(CmdMessage::success(format!("{} {} file(s)", verb, written.len())));
    if removed > 0 {
        let verb = if options.trial_run { "Would remove" } else { "Removed" };
        result.add_message(CmdMessage::info(format!("{} {} original(s)", verb, removed)));
    }
    if skipped > 0 {
        result.add_message(CmdMessage::warning(format!("Skipped {} file(s)", skipped)));
    }
    Ok(result.with_files(files.to_vec()).with_written_paths(written))
}
