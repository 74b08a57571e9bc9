use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_empty_dir(path: &Path) -> std::io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Removes empty directories below `folder`, deepest first. The folder
/// itself is kept.
pub fn clean_folder<P: AsRef<Path>>(folder: P, trial_run: bool) -> Result<CmdResult> {
    let folder = folder.as_ref();
    let mut removed: Vec<PathBuf> = Vec::new();
    let mut failures = 0;

    for entry in WalkDir::new(folder).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Could not clean directory: {}", err);
                failures += 1;
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let outcome = is_empty_dir(path).and_then(|empty| {
            if !empty {
                tracing::info!("Skipping cleaning non-empty directory at: {}", path.display());
                return Ok(false);
            }
            tracing::info!("Cleaning (deleting) folder at {}", path.display());
            if !trial_run {
                fs::remove_dir(path)?;
            }
            Ok(true)
        });
        match outcome {
            Ok(true) => removed.push(path.to_path_buf()),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!("Could not clean directory at {}: {}", path.display(), err);
                failures += 1;
            }
        }
    }

    let mut result = CmdResult::default();
    let verb = if trial_run { "Would remove" } else { "Removed" };
    result.add_message(CmdMessage::info(format!(
        "{} {} empty folder(s) in {}",
        verb,
        removed.len(),
        folder.display()
    )));
    if failures > 0 {
        result.add_message(CmdMessage::error(format!(
            "Could not clean {} folder(s) in {}",
            failures,
            folder.display()
        )));
    }
    Ok(result.with_removed_dirs(removed))
}
