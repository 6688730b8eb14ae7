use crate::chat::util::move_path;
use crate::error::ChatArchiveError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn ensure_destination(dest: &Path) -> Result<()> {
    if !dest.is_dir() {
        tracing::info!("creating destination folder at {}", dest.display());
        fs::create_dir_all(dest).with_context(|| format!("failed to create {}", dest.display()))?;
    }
    Ok(())
}

/// Move every top-level entry of `temp_dir` into `dest`, then drop the (now empty) temp folder.
pub fn relocate(temp_dir: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    ensure_destination(dest)?;

    let mut entries = Vec::new();
    for entry in
        fs::read_dir(temp_dir).with_context(|| format!("failed to read {}", temp_dir.display()))?
    {
        entries.push(entry?.path());
    }
    entries.sort();

    let mut moved = Vec::with_capacity(entries.len());
    for from in entries {
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = dest.join(name);
        if to.exists() {
            return Err(ChatArchiveError::DestinationConflict(to).into());
        }
        move_path(&from, &to)?;
        moved.push(to);
    }
    tracing::info!("moved {} folder(s) to {}", moved.len(), dest.display());

    fs::remove_dir(temp_dir)
        .with_context(|| format!("failed to remove {}", temp_dir.display()))?;
    Ok(moved)
}
