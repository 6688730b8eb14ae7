use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub source_path: PathBuf,
    pub collected_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    /// No matching archives; the temp folder has already been removed.
    NothingToDo,
    Collected(Vec<ArchiveEntry>),
}

pub fn create_temp_dir(source: &Path, name: &str) -> Result<PathBuf> {
    let temp_dir = source.join(name);
    tracing::info!("creating temporary folder at {}", temp_dir.display());
    fs::create_dir_all(&temp_dir)
        .with_context(|| format!("failed to create {}", temp_dir.display()))?;
    Ok(temp_dir)
}

pub fn is_chat_archive(file_name: &str, keywords: &[String]) -> bool {
    file_name.ends_with(".zip")
        && keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| file_name.contains(k.as_str()))
}

/// Top-level `.zip` files of `source` whose names carry a keyword, sorted by name.
pub fn scan_archives(source: &Path, keywords: &[String]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let read_dir =
        fs::read_dir(source).with_context(|| format!("failed to read {}", source.display()))?;
    for entry in read_dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };
        if is_chat_archive(&name, keywords) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

pub fn collect_archives(
    source: &Path,
    temp_dir: &Path,
    keywords: &[String],
) -> Result<CollectOutcome> {
    let names = scan_archives(source, keywords)?;

    if names.is_empty() {
        tracing::info!("no matching zip files found to move");
        fs::remove_dir(temp_dir)
            .with_context(|| format!("failed to remove {}", temp_dir.display()))?;
        return Ok(CollectOutcome::NothingToDo);
    }

    let mut moved = Vec::with_capacity(names.len());
    for file_name in names {
        let source_path = source.join(&file_name);
        let collected_path = temp_dir.join(&file_name);
        // temp_dir lives inside source, so a plain rename never crosses devices
        fs::rename(&source_path, &collected_path).with_context(|| {
            format!(
                "failed to move {} to {}",
                source_path.display(),
                collected_path.display()
            )
        })?;
        moved.push(ArchiveEntry {
            file_name,
            source_path,
            collected_path,
        });
    }

    tracing::info!("moved {} zip file(s)", moved.len());
    Ok(CollectOutcome::Collected(moved))
}
