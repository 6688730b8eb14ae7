use crate::error::ChatArchiveError;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// A directory unpacked from one export archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFolder {
    pub name: String,
    pub path: PathBuf,
}

fn zip_entries(temp_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut zips = Vec::new();
    for entry in
        fs::read_dir(temp_dir).with_context(|| format!("failed to read {}", temp_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("zip") {
            zips.push(path);
        }
    }
    zips.sort();
    Ok(zips)
}

pub fn extract_archive(zip_path: &Path, into: &Path) -> Result<()> {
    let file =
        File::open(zip_path).with_context(|| format!("failed to open {}", zip_path.display()))?;
    let corrupt = |err: zip::result::ZipError| ChatArchiveError::CorruptArchive {
        path: zip_path.to_path_buf(),
        reason: err.to_string(),
    };
    let mut archive = zip::ZipArchive::new(file).map_err(corrupt)?;
    fs::create_dir_all(into).with_context(|| format!("failed to create {}", into.display()))?;
    archive.extract(into).map_err(corrupt)?;
    Ok(())
}

/// Unpack every zip in `temp_dir` beside itself, then delete the zips in a second pass.
pub fn extract_archives(temp_dir: &Path) -> Result<Vec<ChatFolder>> {
    let zips = zip_entries(temp_dir)?;
    let mut folders = Vec::with_capacity(zips.len());

    for zip_path in &zips {
        let Some(stem) = zip_path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let into = temp_dir.join(stem);
        tracing::debug!("extracting {} to {}", zip_path.display(), into.display());
        extract_archive(zip_path, &into)?;
        folders.push(ChatFolder {
            name: stem.to_string(),
            path: into,
        });
    }
    tracing::info!("extracted {} zip file(s)", folders.len());

    for zip_path in &zips {
        fs::remove_file(zip_path)
            .with_context(|| format!("failed to remove {}", zip_path.display()))?;
    }
    tracing::info!("removed zip files");

    Ok(folders)
}
