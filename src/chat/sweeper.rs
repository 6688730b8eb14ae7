use crate::chat::config::SweeperConfig;
use crate::chat::dates::{RetentionWindow, filename_date, precedes_cutoff};
use crate::chat::ledger::Ledger;
use crate::chat::outcome::{DeleteReason, FileOutcome};
use crate::chat::util::file_name_str;
use crate::chat::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepDecision {
    Delete(DeleteReason),
    MarkProcessed,
    Keep,
    /// The ledger cutoff could not be compared; the file is left as is.
    KeepUnmarked(String),
}

fn has_kept_extension(file_name: &str, keep_extensions: &[String]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| keep_extensions.iter().any(|k| k.trim_start_matches('.') == ext))
}

pub fn decide(
    file_name: &str,
    ledger_cutoff: Option<&str>,
    window: &RetentionWindow,
    keep_extensions: &[String],
) -> SweepDecision {
    if window.filename_expired(file_name) {
        return SweepDecision::Delete(DeleteReason::Expired);
    }
    if !has_kept_extension(file_name, keep_extensions) {
        return SweepDecision::Delete(DeleteReason::UnwantedExtension);
    }

    let (Some(cutoff), Some(file_date)) = (ledger_cutoff, filename_date(file_name)) else {
        return SweepDecision::Keep;
    };
    match precedes_cutoff(file_date, cutoff) {
        Ok(true) => SweepDecision::MarkProcessed,
        Ok(false) => SweepDecision::Keep,
        Err(err) => SweepDecision::KeepUnmarked(err.to_string()),
    }
}

fn all_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// Delete expired or unwanted files under `root` and prefix files the ledger already covers.
pub fn sweep_files(
    root: &Path,
    ledger: &Ledger,
    window: &RetentionWindow,
    config: &SweeperConfig,
) -> Result<Vec<FileOutcome>> {
    let mut outcomes = Vec::new();

    for path in all_files(root)? {
        let file_name = file_name_str(&path).to_string();
        let folder = path.parent().map(file_name_str).unwrap_or("");
        let found = ledger.lookup_folder(folder);

        match decide(
            &file_name,
            found.processed_until(),
            window,
            &config.keep_extensions,
        ) {
            SweepDecision::Delete(reason) => {
                fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
                outcomes.push(FileOutcome::Deleted { path, reason });
            }
            SweepDecision::MarkProcessed => {
                let renamed = path.with_file_name(format!("{}{file_name}", config.processed_prefix));
                fs::rename(&path, &renamed).with_context(|| {
                    format!("failed to rename {} to {}", path.display(), renamed.display())
                })?;
                outcomes.push(FileOutcome::MarkedProcessed {
                    from: path,
                    to: renamed,
                });
            }
            SweepDecision::Keep => outcomes.push(FileOutcome::Kept { path }),
            SweepDecision::KeepUnmarked(reason) => {
                warn::emit(WarnEvent {
                    code: "CUTOFF_COMPARE_FAILED",
                    stage: "sweep",
                    action: "compare-ledger-cutoff",
                    target: &path.display().to_string(),
                    reason: "treated-as-not-processed",
                    err: &reason,
                });
                outcomes.push(FileOutcome::Skipped { path, reason });
            }
        }
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn window() -> RetentionWindow {
        let now = NaiveDate::from_ymd_opt(2025, 1, 20)
            .expect("date")
            .and_hms_opt(10, 0, 0)
            .expect("time");
        RetentionWindow::new(now, 45)
    }

    fn keep() -> Vec<String> {
        SweeperConfig::default().keep_extensions
    }

    #[test]
    fn expired_filename_is_deleted_even_with_a_ledger_cutoff() {
        assert_eq!(
            decide("chat_2023-01-01.txt", Some("2024-06-01"), &window(), &keep()),
            SweepDecision::Delete(DeleteReason::Expired)
        );
    }

    #[test]
    fn recent_files_with_approved_extension_survive() {
        assert_eq!(
            decide("chat_2025-01-01.txt", None, &window(), &keep()),
            SweepDecision::Keep
        );
        assert_eq!(
            decide("00000003-AUDIO-2025-01-10-12-00-00.opus", Some("2024-06-01"), &window(), &keep()),
            SweepDecision::Keep
        );
        assert_eq!(decide("_chat.txt", Some("2030-01-01"), &window(), &keep()), SweepDecision::Keep);
    }

    #[test]
    fn media_outside_the_allow_list_is_deleted() {
        assert_eq!(
            decide("00000004-PHOTO-2025-01-10.jpg", None, &window(), &keep()),
            SweepDecision::Delete(DeleteReason::UnwantedExtension)
        );
        assert_eq!(
            decide("README", None, &window(), &keep()),
            SweepDecision::Delete(DeleteReason::UnwantedExtension)
        );
    }

    #[test]
    fn in_window_file_before_cutoff_is_marked() {
        assert_eq!(
            decide("chat_2025-01-01.txt", Some("2025-01-15"), &window(), &keep()),
            SweepDecision::MarkProcessed
        );
    }

    #[test]
    fn unparsable_cutoff_keeps_file_unmarked() {
        assert!(matches!(
            decide("chat_2025-01-01.txt", Some("mid January"), &window(), &keep()),
            SweepDecision::KeepUnmarked(_)
        ));
    }

    #[test]
    fn sweep_applies_decisions_per_parent_folder() {
        let tmp = tempdir().expect("tempdir");
        let ann = tmp.path().join("WhatsApp Chat - Ann");
        let bo = tmp.path().join("WhatsApp Chat - Bo");
        fs::create_dir_all(&ann).expect("mkdir ann");
        fs::create_dir_all(&bo).expect("mkdir bo");
        fs::write(ann.join("chat_2023-01-01.txt"), "old").expect("write");
        fs::write(ann.join("chat_2025-01-01.txt"), "recent").expect("write");
        fs::write(ann.join("photo_2025-01-05.jpg"), "img").expect("write");
        fs::write(bo.join("chat_2025-01-01.txt"), "recent").expect("write");

        let ledger =
            Ledger::from_reader("Name,Until\nAnn,2025-01-15\n".as_bytes()).expect("ledger");
        let outcomes = sweep_files(tmp.path(), &ledger, &window(), &SweeperConfig::default())
            .expect("sweep");

        assert!(!ann.join("chat_2023-01-01.txt").exists());
        assert!(!ann.join("photo_2025-01-05.jpg").exists());
        assert!(ann.join("PROCESSED_chat_2025-01-01.txt").is_file());
        assert!(bo.join("chat_2025-01-01.txt").is_file());
        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, FileOutcome::Deleted { .. }))
                .count(),
            2
        );
    }
}
