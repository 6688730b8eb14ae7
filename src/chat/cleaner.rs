use crate::chat::dates::RetentionWindow;
use crate::chat::ledger::{Ledger, LedgerMatch};
use crate::chat::outcome::FileOutcome;
use crate::chat::util::file_name_str;
use crate::chat::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptMarker {
    ProcessUntil(String),
    NotProcessed,
}

impl TranscriptMarker {
    pub fn from_match(found: &LedgerMatch) -> Self {
        match found.processed_until() {
            Some(cutoff) => Self::ProcessUntil(cutoff.to_string()),
            None => Self::NotProcessed,
        }
    }

    /// Marker line plus the blank separator line.
    pub fn header(&self) -> String {
        format!("{self}\n\n")
    }
}

impl fmt::Display for TranscriptMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcessUntil(cutoff) => write!(f, "PROCESS_UNTIL {cutoff}."),
            Self::NotProcessed => f.write_str("NOT_PROCESSED."),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub kept: usize,
    pub dropped: usize,
}

/// Write `marker` then every line of `reader` whose bracketed date is inside the window.
///
/// Lines without a date are always kept, so continuation lines of an expired
/// multi-line message survive. A dated line whose date is impossible fails the
/// whole transcript.
pub fn filter_transcript<R: BufRead, W: Write>(
    mut reader: R,
    writer: &mut W,
    marker: &TranscriptMarker,
    window: &RetentionWindow,
) -> Result<LineStats> {
    writer.write_all(marker.header().as_bytes())?;

    let mut stats = LineStats::default();
    let mut line = String::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;
        let expired = window
            .message_line_expired(&line)
            .with_context(|| format!("bad message date on line {line_no}"))?;
        if expired {
            stats.dropped += 1;
        } else {
            writer.write_all(line.as_bytes())?;
            stats.kept += 1;
        }
    }
    Ok(stats)
}

/// Rewrite `path` through a staged sibling file; the original is untouched on failure.
pub fn clean_transcript(
    path: &Path,
    marker: &TranscriptMarker,
    window: &RetentionWindow,
) -> Result<LineStats> {
    let parent = path
        .parent()
        .with_context(|| format!("{} has no parent directory", path.display()))?;
    let mut staged = tempfile::Builder::new()
        .prefix(".wachat-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("failed to stage a rewrite in {}", parent.display()))?;

    let input = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let stats = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let stats = filter_transcript(BufReader::new(input), &mut writer, marker, window)?;
        writer.flush()?;
        stats
    };

    let perms = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    fs::set_permissions(staged.path(), perms)?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(stats)
}

fn transcript_paths(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("txt")
        {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

fn parent_folder_name(path: &Path) -> &str {
    path.parent().map(file_name_str).unwrap_or("")
}

pub fn clean_transcripts(
    root: &Path,
    ledger: &Ledger,
    window: &RetentionWindow,
) -> Result<Vec<FileOutcome>> {
    let mut outcomes = Vec::new();
    for path in transcript_paths(root)? {
        let marker = TranscriptMarker::from_match(&ledger.lookup_folder(parent_folder_name(&path)));
        match clean_transcript(&path, &marker, window) {
            Ok(stats) => {
                tracing::debug!(
                    kept = stats.kept,
                    dropped = stats.dropped,
                    "cleaned {}",
                    file_name_str(&path)
                );
                outcomes.push(FileOutcome::Cleaned {
                    path,
                    kept_lines: stats.kept,
                    dropped_lines: stats.dropped,
                });
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn::emit(WarnEvent {
                    code: "CLEAN_FAILED",
                    stage: "clean",
                    action: "rewrite-transcript",
                    target: &path.display().to_string(),
                    reason: "original-left-untouched",
                    err: &reason,
                });
                outcomes.push(FileOutcome::Skipped { path, reason });
            }
        }
    }
    tracing::info!("cleaned txt files");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn window() -> RetentionWindow {
        let now = NaiveDate::from_ymd_opt(2024, 7, 16)
            .expect("date")
            .and_hms_opt(9, 0, 0)
            .expect("time");
        RetentionWindow::new(now, 45)
    }

    fn run(input: &str, marker: &TranscriptMarker) -> (String, LineStats) {
        let mut out = Vec::new();
        let stats =
            filter_transcript(input.as_bytes(), &mut out, marker, &window()).expect("filter");
        (String::from_utf8(out).expect("utf8"), stats)
    }

    #[test]
    fn markers_render_exactly() {
        assert_eq!(
            TranscriptMarker::ProcessUntil("2024-06-01".to_string()).header(),
            "PROCESS_UNTIL 2024-06-01.\n\n"
        );
        assert_eq!(TranscriptMarker::NotProcessed.header(), "NOT_PROCESSED.\n\n");
    }

    #[test]
    fn marker_follows_ledger_cutoff() {
        let hit = LedgerMatch {
            found: true,
            cutoff: Some("2024-06-01".to_string()),
        };
        assert_eq!(
            TranscriptMarker::from_match(&hit),
            TranscriptMarker::ProcessUntil("2024-06-01".to_string())
        );
        let no_cutoff = LedgerMatch {
            found: true,
            cutoff: None,
        };
        assert_eq!(
            TranscriptMarker::from_match(&no_cutoff),
            TranscriptMarker::NotProcessed
        );
    }

    #[test]
    fn old_dated_lines_are_dropped() {
        let input = "[1/2/24, 5:46:42 PM] Alice: hi\n[7/10/24, 8:00:00 AM] Bob: recent\n";
        let marker = TranscriptMarker::ProcessUntil("2024-06-01".to_string());
        let (out, stats) = run(input, &marker);
        assert_eq!(
            out,
            "PROCESS_UNTIL 2024-06-01.\n\n[7/10/24, 8:00:00 AM] Bob: recent\n"
        );
        assert_eq!(stats, LineStats { kept: 1, dropped: 1 });
    }

    #[test]
    fn continuation_lines_of_old_messages_are_retained() {
        let input = "[1/2/24, 5:46:42 PM] Alice: first line\nsecond line\n\nno newline at end";
        let (out, stats) = run(input, &TranscriptMarker::NotProcessed);
        assert_eq!(out, "NOT_PROCESSED.\n\nsecond line\n\nno newline at end");
        assert_eq!(stats, LineStats { kept: 3, dropped: 1 });
    }

    #[test]
    fn impossible_date_fails_the_transcript() {
        let mut out = Vec::new();
        let err = filter_transcript(
            "[13/45/24, 1:00] x\n".as_bytes(),
            &mut out,
            &TranscriptMarker::NotProcessed,
            &window(),
        )
        .expect_err("bad date");
        assert!(format!("{err:#}").contains("line 1"));
    }

    #[test]
    fn failed_rewrite_leaves_original_and_no_side_file() {
        let tmp = tempdir().expect("tempdir");
        let chat = tmp.path().join("WhatsApp Chat - Ann");
        fs::create_dir_all(&chat).expect("mkdir");
        let good = chat.join("good.txt");
        let bad = chat.join("bad.txt");
        fs::write(&good, "[1/2/24, 1:00] old\n[7/15/24, 1:00] new\n").expect("write good");
        fs::write(&bad, b"[7/15/24, 1:00] \xff\xfe broken\n").expect("write bad");

        let ledger = Ledger::default();
        let outcomes = clean_transcripts(tmp.path(), &ledger, &window()).expect("clean");
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().any(FileOutcome::is_skipped));

        assert_eq!(
            fs::read(&bad).expect("read bad"),
            b"[7/15/24, 1:00] \xff\xfe broken\n"
        );
        assert_eq!(
            fs::read_to_string(&good).expect("read good"),
            "NOT_PROCESSED.\n\n[7/15/24, 1:00] new\n"
        );
        let leftovers = fs::read_dir(&chat)
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn ledger_cutoff_is_looked_up_by_parent_folder() {
        let tmp = tempdir().expect("tempdir");
        let chat = tmp.path().join("WhatsApp Chat - +15551234567");
        fs::create_dir_all(&chat).expect("mkdir");
        fs::write(chat.join("_chat.txt"), "hello\n").expect("write");

        let ledger = Ledger::from_reader("Phone,Until\n15551234567,2024-06-01\n".as_bytes())
            .expect("ledger");
        clean_transcripts(tmp.path(), &ledger, &window()).expect("clean");
        assert_eq!(
            fs::read_to_string(chat.join("_chat.txt")).expect("read"),
            "PROCESS_UNTIL 2024-06-01.\n\nhello\n"
        );
    }
}
