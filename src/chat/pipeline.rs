use crate::chat::audit;
use crate::chat::cleaner::clean_transcripts;
use crate::chat::collector::{ArchiveEntry, CollectOutcome, collect_archives, create_temp_dir};
use crate::chat::config::ChatConfig;
use crate::chat::dates::RetentionWindow;
use crate::chat::extractor::{ChatFolder, extract_archives};
use crate::chat::ledger::Ledger;
use crate::chat::outcome::FileOutcome;
use crate::chat::paths::ChatPaths;
use crate::chat::relocator::relocate;
use crate::chat::sweeper::sweep_files;
use crate::error::ChatArchiveError;
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect,
    Extract,
    Clean,
    Sweep,
    Relocate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Extract => "extract",
            Self::Clean => "clean",
            Self::Sweep => "sweep",
            Self::Relocate => "relocate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub window: RetentionWindow,
    pub config: ChatConfig,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub temp_dir: PathBuf,
    pub nothing_to_do: bool,
    pub collected: Vec<ArchiveEntry>,
    pub folders: Vec<ChatFolder>,
    pub cleaned: Vec<FileOutcome>,
    pub swept: Vec<FileOutcome>,
    pub relocated: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.cleaned
            .iter()
            .chain(self.swept.iter())
            .filter(|o| o.is_skipped())
    }
}

fn record(paths: &ChatPaths, stage: Stage, status: &str, message: &str) {
    if let Err(err) = audit::append_event(paths, stage.as_str(), status, message) {
        tracing::warn!("audit append failed for stage {}: {err:#}", stage.as_str());
    }
}

fn run_stage<T>(
    paths: &ChatPaths,
    stage: Stage,
    work: impl FnOnce() -> Result<T>,
    summarize: impl FnOnce(&T) -> String,
) -> Result<T> {
    match work() {
        Ok(value) => {
            record(paths, stage, "ok", &summarize(&value));
            Ok(value)
        }
        Err(err) => {
            record(paths, stage, "failed", &format!("{err:#}"));
            Err(err)
        }
    }
}

fn count_where(outcomes: &[FileOutcome], pred: impl Fn(&FileOutcome) -> bool) -> usize {
    outcomes.iter().filter(|o| pred(*o)).count()
}

/// Collect, extract, clean, sweep and relocate in that order.
///
/// A failing stage aborts the run and leaves the temp folder behind for inspection;
/// per-file failures inside clean and sweep are reported as `FileOutcome::Skipped`.
pub fn run(ctx: &RunContext, ledger: &Ledger, paths: &ChatPaths) -> Result<PipelineReport> {
    if !ctx.source.is_dir() {
        return Err(ChatArchiveError::SourceDirMissing(ctx.source.clone()).into());
    }

    let temp_dir = create_temp_dir(&ctx.source, &ctx.config.collector.temp_folder_name)?;
    let mut report = PipelineReport {
        temp_dir: temp_dir.clone(),
        ..PipelineReport::default()
    };

    let collected = run_stage(
        paths,
        Stage::Collect,
        || collect_archives(&ctx.source, &temp_dir, &ctx.config.collector.keywords),
        |outcome| match outcome {
            CollectOutcome::NothingToDo => "no matching archives".to_string(),
            CollectOutcome::Collected(entries) => format!("moved {} archive(s)", entries.len()),
        },
    )?;
    match collected {
        CollectOutcome::NothingToDo => {
            report.nothing_to_do = true;
            return Ok(report);
        }
        CollectOutcome::Collected(entries) => report.collected = entries,
    }

    report.folders = run_stage(
        paths,
        Stage::Extract,
        || extract_archives(&temp_dir),
        |folders| format!("extracted {} folder(s)", folders.len()),
    )?;

    report.cleaned = run_stage(
        paths,
        Stage::Clean,
        || clean_transcripts(&temp_dir, ledger, &ctx.window),
        |outcomes| {
            format!(
                "cleaned={} skipped={}",
                count_where(outcomes, |o| matches!(o, FileOutcome::Cleaned { .. })),
                count_where(outcomes, FileOutcome::is_skipped)
            )
        },
    )?;

    report.swept = run_stage(
        paths,
        Stage::Sweep,
        || sweep_files(&temp_dir, ledger, &ctx.window, &ctx.config.sweeper),
        |outcomes| {
            format!(
                "deleted={} marked={} kept={}",
                count_where(outcomes, |o| matches!(o, FileOutcome::Deleted { .. })),
                count_where(outcomes, |o| matches!(o, FileOutcome::MarkedProcessed { .. })),
                count_where(outcomes, |o| matches!(o, FileOutcome::Kept { .. }))
            )
        },
    )?;

    report.relocated = run_stage(
        paths,
        Stage::Relocate,
        || relocate(&temp_dir, &ctx.destination),
        |moved| format!("moved {} folder(s) to {}", moved.len(), ctx.destination.display()),
    )?;

    Ok(report)
}
