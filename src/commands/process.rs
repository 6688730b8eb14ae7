use anyhow::Result;
use std::path::PathBuf;

use crate::chat::config::load_config;
use crate::chat::dates::RetentionWindow;
use crate::chat::ledger::Ledger;
use crate::chat::paths::{monthly_destination, resolve_paths};
use crate::chat::pipeline::{self, RunContext};
use crate::commands::CommandReport;
use crate::error::ChatArchiveError;

#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub days: Option<u64>,
    pub ledger: Option<PathBuf>,
}

pub fn run(opts: &ProcessOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut config = load_config()?;
    if let Some(days) = opts.days {
        if days == 0 {
            return Err(ChatArchiveError::InvalidConfig("--days must be >= 1".to_string()).into());
        }
        config.retention.days = days;
    }

    let source = opts.source.clone().unwrap_or_else(|| paths.source_dir.clone());
    if !source.is_dir() {
        return Err(ChatArchiveError::SourceDirMissing(source).into());
    }
    let destination = opts
        .destination
        .clone()
        .unwrap_or_else(|| monthly_destination(&paths));
    let ledger_file = opts.ledger.clone().unwrap_or_else(|| paths.ledger_file.clone());

    let mut report = CommandReport::new("process");
    report.detail(format!("source={}", source.display()));
    report.detail(format!("destination={}", destination.display()));
    report.detail(format!("ledger={}", ledger_file.display()));

    let window = RetentionWindow::from_local_now(config.retention.days);
    report.detail(format!("retention_days={}", window.days));
    report.detail(format!("retention_cutoff={}", window.cutoff.format("%Y-%m-%d %H:%M:%S")));

    let ledger = Ledger::load_or_empty(&ledger_file);
    report.detail(format!("ledger_rows={}", ledger.row_count()));

    let ctx = RunContext {
        source,
        destination,
        window,
        config,
    };
    let outcome = pipeline::run(&ctx, &ledger, &paths)?;

    report.detail(format!("temp_dir={}", outcome.temp_dir.display()));
    if outcome.nothing_to_do {
        report.detail("no matching zip files found; nothing to do");
        return Ok(report);
    }

    for entry in &outcome.collected {
        report.detail(format!(
            "collected={} at={} from={}",
            entry.file_name,
            entry.collected_path.display(),
            entry.source_path.display()
        ));
    }
    for folder in &outcome.folders {
        report.detail(format!("extracted={} into={}", folder.name, folder.path.display()));
    }
    for file in outcome.cleaned.iter().chain(outcome.swept.iter()) {
        report.detail(file.to_string());
    }
    for folder in &outcome.relocated {
        report.detail(format!("relocated={}", folder.display()));
    }
    report.detail(format!("skipped={}", outcome.skipped().count()));

    Ok(report)
}
