use anyhow::Result;
use std::path::PathBuf;

use crate::chat::config::load_config;
use crate::chat::paths::resolve_paths;
use crate::chat::transcribe::{self, TranscriptionResult};
use crate::commands::CommandReport;

#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    pub dir: Option<PathBuf>,
    pub model: Option<String>,
}

pub fn run(opts: &TranscribeOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut config = load_config()?;
    if let Some(model) = opts.model.as_deref().filter(|m| !m.trim().is_empty()) {
        config.transcribe.model = model.trim().to_string();
    }

    let base = opts
        .dir
        .clone()
        .unwrap_or_else(|| paths.dest_base_dir.clone());
    let mut report = CommandReport::new("transcribe");
    report.detail(format!("dir={}", base.display()));
    report.detail(format!("model={}", config.transcribe.model));

    if !base.is_dir() {
        tracing::info!("nothing to transcribe under {}", base.display());
        report.detail(format!("the directory {} does not exist", base.display()));
        return Ok(report);
    }

    let summary = transcribe::process_directories(&base, &paths.whisper_bin, &config.transcribe)?;
    report.detail(format!("chats={}", summary.chats.len()));
    report.detail(format!("saved={}", summary.saved()));
    report.detail(format!("failed={}", summary.failed()));
    for result in &summary.results {
        match result {
            TranscriptionResult::Saved { transcript, .. } => {
                report.detail(format!("transcript={}", transcript.display()));
            }
            TranscriptionResult::Failed { audio, reason } => {
                report.detail(format!("failed={} reason={reason}", audio.display()));
            }
        }
    }
    Ok(report)
}
