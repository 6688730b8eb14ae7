use crate::chat::config::TranscribeConfig;
use crate::chat::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionResult {
    Saved { audio: PathBuf, transcript: PathBuf },
    Failed { audio: PathBuf, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct TranscribeSummary {
    pub chats: Vec<PathBuf>,
    pub results: Vec<TranscriptionResult>,
}

impl TranscribeSummary {
    pub fn saved(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, TranscriptionResult::Saved { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.saved()
    }
}

pub fn resolve_whisper_bin(bin: &Path) -> Result<PathBuf> {
    if bin.exists() {
        return Ok(bin.to_path_buf());
    }
    let found = which::which("whisper").context("whisper binary not found in WHISPER_BIN or PATH")?;
    Ok(found)
}

/// Direct children of `base` that are directories named like `WhatsApp Chat - ...`.
pub fn chat_directories(base: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(base).with_context(|| format!("failed to read {}", base.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

pub fn audio_files(chat_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in
        fs::read_dir(chat_dir).with_context(|| format!("failed to read {}", chat_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("opus") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Run whisper on one audio file; the transcript lands beside it as `<stem>.txt`.
pub fn transcribe_file(bin: &Path, audio: &Path, cfg: &TranscribeConfig) -> Result<PathBuf> {
    let out_dir = audio
        .parent()
        .with_context(|| format!("{} has no parent directory", audio.display()))?;
    let output = Command::new(bin)
        .arg(audio)
        .arg("--model")
        .arg(&cfg.model)
        .arg("--language")
        .arg(&cfg.language)
        .arg("--output_format")
        .arg("txt")
        .arg("--output_dir")
        .arg(out_dir)
        .output()
        .with_context(|| format!("failed to run `{}`", bin.display()))?;

    if !output.status.success() {
        anyhow::bail!(
            "whisper failed for {}\nstdout: {}\nstderr: {}",
            audio.display(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let transcript = audio.with_extension("txt");
    if !transcript.is_file() {
        anyhow::bail!("whisper produced no transcript at {}", transcript.display());
    }
    Ok(transcript)
}

pub fn process_directories(
    base: &Path,
    whisper_bin: &Path,
    cfg: &TranscribeConfig,
) -> Result<TranscribeSummary> {
    let bin = resolve_whisper_bin(whisper_bin)?;
    let chats = chat_directories(base, &cfg.chat_dir_prefix)?;
    tracing::info!("found {} chat directories", chats.len());
    tracing::info!("using whisper model {}", cfg.model);

    let mut results = Vec::new();
    for chat in &chats {
        let audios = audio_files(chat)?;
        if audios.is_empty() {
            tracing::info!("no audio files found in {}", chat.display());
            continue;
        }
        for audio in audios {
            match transcribe_file(&bin, &audio, cfg) {
                Ok(transcript) => {
                    tracing::info!("transcription saved to {}", transcript.display());
                    results.push(TranscriptionResult::Saved { audio, transcript });
                }
                Err(err) => {
                    let reason = format!("{err:#}");
                    warn::emit(WarnEvent {
                        code: "TRANSCRIBE_FAILED",
                        stage: "transcribe",
                        action: "whisper",
                        target: &audio.display().to_string(),
                        reason: "no-transcript-saved",
                        err: &reason,
                    });
                    results.push(TranscriptionResult::Failed { audio, reason });
                }
            }
        }
    }

    Ok(TranscribeSummary { chats, results })
}
