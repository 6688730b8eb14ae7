use crate::chat::paths::resolve_wachat_home;
use crate::error::ChatArchiveError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub days: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { days: 20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub keywords: Vec<String>,
    pub temp_folder_name: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            keywords: vec!["WhatsApp".to_string(), "Chat".to_string()],
            temp_folder_name: "temp_folder".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    pub keep_extensions: Vec<String>,
    pub processed_prefix: String,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            keep_extensions: vec!["txt".to_string(), "opus".to_string()],
            processed_prefix: "PROCESSED_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeConfig {
    pub model: String,
    pub language: String,
    pub chat_dir_prefix: String,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: "es".to_string(),
            chat_dir_prefix: "WhatsApp Chat".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatConfig {
    pub retention: RetentionConfig,
    pub collector: CollectorConfig,
    pub sweeper: SweeperConfig,
    pub transcribe: TranscribeConfig,
}

pub const CONFIG_ENV_KEYS: &[&str] = &[
    "WACHAT_CONFIG_PATH",
    "WACHAT_RETENTION_DAYS",
    "WACHAT_KEYWORDS",
    "WACHAT_TEMP_FOLDER",
    "WACHAT_KEEP_EXTENSIONS",
    "WACHAT_PROCESSED_PREFIX",
    "WACHAT_WHISPER_MODEL",
    "WACHAT_WHISPER_LANGUAGE",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialChatConfig {
    retention: Option<RetentionConfig>,
    collector: Option<CollectorConfig>,
    sweeper: Option<SweeperConfig>,
    transcribe: Option<TranscribeConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_csv(var: &str, fallback: &[String]) -> Vec<String> {
    match env::var(var) {
        Ok(v) => {
            let out = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>();
            if out.is_empty() {
                fallback.to_vec()
            } else {
                out
            }
        }
        Err(_) => fallback.to_vec(),
    }
}

fn invalid(msg: &str) -> anyhow::Error {
    ChatArchiveError::InvalidConfig(msg.to_string()).into()
}

pub fn validate(cfg: &ChatConfig) -> Result<()> {
    if cfg.retention.days == 0 {
        return Err(invalid("retention days must be >= 1"));
    }
    if cfg.collector.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(invalid("collector keywords cannot be empty"));
    }
    let temp = cfg.collector.temp_folder_name.trim();
    if temp.is_empty() || temp.contains(['/', '\\']) || temp == "." || temp == ".." {
        return Err(invalid("temp folder name must be a single path component"));
    }
    if cfg.sweeper.keep_extensions.is_empty() {
        return Err(invalid("sweeper keep_extensions cannot be empty"));
    }
    if cfg.sweeper.processed_prefix.trim().is_empty() {
        return Err(invalid("sweeper processed_prefix cannot be empty"));
    }
    if cfg.transcribe.model.trim().is_empty() {
        return Err(invalid("transcribe model cannot be empty"));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("WACHAT_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = resolve_wachat_home().ok()?;
    Some(home.join("wachat.toml"))
}

fn merge_toml(base: &mut ChatConfig, raw: &str) -> Result<()> {
    let parsed: PartialChatConfig =
        toml::from_str(raw).map_err(|err| ChatArchiveError::InvalidConfig(err.to_string()))?;
    if let Some(retention) = parsed.retention {
        base.retention = retention;
    }
    if let Some(collector) = parsed.collector {
        base.collector = collector;
    }
    if let Some(sweeper) = parsed.sweeper {
        base.sweeper = sweeper;
    }
    if let Some(transcribe) = parsed.transcribe {
        base.transcribe = transcribe;
    }
    Ok(())
}

fn merge_file_config(base: &mut ChatConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path).map_err(|err| {
        ChatArchiveError::InvalidConfig(format!("{}: {err}", path.display()))
    })?;
    merge_toml(base, &raw)
}

pub fn load_config() -> Result<ChatConfig> {
    let mut cfg = ChatConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.retention.days = env_or_u64("WACHAT_RETENTION_DAYS", cfg.retention.days);
    cfg.collector.keywords = env_or_csv("WACHAT_KEYWORDS", &cfg.collector.keywords);
    cfg.collector.temp_folder_name =
        env_or_string("WACHAT_TEMP_FOLDER", &cfg.collector.temp_folder_name);
    cfg.sweeper.keep_extensions =
        env_or_csv("WACHAT_KEEP_EXTENSIONS", &cfg.sweeper.keep_extensions);
    cfg.sweeper.processed_prefix =
        env_or_string("WACHAT_PROCESSED_PREFIX", &cfg.sweeper.processed_prefix);
    cfg.transcribe.model = env_or_string("WACHAT_WHISPER_MODEL", &cfg.transcribe.model);
    cfg.transcribe.language = env_or_string("WACHAT_WHISPER_LANGUAGE", &cfg.transcribe.language);

    validate(&cfg)?;
    Ok(cfg)
}
