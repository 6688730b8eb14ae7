use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Environment keys read by [`resolve_paths`].
pub const PATH_ENV_KEYS: &[&str] = &[
    "WACHAT_HOME",
    "WACHAT_SOURCE_DIR",
    "WACHAT_DEST_DIR",
    "WACHAT_LEDGER_PATH",
    "WACHAT_LOGS_DIR",
    "WHISPER_BIN",
];

#[derive(Debug, Clone)]
pub struct ChatPaths {
    pub wachat_home: PathBuf,
    pub source_dir: PathBuf,
    pub dest_base_dir: PathBuf,
    pub ledger_file: PathBuf,
    pub logs_dir: PathBuf,
    pub whisper_bin: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_wachat_home() -> Result<PathBuf> {
    let home = required_home_dir()?;
    Ok(env_or_default_path("WACHAT_HOME", home.join(".wachat")))
}

pub fn resolve_paths() -> Result<ChatPaths> {
    let home = required_home_dir()?;
    let wachat_home = resolve_wachat_home()?;

    let downloads = dirs::download_dir().unwrap_or_else(|| home.join("Downloads"));
    let source_dir = env_or_default_path("WACHAT_SOURCE_DIR", downloads);
    let dest_base_dir = env_or_default_path(
        "WACHAT_DEST_DIR",
        wachat_home.join("client-management"),
    );
    let ledger_file = env_or_default_path("WACHAT_LEDGER_PATH", wachat_home.join("ledger.csv"));
    let logs_dir = env_or_default_path("WACHAT_LOGS_DIR", wachat_home.join("logs"));
    let whisper_bin = env_or_default_path("WHISPER_BIN", home.join(".local/bin/whisper"));

    Ok(ChatPaths {
        wachat_home,
        source_dir,
        dest_base_dir,
        ledger_file,
        logs_dir,
        whisper_bin,
    })
}

/// `<dest_base>/<current month name>`, e.g. `.../client-management/October`.
pub fn monthly_destination(paths: &ChatPaths) -> PathBuf {
    let month = chrono::Local::now().format("%B").to_string();
    paths.dest_base_dir.join(month)
}
