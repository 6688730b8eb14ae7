use anyhow::Result;
use std::env;

use crate::chat::audit::audit_log_path;
use crate::chat::config::{CONFIG_ENV_KEYS, load_config};
use crate::chat::paths::{PATH_ENV_KEYS, monthly_destination, resolve_paths};
use crate::commands::CommandReport;
use crate::logging::LOG_ENV_KEY;

/// Every environment key the tool reads, in display order.
fn known_env_keys() -> impl Iterator<Item = &'static str> {
    PATH_ENV_KEYS
        .iter()
        .chain(CONFIG_ENV_KEYS)
        .copied()
        .chain(std::iter::once(LOG_ENV_KEY))
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("version={}", env!("CARGO_PKG_VERSION")));
    report.detail(format!("wachat_home={}", paths.wachat_home.display()));
    report.detail(format!("source_dir={}", paths.source_dir.display()));
    report.detail(format!("destination={}", monthly_destination(&paths).display()));
    report.detail(format!("ledger={}", paths.ledger_file.display()));
    report.detail(format!("audit_log={}", audit_log_path(&paths).display()));
    report.detail(format!("whisper_bin={}", paths.whisper_bin.display()));
    report.detail(format!("retention_days={}", config.retention.days));
    report.detail(format!("keywords={}", config.collector.keywords.join(",")));
    report.detail(format!(
        "keep_extensions={}",
        config.sweeper.keep_extensions.join(",")
    ));

    for key in known_env_keys() {
        if env::var_os(key).is_some() {
            report.detail(format!("env.{key}=set"));
        }
    }

    if !paths.source_dir.is_dir() {
        report.issue(format!("missing source dir ({})", paths.source_dir.display()));
    }
    if !paths.ledger_file.is_file() {
        report.issue(format!("missing ledger file ({})", paths.ledger_file.display()));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::known_env_keys;
    use std::collections::BTreeSet;

    #[test]
    fn env_keys_cover_paths_config_and_logging_once() {
        let keys: Vec<&str> = known_env_keys().collect();
        let unique: BTreeSet<&str> = keys.iter().copied().collect();
        assert_eq!(unique.len(), keys.len());
        for key in ["WACHAT_HOME", "WHISPER_BIN", "WACHAT_RETENTION_DAYS", "WACHAT_LOG"] {
            assert!(unique.contains(key), "{key} missing");
        }
        assert!(!unique.contains("WACHAT_WARN"));
    }
}
