use anyhow::Result;
use std::path::PathBuf;

use crate::chat::ledger::Ledger;
use crate::chat::paths::resolve_paths;
use crate::commands::CommandReport;

#[derive(Debug, Clone, Default)]
pub struct LedgerOptions {
    pub path: Option<PathBuf>,
}

pub fn run(opts: &LedgerOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let ledger_file = opts.path.clone().unwrap_or(paths.ledger_file);
    let mut report = CommandReport::new("ledger");
    report.detail(format!("ledger={}", ledger_file.display()));

    let ledger = match Ledger::load(&ledger_file) {
        Ok(ledger) => ledger,
        Err(err) => {
            report.issue(err.to_string());
            return Ok(report);
        }
    };

    report.detail(format!("rows={}", ledger.row_count()));
    report.detail(format!("columns={}", ledger.column_count()));
    report.detail(format!("headers={}", ledger.headers().join(",")));
    Ok(report)
}
