use anyhow::Result;
use std::path::PathBuf;

use crate::chat::ledger::{Ledger, contact_identifier};
use crate::chat::paths::resolve_paths;
use crate::commands::CommandReport;

#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub folder_name: String,
    pub ledger: Option<PathBuf>,
}

pub fn run(opts: &LookupOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let ledger_file = opts.ledger.clone().unwrap_or(paths.ledger_file);
    let ledger = Ledger::load(&ledger_file)?;

    let identifier = contact_identifier(&opts.folder_name);
    let found = ledger.lookup(identifier);

    let mut report = CommandReport::new("lookup");
    report.detail(format!("ledger={}", ledger_file.display()));
    report.detail(format!("identifier={identifier}"));
    report.detail(format!("found={}", found.found));
    report.detail(format!(
        "cutoff={}",
        found.cutoff.as_deref().unwrap_or("none")
    ));
    Ok(report)
}
