use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "wachat",
    version,
    about = "Archive WhatsApp chat exports: collect, extract, trim, mark and relocate"
)]
struct Cli {
    /// Print the command report as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace). `WACHAT_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full archive pipeline over a downloads folder.
    Process {
        /// Folder holding the exported `.zip` files.
        source: Option<PathBuf>,
        /// Where cleaned chat folders end up (default: `<dest_base>/<Month>`).
        destination: Option<PathBuf>,
        /// Retention window in days.
        #[arg(long)]
        days: Option<u64>,
        /// Ledger CSV to consult for processed cutoffs.
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Transcribe `.opus` voice notes in chat folders with whisper.
    Transcribe {
        dir: Option<PathBuf>,
        model: Option<String>,
    },
    /// Show ledger shape.
    Ledger {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Look up a chat folder name in the ledger.
    Lookup {
        folder_name: String,
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Show resolved paths, config and environment overrides.
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let state = if report.ok { "ok" } else { "failed" };
    println!("wachat {}: {state}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let report = match cli.command {
        Command::Process {
            source,
            destination,
            days,
            ledger,
        } => commands::process::run(&commands::process::ProcessOptions {
            source,
            destination,
            days,
            ledger,
        })?,
        Command::Transcribe { dir, model } => {
            commands::transcribe::run(&commands::transcribe::TranscribeOptions { dir, model })?
        }
        Command::Ledger { path } => {
            commands::ledger::run(&commands::ledger::LedgerOptions { path })?
        }
        Command::Lookup {
            folder_name,
            ledger,
        } => commands::lookup::run(&commands::lookup::LookupOptions {
            folder_name,
            ledger,
        })?,
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!(
            "{} reported {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
