use crate::chat::warn::{self, WarnEvent};
use crate::error::ChatArchiveError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CONTACT_SEPARATOR: &str = " - ";

/// Read-only contact ledger. Built once per run and passed to the stages that need it.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerMatch {
    pub found: bool,
    pub cutoff: Option<String>,
}

impl LedgerMatch {
    pub fn miss() -> Self {
        Self::default()
    }

    /// Cutoff only when the contact is known and the neighbouring cell is non-empty.
    pub fn processed_until(&self) -> Option<&str> {
        if self.found {
            self.cutoff.as_deref()
        } else {
            None
        }
    }
}

/// `"WhatsApp Chat - +15551234567"` -> `"15551234567"`.
pub fn contact_identifier(folder_name: &str) -> &str {
    match folder_name.split_once(CONTACT_SEPARATOR) {
        Some((_, contact)) => contact.strip_prefix('+').unwrap_or(contact),
        None => folder_name,
    }
}

impl Ledger {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(ToOwned::to_owned).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(ToOwned::to_owned).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn load(path: &Path) -> Result<Self, ChatArchiveError> {
        let unreadable = |reason: String| ChatArchiveError::LedgerUnreadable {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|err| unreadable(err.to_string()))?;
        let ledger = Self::from_reader(file).map_err(|err| unreadable(err.to_string()))?;
        tracing::info!(
            rows = ledger.row_count(),
            columns = ledger.column_count(),
            "loaded ledger {}",
            path.display()
        );
        Ok(ledger)
    }

    /// A missing or malformed ledger degrades to "nothing processed yet".
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(ledger) => ledger,
            Err(err) => {
                warn::emit(WarnEvent {
                    code: "LEDGER_UNAVAILABLE",
                    stage: "ledger",
                    action: "load",
                    target: &path.display().to_string(),
                    reason: "continuing-with-empty-ledger",
                    err: &err.to_string(),
                });
                Self::default()
            }
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Scan column by column for the first cell containing `identifier`
    /// (case-insensitive); the cutoff is the next cell of that row.
    pub fn lookup(&self, identifier: &str) -> LedgerMatch {
        let needle = identifier.to_lowercase();
        if needle.is_empty() {
            return LedgerMatch::miss();
        }

        for column in 0..self.column_count() {
            let hit = self.rows.iter().find(|row| {
                row.get(column)
                    .is_some_and(|cell| cell.to_lowercase().contains(&needle))
            });
            if let Some(row) = hit {
                let cutoff = row
                    .get(column + 1)
                    .map(|cell| cell.trim())
                    .filter(|cell| !cell.is_empty())
                    .map(ToOwned::to_owned);
                return LedgerMatch {
                    found: true,
                    cutoff,
                };
            }
        }

        LedgerMatch::miss()
    }

    pub fn lookup_folder(&self, folder_name: &str) -> LedgerMatch {
        self.lookup(contact_identifier(folder_name))
    }
}
