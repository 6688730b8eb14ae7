pub mod ledger;
pub mod lookup;
pub mod process;
pub mod status;
pub mod transcribe;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

#[cfg(test)]
mod tests {
    use super::CommandReport;

    #[test]
    fn issues_flip_ok_and_keep_details() {
        let mut report = CommandReport::new("status");
        report.detail("a");
        assert!(report.ok);

        report.issue("missing ledger");
        assert!(!report.ok);
        assert_eq!(report.details, vec!["a"]);
        assert_eq!(report.issues, vec!["missing ledger"]);
    }
}
