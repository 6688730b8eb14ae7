use crate::error::DateError;
use chrono::{Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// `[7/3/25, 5:46:42 PM] Alice: hi` style transcript prefix.
static MESSAGE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{1,2}/\d{1,2}/\d{2,4})").expect("valid message regex"));

/// `00000012-AUDIO-2025-07-03-17-46-42.opus` style media names.
static FILENAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid filename regex"));

pub fn message_date(line: &str) -> Option<&str> {
    MESSAGE_DATE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn filename_date(name: &str) -> Option<&str> {
    FILENAME_DATE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a WhatsApp `M/D/YY` or `M/D/YYYY` stamp.
///
/// Two-digit years pivot at 69: `00..=68` land in the 2000s, `69..=99` in the 1900s.
pub fn parse_message_date(raw: &str) -> Result<NaiveDate, DateError> {
    let mut parts = raw.split('/');
    let (Some(month), Some(day), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DateError::Unparsable(raw.to_string()));
    };

    let month = month
        .parse::<u32>()
        .map_err(|_| DateError::Unparsable(raw.to_string()))?;
    let day = day
        .parse::<u32>()
        .map_err(|_| DateError::Unparsable(raw.to_string()))?;
    let year = match year.len() {
        2 => {
            let short = year
                .parse::<i32>()
                .map_err(|_| DateError::Unparsable(raw.to_string()))?;
            if short < 69 { 2000 + short } else { 1900 + short }
        }
        4 => year
            .parse::<i32>()
            .map_err(|_| DateError::Unparsable(raw.to_string()))?,
        _ => return Err(DateError::Unparsable(raw.to_string())),
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::OutOfRange(raw.to_string()))
}

pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DateError::Unparsable(raw.to_string()))
}

/// True when the file date is strictly earlier than the ledger cutoff.
pub fn precedes_cutoff(file_date: &str, ledger_cutoff: &str) -> Result<bool, DateError> {
    let file_date = parse_iso_date(file_date)?;
    let ledger_cutoff = parse_iso_date(ledger_cutoff)?;
    Ok(file_date < ledger_cutoff)
}

/// Fixed "now minus N days" instant; computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    pub days: u64,
    pub cutoff: NaiveDateTime,
}

impl RetentionWindow {
    /// A window reaching past the earliest representable date expires nothing.
    pub fn new(now: NaiveDateTime, days: u64) -> Self {
        let cutoff = now
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDateTime::MIN);
        Self { days, cutoff }
    }

    pub fn from_local_now(days: u64) -> Self {
        Self::new(chrono::Local::now().naive_local(), days)
    }

    /// Dates are taken at midnight and compared strictly against the cutoff.
    pub fn is_expired(&self, date: NaiveDate) -> bool {
        date.and_time(chrono::NaiveTime::MIN) < self.cutoff
    }

    pub fn message_line_expired(&self, line: &str) -> Result<bool, DateError> {
        match message_date(line) {
            Some(raw) => Ok(self.is_expired(parse_message_date(raw)?)),
            None => Ok(false),
        }
    }

    /// Unparsable filename dates count as undated and never expire.
    pub fn filename_expired(&self, name: &str) -> bool {
        filename_date(name)
            .and_then(|raw| parse_iso_date(raw).ok())
            .is_some_and(|date| self.is_expired(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time")
    }

    #[test]
    fn message_date_reads_bracketed_prefix() {
        assert_eq!(
            message_date("[1/2/24, 5:46:42 PM] Alice: hi"),
            Some("1/2/24")
        );
        assert_eq!(message_date("[12/31/2024, 9:00] Bob: yo"), Some("12/31/2024"));
        assert_eq!(message_date("no date here 1/2/24"), None);
    }

    #[test]
    fn filename_date_finds_first_iso_date() {
        assert_eq!(
            filename_date("00000012-AUDIO-2025-07-03-17-46-42.opus"),
            Some("2025-07-03")
        );
        assert_eq!(filename_date("_chat.txt"), None);
    }

    #[test]
    fn two_digit_years_pivot_like_strptime() {
        assert_eq!(
            parse_message_date("1/2/24"),
            Ok(NaiveDate::from_ymd_opt(2024, 1, 2).expect("date"))
        );
        assert_eq!(
            parse_message_date("7/3/99"),
            Ok(NaiveDate::from_ymd_opt(1999, 7, 3).expect("date"))
        );
        assert_eq!(
            parse_message_date("7/3/2025"),
            Ok(NaiveDate::from_ymd_opt(2025, 7, 3).expect("date"))
        );
    }

    #[test]
    fn impossible_message_dates_are_errors() {
        assert!(matches!(
            parse_message_date("13/45/24"),
            Err(DateError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_message_date("1/2/245"),
            Err(DateError::Unparsable(_))
        ));
    }

    #[test]
    fn retention_window_is_strict_about_the_cutoff() {
        let window = RetentionWindow::new(at(2024, 7, 16), 45);
        assert!(window.is_expired(NaiveDate::from_ymd_opt(2024, 1, 2).expect("date")));
        // 2024-06-01 00:00 < 2024-06-01 12:00
        assert!(window.is_expired(NaiveDate::from_ymd_opt(2024, 6, 1).expect("date")));
        assert!(!window.is_expired(NaiveDate::from_ymd_opt(2024, 6, 2).expect("date")));
    }

    #[test]
    fn oversized_window_expires_nothing() {
        let window = RetentionWindow::new(at(2025, 1, 20), 200_000_000);
        assert_eq!(window.cutoff, NaiveDateTime::MIN);
        let yesterday = NaiveDate::from_ymd_opt(2025, 1, 19).expect("date");
        assert!(!window.is_expired(yesterday));
        assert!(!window.filename_expired("chat_1970-01-01.txt"));
        assert_eq!(window.message_line_expired("[1/2/24, 5:46:42 PM] old"), Ok(false));
    }

    #[test]
    fn undated_lines_never_expire() {
        let window = RetentionWindow::new(at(2030, 1, 1), 1);
        assert_eq!(window.message_line_expired("just text"), Ok(false));
        assert_eq!(window.message_line_expired("[x/y/zz] odd"), Ok(false));
        assert!(!window.filename_expired("IMG-9999-99-99.txt"));
    }

    #[test]
    fn precedes_cutoff_compares_iso_dates() {
        assert_eq!(precedes_cutoff("2024-05-31", "2024-06-01"), Ok(true));
        assert_eq!(precedes_cutoff("2024-06-01", "2024-06-01"), Ok(false));
        assert!(precedes_cutoff("2024-05-31", "June 1st").is_err());
    }
}
