use std::fmt;

use chrono::{DateTime, Local, TimeZone};

/// Timestamp prefix layout, minute granularity.
const STAMP_FORMAT: &str = "%d.%m.%y %H:%M";

/// One persisted line: when it was received and what it said.
///
/// Renders as `[DD.MM.YY HH:MM] <line>`; the line keeps its own terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Local receive time.
    pub at: DateTime<Local>,
    /// Raw line as received.
    pub line: String,
}

impl HistoryRecord {
    /// Stamps `line` with the current local time.
    pub fn now(line: impl Into<String>) -> Self {
        Self::at(Local::now(), line)
    }

    /// Stamps `line` with the given time.
    pub fn at<Tz: TimeZone>(at: DateTime<Tz>, line: impl Into<String>) -> Self {
        Self {
            at: at.with_timezone(&Local),
            line: line.into(),
        }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format(STAMP_FORMAT), self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_minute_stamp_prefix() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 59).unwrap();
        let record = HistoryRecord::at(at, "Ping\n");
        assert_eq!(record.to_string(), "[07.03.24 09:05] Ping\n");
    }
}
