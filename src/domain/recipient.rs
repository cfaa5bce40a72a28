//! Per-recipient configuration.

use chrono::{DateTime, NaiveTime, Utc};

use super::id::{Credential, RecipientId};

/// Who gets notified, with which seller credential, and when the daily
/// digest is due (local time in the configured timezone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientConfig {
    pub recipient_id: RecipientId,
    pub api_key: Credential,
    pub daily_report_time: NaiveTime,
    pub updated_at: DateTime<Utc>,
}

impl RecipientConfig {
    #[must_use]
    pub fn new(recipient_id: RecipientId, api_key: Credential, daily_report_time: NaiveTime) -> Self {
        Self {
            recipient_id,
            api_key,
            daily_report_time,
            updated_at: Utc::now(),
        }
    }

    /// Whether the digest is due at the given local wall-clock minute.
    #[must_use]
    pub fn report_due_at(&self, local: NaiveTime) -> bool {
        use chrono::Timelike;
        self.daily_report_time.hour() == local.hour()
            && self.daily_report_time.minute() == local.minute()
    }
}

/// Parse `HH:MM` into a time of day.
pub fn parse_report_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm() {
        assert_eq!(
            parse_report_time("16:00"),
            NaiveTime::from_hms_opt(16, 0, 0)
        );
        assert_eq!(parse_report_time(" 9:05 "), NaiveTime::from_hms_opt(9, 5, 0));
        assert!(parse_report_time("25:00").is_none());
        assert!(parse_report_time("noon").is_none());
    }

    #[test]
    fn report_due_ignores_seconds() {
        let config = RecipientConfig::new(
            RecipientId::new(1),
            Credential::new("k"),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        );
        assert!(config.report_due_at(NaiveTime::from_hms_opt(16, 0, 42).unwrap()));
        assert!(!config.report_due_at(NaiveTime::from_hms_opt(16, 1, 0).unwrap()));
    }
}
