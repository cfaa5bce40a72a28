//! Scheduler and delivery pacing configuration.

use std::time::Duration;

use chrono::{FixedOffset, NaiveTime};
use serde::Deserialize;

use crate::application::DispatchPolicy;
use crate::domain::recipient::parse_report_time;
use crate::error::{ConfigError, Result};

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Poll tick interval in seconds (default: 60).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Delay between successive sends in milliseconds (default: 500).
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Longest retry-after wait honored, in seconds (default: 60).
    #[serde(default = "default_max_retry_after_secs")]
    pub max_retry_after_secs: u64,
    /// Hours east of UTC for dates and report times (default: 5).
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Default `HH:MM` digest time for new recipients (default: 16:00).
    #[serde(default = "default_report_time")]
    pub report_time: String,
    /// Run the per-recipient daily digest job.
    #[serde(default = "default_digest_enabled")]
    pub digest_enabled: bool,
}

const fn default_poll_interval_secs() -> u64 {
    60
}

const fn default_pacing_ms() -> u64 {
    500
}

const fn default_max_retry_after_secs() -> u64 {
    60
}

const fn default_utc_offset_hours() -> i32 {
    5
}

fn default_report_time() -> String {
    "16:00".into()
}

const fn default_digest_enabled() -> bool {
    true
}

impl ScheduleConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The configured timezone.
    ///
    /// # Errors
    ///
    /// Returns an error when the offset is outside ±23 hours.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "utc_offset_hours",
                    reason: "must be between -23 and 23".to_string(),
                }
                .into()
            })
    }

    /// Default report time for new recipients.
    ///
    /// # Errors
    ///
    /// Returns an error when `report_time` is not `HH:MM`.
    pub fn report_time(&self) -> Result<NaiveTime> {
        parse_report_time(&self.report_time).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "report_time",
                reason: format!("expected HH:MM, got {:?}", self.report_time),
            }
            .into()
        })
    }

    #[must_use]
    pub const fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            pacing: Duration::from_millis(self.pacing_ms),
            max_retry_after: Duration::from_secs(self.max_retry_after_secs),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            pacing_ms: default_pacing_ms(),
            max_retry_after_secs: default_max_retry_after_secs(),
            utc_offset_hours: default_utc_offset_hours(),
            report_time: default_report_time(),
            digest_enabled: default_digest_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScheduleConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.offset().unwrap().local_minus_utc(), 5 * 3600);
        assert_eq!(config.report_time().unwrap(), NaiveTime::from_hms_opt(16, 0, 0).unwrap());

        let policy = config.dispatch_policy();
        assert_eq!(policy.pacing, Duration::from_millis(500));
        assert_eq!(policy.max_retry_after, Duration::from_secs(60));
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let config = ScheduleConfig {
            utc_offset_hours: 24,
            ..Default::default()
        };
        assert!(config.offset().is_err());
    }

    #[test]
    fn malformed_report_time_is_rejected() {
        let config = ScheduleConfig {
            report_time: "4pm".into(),
            ..Default::default()
        };
        assert!(config.report_time().is_err());
    }
}
