//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for secrets: `TELEGRAM_BOT_TOKEN`, `UZUM_API_KEY` and `TELEGRAM_CHAT_ID`.
//!
//! # Example
//!
//! ```no_run
//! use orderbell::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use chrono::NaiveTime;
use serde::Deserialize;

use super::dedup::{DedupConfig, MAX_RETENTION_HOURS};
use super::logging::LoggingConfig;
use super::schedule::ScheduleConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::uzum::settings::UzumConfig;
use crate::application::PipelineSettings;
use crate::domain::{Credential, RecipientConfig, RecipientId};
use crate::error::{ConfigError, Result};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_API_KEY: &str = "UZUM_API_KEY";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Seller order API.
    #[serde(default, alias = "uzum")]
    pub source: UzumConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    /// Dedup backend, granularity and retention.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Job intervals, pacing and the local timezone.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Path to the SQLite database file. Recipients always live here;
    /// announced keys too unless `dedup.backend = "memory"`.
    ///
    /// Defaults to "data/orderbell.db" relative to the working directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "data/orderbell.db".to_string()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Secrets are taken from the environment when set, replacing any value
    /// in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - An environment override is malformed
    /// - Validation fails
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |name| std::env::var(name).ok())
    }

    /// Like [`Config::parse_toml`], reading overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`Config::parse_toml`].
    pub fn parse_toml_with_env<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(token) = non_empty(ENV_BOT_TOKEN) {
            self.telegram.token = Some(token);
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.source.api_key = Some(key);
        }
        if let Some(raw) = non_empty(ENV_CHAT_ID) {
            let chat_id = raw.trim().parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                field: "TELEGRAM_CHAT_ID",
                reason: e.to_string(),
            })?;
            self.telegram.chat_id = Some(chat_id);
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges. The bot token is checked by [`Config::bot_token`]
    /// because only `run` needs it.
    fn validate(&self) -> Result<()> {
        if self.source.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        if self.source.shop_id.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "shop_id" }.into());
        }
        if self.source.status.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "status" }.into());
        }
        if self.source.http.timeout_ms == 0 || self.source.http.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http",
                reason: "timeouts must be greater than 0".to_string(),
            }
            .into());
        }

        if self.schedule.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.schedule.max_retry_after_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retry_after_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        self.schedule.offset()?;
        self.schedule.report_time()?;

        if self.dedup.retention_hours == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retention_hours",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.dedup.retention_hours > MAX_RETENTION_HOURS {
            return Err(ConfigError::InvalidValue {
                field: "retention_hours",
                reason: format!("must be at most {MAX_RETENTION_HOURS}"),
            }
            .into());
        }
        if self.dedup.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sweep_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        Ok(())
    }

    /// The bot token, required to run the service.
    ///
    /// # Errors
    ///
    /// Returns an error when no token is configured.
    pub fn bot_token(&self) -> Result<&str> {
        self.telegram
            .token()
            .ok_or_else(|| ConfigError::MissingField { field: ENV_BOT_TOKEN }.into())
    }

    /// Default credential for newly registered recipients.
    #[must_use]
    pub fn default_credential(&self) -> Option<Credential> {
        self.source
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Credential::new)
    }

    /// Default digest time for newly registered recipients.
    ///
    /// # Errors
    ///
    /// Returns an error when `report_time` is malformed.
    pub fn default_report_time(&self) -> Result<NaiveTime> {
        self.schedule.report_time()
    }

    /// Recipient to register at startup, if a chat id and key are configured.
    ///
    /// # Errors
    ///
    /// Returns an error when `report_time` is malformed.
    pub fn seed_recipient(&self) -> Result<Option<RecipientConfig>> {
        let (Some(chat_id), Some(api_key)) = (self.telegram.chat_id, self.default_credential())
        else {
            return Ok(None);
        };
        Ok(Some(RecipientConfig::new(
            RecipientId::new(chat_id),
            api_key,
            self.default_report_time()?,
        )))
    }

    /// Core pipeline settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the timezone offset is out of range.
    pub fn pipeline_settings(&self) -> Result<PipelineSettings> {
        Ok(PipelineSettings {
            granularity: self.dedup.granularity,
            retention: self.dedup.retention(),
            offset: self.schedule.offset()?,
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
