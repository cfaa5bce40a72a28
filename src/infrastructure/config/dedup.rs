//! Dedup store configuration.

use serde::Deserialize;

use crate::domain::DedupGranularity;

/// Where announced keys are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupBackend {
    /// Process memory; forgotten on restart.
    Memory,
    /// The SQLite database at `database`.
    #[default]
    Sqlite,
}

impl std::fmt::Display for DedupBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Dedup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    #[serde(default)]
    pub backend: DedupBackend,
    #[serde(default)]
    pub granularity: DedupGranularity,
    /// How long an announced key is remembered (default: 48).
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    /// Expiry sweep interval in seconds (default: 3600).
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Upper bound on `retention_hours`: ten years.
pub const MAX_RETENTION_HOURS: u64 = 24 * 365 * 10;

const fn default_retention_hours() -> u64 {
    48
}

const fn default_sweep_interval_secs() -> u64 {
    3600
}

impl DedupConfig {
    /// Retention as a chrono duration.
    #[must_use]
    pub fn retention(&self) -> chrono::Duration {
        let hours = self.retention_hours.min(MAX_RETENTION_HOURS);
        i64::try_from(hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            backend: DedupBackend::default(),
            granularity: DedupGranularity::default(),
            retention_hours: default_retention_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}
