//! Polling and reporting orchestration.
//!
//! The [`Orchestrator`] owns the per-tick sequence and nothing else: all
//! state that outlives a tick lives in the dedup and recipient stores.
//!
//! - `poll`: fetch, filter through dedup, render, deliver, record
//! - `check`: on-demand resend of every current order, no dedup
//! - `report`: daily digest and the retention sweep

mod check;
mod poll;
mod report;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::domain::DedupGranularity;
use crate::port::{DedupStore, OrderSource, RecipientStore};

use super::dispatch::Dispatcher;
use super::format::MessageFormatter;

pub use check::CheckReport;
pub use poll::TickSummary;
pub use report::{DigestOutcome, DIGEST_FETCH_FAILURE_TEXT};

/// Reply sent when the order API could not be reached.
pub const FETCH_FAILURE_TEXT: &str = "Не удалось получить данные о заказах";

/// Knobs of the notification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub granularity: DedupGranularity,
    /// How long an announced key is remembered.
    pub retention: chrono::Duration,
    /// Timezone for dates in messages and for "today".
    pub offset: FixedOffset,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            granularity: DedupGranularity::Item,
            retention: chrono::Duration::hours(48),
            offset: FixedOffset::east_opt(5 * 3600).unwrap_or(Utc.fix()),
        }
    }
}

/// Sequences fetch, dedup, formatting and delivery.
pub struct Orchestrator {
    source: Arc<dyn OrderSource>,
    dedup: Arc<dyn DedupStore>,
    recipients: Arc<dyn RecipientStore>,
    dispatcher: Dispatcher,
    formatter: MessageFormatter,
    settings: PipelineSettings,
    /// Serializes read-then-record across overlapping ticks.
    tick_lock: tokio::sync::Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn OrderSource>,
        dedup: Arc<dyn DedupStore>,
        recipients: Arc<dyn RecipientStore>,
        dispatcher: Dispatcher,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            dedup,
            recipients,
            dispatcher,
            formatter: MessageFormatter::new(settings.offset),
            settings,
            tick_lock: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    #[must_use]
    pub const fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    pub fn recipients(&self) -> &Arc<dyn RecipientStore> {
        &self.recipients
    }

    /// Current date in the configured timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }

    /// Current wall-clock time in the configured timezone.
    #[must_use]
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.settings.offset)
    }
}
