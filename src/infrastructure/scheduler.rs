//! Recurring jobs: poll tick, expiry sweep and per-recipient digests.
//!
//! Each job is its own task and stops when the shutdown flag flips. The
//! poll tick and sweep use [`MissedTickBehavior::Delay`], so a run that
//! overshoots its period pushes the next one back instead of firing twice.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::Orchestrator;
use crate::domain::{RecipientConfig, RecipientId};

use super::config::settings::Config;

/// Intervals for the recurring jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub sweep_interval: Duration,
    pub digest_enabled: bool,
}

impl SchedulerConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.schedule.poll_interval(),
            sweep_interval: config.dedup.sweep_interval(),
            digest_enabled: config.schedule.digest_enabled,
        }
    }
}

/// Owns the job tasks.
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn every job on the current runtime.
    #[must_use]
    pub fn start(
        orchestrator: Arc<Orchestrator>,
        config: SchedulerConfig,
        shutdown: &watch::Receiver<bool>,
    ) -> Self {
        let mut handles = vec![
            tokio::spawn(poll_job(
                Arc::clone(&orchestrator),
                config.poll_interval,
                shutdown.clone(),
            )),
            tokio::spawn(sweep_job(
                Arc::clone(&orchestrator),
                config.sweep_interval,
                shutdown.clone(),
            )),
        ];
        if config.digest_enabled {
            handles.push(tokio::spawn(digest_job(orchestrator, shutdown.clone())));
        }
        info!(
            poll_secs = config.poll_interval.as_secs(),
            sweep_secs = config.sweep_interval.as_secs(),
            digest = config.digest_enabled,
            "Scheduler started"
        );
        Self { handles }
    }

    /// Wait for every job to observe shutdown.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Scheduler job ended abnormally");
            }
        }
    }
}

/// Resolves once the shutdown flag is set or its sender is gone.
pub(crate) async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn poll_job(
    orchestrator: Arc<Orchestrator>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = stopped(&mut shutdown) => break,
            _ = interval.tick() => {
                if let Err(e) = orchestrator.poll_tick().await {
                    warn!(error = %e, "Poll tick failed");
                }
            }
        }
    }
    debug!("Poll job stopped");
}

async fn sweep_job(
    orchestrator: Arc<Orchestrator>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = stopped(&mut shutdown) => break,
            _ = interval.tick() => {
                if let Err(e) = orchestrator.purge_expired().await {
                    warn!(error = %e, "Expiry sweep failed");
                }
            }
        }
    }
    debug!("Sweep job stopped");
}

async fn digest_job(orchestrator: Arc<Orchestrator>, mut shutdown: watch::Receiver<bool>) {
    let mut ledger = DigestLedger::default();

    loop {
        let wait = until_next_minute(orchestrator.local_now());
        tokio::select! {
            () = stopped(&mut shutdown) => break,
            () = tokio::time::sleep(wait) => {}
        }

        let now = orchestrator.local_now();
        let recipients = match orchestrator.recipients().list().await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(error = %e, "Could not list recipients for digest");
                continue;
            }
        };

        for recipient in ledger.take_due(&recipients, now) {
            let orchestrator = Arc::clone(&orchestrator);
            let today = now.date_naive();
            tokio::spawn(async move {
                let outcome = orchestrator.daily_digest(&recipient, today).await;
                debug!(recipient = %recipient.recipient_id, ?outcome, "Digest job finished");
            });
        }
    }
    debug!("Digest job stopped");
}

/// Time left until the next whole minute, never zero.
#[must_use]
pub fn until_next_minute(now: DateTime<FixedOffset>) -> Duration {
    let elapsed = Duration::from_secs(u64::from(now.second()))
        + Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    Duration::from_secs(60)
        .saturating_sub(elapsed)
        .max(Duration::from_millis(1))
}

/// Remembers which recipients already got today's digest.
#[derive(Debug, Default)]
pub struct DigestLedger {
    sent: HashMap<RecipientId, NaiveDate>,
}

impl DigestLedger {
    /// Recipients whose report time is the current local minute and who
    /// have not been served today. They are marked as served.
    pub fn take_due(
        &mut self,
        recipients: &[RecipientConfig],
        now: DateTime<FixedOffset>,
    ) -> Vec<RecipientConfig> {
        let today = now.date_naive();
        let time = now.time();
        recipients
            .iter()
            .filter(|recipient| recipient.report_due_at(time))
            .filter(|recipient| {
                self.sent.insert(recipient.recipient_id, today) != Some(today)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Credential;
    use chrono::{NaiveTime, TimeZone};

    fn tashkent() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        tashkent().with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    fn recipient(id: i64, h: u32, m: u32) -> RecipientConfig {
        RecipientConfig::new(
            RecipientId::new(id),
            Credential::new("k"),
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
        )
    }

    #[test]
    fn next_minute_wait() {
        assert_eq!(until_next_minute(at(10, 0, 15)), Duration::from_secs(45));
        assert_eq!(until_next_minute(at(10, 0, 0)), Duration::from_secs(60));
    }

    #[test]
    fn ledger_serves_due_recipients_once_per_day() {
        let recipients = vec![recipient(1, 16, 0), recipient(2, 9, 30)];
        let mut ledger = DigestLedger::default();

        let due = ledger.take_due(&recipients, at(16, 0, 1));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].recipient_id, RecipientId::new(1));

        assert!(ledger.take_due(&recipients, at(16, 0, 30)).is_empty());
        assert!(ledger.take_due(&recipients, at(16, 1, 0)).is_empty());

        let tomorrow = tashkent().with_ymd_and_hms(2024, 5, 2, 16, 0, 2).unwrap();
        assert_eq!(ledger.take_due(&recipients, tomorrow).len(), 1);
    }

    #[tokio::test]
    async fn stopped_resolves_when_sender_drops() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), stopped(&mut rx))
            .await
            .expect("stopped should resolve");
    }
}
