//! The periodic poll tick.

use tracing::{debug, info, warn};

use crate::domain::{DedupKey, Order, OrderItem, RecipientConfig};
use crate::error::Result;

use super::{Orchestrator, FETCH_FAILURE_TEXT};
use crate::application::dispatch::DeliveryOutcome;

/// Counters for one poll tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub recipients: usize,
    pub fetch_failures: usize,
    /// Orders with at least one unseen item that were delivered.
    pub announced: usize,
    /// Of `announced`, deliveries where some images were dropped.
    pub partial: usize,
    /// Orders whose text could not be delivered; retried next tick.
    pub failed: usize,
    pub keys_recorded: usize,
}

impl Orchestrator {
    /// Run one poll cycle over every known recipient.
    ///
    /// Overlapping calls are serialized, so a key is never announced twice
    /// by concurrent ticks.
    ///
    /// # Errors
    ///
    /// Fails only if the recipient list cannot be read. Per-recipient
    /// failures are logged and counted.
    pub async fn poll_tick(&self) -> Result<TickSummary> {
        let _tick = self.tick_lock.lock().await;
        let recipients = self.recipients.list().await?;

        let mut summary = TickSummary::default();
        for recipient in &recipients {
            summary.recipients += 1;
            if let Err(error) = self.poll_recipient(recipient, &mut summary).await {
                warn!(
                    recipient = %recipient.recipient_id,
                    error = %error,
                    "Poll aborted for recipient"
                );
            }
        }

        if summary.announced > 0 || summary.failed > 0 || summary.fetch_failures > 0 {
            info!(
                recipients = summary.recipients,
                announced = summary.announced,
                partial = summary.partial,
                failed = summary.failed,
                fetch_failures = summary.fetch_failures,
                "Poll tick complete"
            );
        } else {
            debug!(recipients = summary.recipients, "Poll tick: nothing new");
        }
        Ok(summary)
    }

    async fn poll_recipient(
        &self,
        recipient: &RecipientConfig,
        summary: &mut TickSummary,
    ) -> Result<()> {
        let id = recipient.recipient_id;
        let orders = match self.source.fetch(&recipient.api_key).await {
            Ok(orders) => orders,
            Err(error) => {
                summary.fetch_failures += 1;
                warn!(
                    recipient = %id,
                    source = self.source.source_name(),
                    error = %error,
                    "Order fetch failed"
                );
                if let Err(error) = self.dispatcher.deliver_plain(id, FETCH_FAILURE_TEXT).await {
                    warn!(recipient = %id, error = %error, "Could not report fetch failure");
                }
                return Ok(());
            }
        };
        debug!(recipient = %id, orders = orders.len(), "Fetched orders");

        for order in &orders {
            let pending = self.unseen_items(recipient, order).await?;
            if pending.is_empty() {
                continue;
            }

            let items: Vec<&OrderItem> = pending.iter().map(|(_, item)| *item).collect();
            let message = self.formatter.render(order, &items);

            match self.dispatcher.deliver(id, &message).await {
                Ok(outcome) => {
                    summary.announced += 1;
                    if let DeliveryOutcome::Partial {
                        images_sent,
                        images_failed,
                    } = outcome
                    {
                        summary.partial += 1;
                        warn!(
                            recipient = %id,
                            order_id = %order.id,
                            images_sent,
                            images_failed,
                            "Order announced without some images"
                        );
                    }
                    let mut keys: Vec<&DedupKey> = pending.iter().map(|(key, _)| key).collect();
                    keys.sort();
                    keys.dedup();
                    for key in keys {
                        self.dedup.record(key).await?;
                        summary.keys_recorded += 1;
                    }
                    info!(
                        recipient = %id,
                        order_id = %order.id,
                        items = items.len(),
                        "Order announced"
                    );
                }
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        recipient = %id,
                        order_id = %order.id,
                        error = %error,
                        "Order delivery failed, will retry next tick"
                    );
                }
            }
        }
        Ok(())
    }

    /// Items of `order` whose keys have not been recorded yet.
    async fn unseen_items<'a>(
        &self,
        recipient: &RecipientConfig,
        order: &'a Order,
    ) -> Result<Vec<(DedupKey, &'a OrderItem)>> {
        let mut unseen = Vec::new();
        for (key, item) in self
            .settings
            .granularity
            .keys(recipient.recipient_id, order)
        {
            if self.dedup.is_new(&key).await? {
                unseen.push((key, item));
            }
        }
        Ok(unseen)
    }
}
