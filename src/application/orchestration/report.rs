//! Daily digest and retention sweep.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::application::digest::Digest;
use crate::domain::RecipientConfig;
use crate::error::Result;

use super::Orchestrator;

/// Sent when the digest cannot be built because the fetch failed.
pub const DIGEST_FETCH_FAILURE_TEXT: &str =
    "Не удалось получить данные о заказах для ежедневного отчета.";

/// What happened to a daily digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestOutcome {
    /// The full digest went out in `chunks` messages.
    Delivered { orders: usize, chunks: usize },
    /// The full digest was refused; the summary line went out instead.
    Summary { orders: usize },
    FetchFailed,
    /// Neither the digest nor its summary could be sent.
    Failed,
}

impl Orchestrator {
    /// Build and send the digest of orders created on `today`.
    ///
    /// An empty digest is still sent.
    pub async fn daily_digest(&self, recipient: &RecipientConfig, today: NaiveDate) -> DigestOutcome {
        let id = recipient.recipient_id;
        let orders = match self.source.fetch(&recipient.api_key).await {
            Ok(orders) => orders,
            Err(error) => {
                warn!(recipient = %id, error = %error, "Digest: order fetch failed");
                if let Err(error) = self.dispatcher.deliver_plain(id, DIGEST_FETCH_FAILURE_TEXT).await {
                    warn!(recipient = %id, error = %error, "Could not report fetch failure");
                }
                return DigestOutcome::FetchFailed;
            }
        };

        let digest = Digest::for_day(orders, today, self.settings.offset);
        let text = self.formatter.render_digest(&digest);
        let orders = digest.order_count();

        match self.dispatcher.deliver_plain(id, &text).await {
            Ok(chunks) => {
                info!(
                    recipient = %id,
                    %today,
                    orders,
                    items = digest.item_count(),
                    chunks,
                    "Daily digest sent"
                );
                DigestOutcome::Delivered { orders, chunks }
            }
            Err(error) => {
                warn!(recipient = %id, error = %error, "Digest refused, sending summary");
                match self.dispatcher.deliver_plain(id, &digest.summary_line()).await {
                    Ok(_) => DigestOutcome::Summary { orders },
                    Err(error) => {
                        error!(recipient = %id, error = %error, "Digest summary refused");
                        DigestOutcome::Failed
                    }
                }
            }
        }
    }

    /// Drop dedup records older than the retention window.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn purge_expired(&self) -> Result<usize> {
        let removed = self
            .dedup
            .purge_older_than(self.settings.retention)
            .await?;
        info!(
            backend = self.dedup.backend_name(),
            removed,
            retention_hours = self.settings.retention.num_hours(),
            "Purged expired dedup records"
        );
        Ok(removed)
    }
}
