//! On-demand `/check`: resend every current order, bypassing dedup.

use tracing::{info, warn};

use crate::domain::{Credential, OrderId, RecipientId};

use super::{Orchestrator, FETCH_FAILURE_TEXT};

/// Result of an on-demand check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckReport {
    FetchFailed,
    NoOrders,
    /// One entry per order, `true` if its notification went out.
    Sent(Vec<(OrderId, bool)>),
}

impl CheckReport {
    /// Reply lines for the user who asked.
    #[must_use]
    pub fn replies(&self) -> Vec<String> {
        match self {
            Self::FetchFailed => vec![FETCH_FAILURE_TEXT.to_string()],
            Self::NoOrders => vec!["Нет новых заказов для обработки".to_string()],
            Self::Sent(results) => results
                .iter()
                .map(|(id, delivered)| {
                    if *delivered {
                        format!("✅ Уведомление о заказе {id} успешно отправлено")
                    } else {
                        format!("❌ Не удалось отправить уведомление о заказе {id}")
                    }
                })
                .collect(),
        }
    }
}

impl Orchestrator {
    /// Fetch with `credential` and send every order to `recipient`.
    ///
    /// Nothing is read from or written to the dedup store.
    pub async fn check(&self, recipient: RecipientId, credential: &Credential) -> CheckReport {
        let orders = match self.source.fetch(credential).await {
            Ok(orders) => orders,
            Err(error) => {
                warn!(%recipient, error = %error, "Check: order fetch failed");
                return CheckReport::FetchFailed;
            }
        };
        if orders.is_empty() {
            return CheckReport::NoOrders;
        }

        let mut results = Vec::with_capacity(orders.len());
        for order in &orders {
            let message = self.formatter.render_order(order);
            let delivered = match self.dispatcher.deliver(recipient, &message).await {
                Ok(_) => true,
                Err(error) => {
                    warn!(%recipient, order_id = %order.id, error = %error, "Check: delivery failed");
                    false
                }
            };
            results.push((order.id.clone(), delivered));
        }

        info!(
            %recipient,
            orders = results.len(),
            failed = results.iter().filter(|(_, ok)| !ok).count(),
            "Check complete"
        );
        CheckReport::Sent(results)
    }
}
