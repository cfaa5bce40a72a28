//! Handler for the `fetch` command: preview notifications without sending.

use std::sync::Arc;

use crate::adapter::inbound::cli::command::FetchArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::uzum::UzumClient;
use crate::application::MessageFormatter;
use crate::domain::{DedupGranularity, Order, OrderItem, RecipientId};
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::dedup::DedupBackend;
use crate::infrastructure::config::settings::{Config, ENV_API_KEY};
use crate::port::{DedupStore, OrderSource};

/// Execute `fetch`.
pub async fn execute(args: &FetchArgs) -> Result<()> {
    let config = Config::load(&args.config.config)?;
    if args.unseen_for.is_some() {
        require_persistent_history(&config)?;
    }
    let credential = config
        .default_credential()
        .ok_or(ConfigError::MissingField { field: ENV_API_KEY })?;
    let client = UzumClient::from_config(&config.source);
    let formatter = MessageFormatter::new(config.schedule.offset()?);

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Orders", client.orders_url());

    let filter = match args.unseen_for {
        Some(chat) => {
            let pool = bootstrap::open_database(&config)?;
            Some(UnseenFilter {
                recipient: RecipientId::new(chat),
                granularity: config.dedup.granularity,
                dedup: bootstrap::build_dedup_store(&config, &pool),
            })
        }
        None => None,
    };

    let orders = client.fetch(&credential).await?;
    let mut shown = 0;
    for order in &orders {
        let items = match &filter {
            Some(filter) => filter.unseen(order).await?,
            None => order.items.iter().collect(),
        };
        if items.is_empty() {
            continue;
        }
        let message = formatter.render(order, &items);
        output::notification(order.id.as_str(), &message.text, &message.image_urls);
        shown += 1;
    }

    output::section("Summary");
    output::field("Fetched", orders.len());
    output::field("Shown", shown);
    if let Some(filter) = &filter {
        output::note(&format!(
            "Only items not yet announced to chat {} ({} backend)",
            filter.recipient,
            filter.dedup.backend_name()
        ));
    }
    Ok(())
}

/// `--unseen-for` reads history a previous run wrote; a fresh in-memory
/// store has none and would show every item as unseen.
fn require_persistent_history(config: &Config) -> Result<()> {
    if config.dedup.backend == DedupBackend::Memory {
        return Err(ConfigError::InvalidValue {
            field: "unseen_for",
            reason: "the memory dedup backend keeps no history between runs; \
                     use backend = \"sqlite\""
                .to_string(),
        }
        .into());
    }
    Ok(())
}

/// Read-only view of which items a recipient has not been told about.
struct UnseenFilter {
    recipient: RecipientId,
    granularity: DedupGranularity,
    dedup: Arc<dyn DedupStore>,
}

impl UnseenFilter {
    async fn unseen<'a>(&self, order: &'a Order) -> Result<Vec<&'a OrderItem>> {
        let mut items = Vec::new();
        for (key, item) in self.granularity.keys(self.recipient, order) {
            if self.dedup.is_new(&key).await? {
                items.push(item);
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::InMemoryDedupStore;

    #[test]
    fn unseen_needs_a_persistent_backend() {
        let mut config: Config =
            Config::parse_toml_with_env("[source]\nshop_id = \"1\"\n", |_| None).unwrap();
        assert!(require_persistent_history(&config).is_ok());

        config.dedup.backend = DedupBackend::Memory;
        let err = require_persistent_history(&config).unwrap_err();
        assert!(err.to_string().contains("memory dedup backend"), "{err}");
    }

    #[tokio::test]
    async fn unseen_filter_skips_recorded_items() {
        let dedup = Arc::new(InMemoryDedupStore::new());
        let filter = UnseenFilter {
            recipient: RecipientId::new(5),
            granularity: DedupGranularity::Item,
            dedup: dedup.clone(),
        };
        let order = Order::new("8", vec![OrderItem::new("a", 1), OrderItem::new("b", 2)]);

        let (first_key, _) = DedupGranularity::Item
            .keys(RecipientId::new(5), &order)
            .into_iter()
            .next()
            .unwrap();
        dedup.record(&first_key).await.unwrap();

        let unseen = filter.unseen(&order).await.unwrap();
        assert_eq!(unseen.len(), 1);
        assert_eq!(unseen[0].title, "b");
    }
}
