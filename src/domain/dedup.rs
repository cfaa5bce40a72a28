//! Dedup key derivation.

use serde::Deserialize;

use super::id::{DedupKey, RecipientId};
use super::order::{Order, OrderItem};

/// What counts as "already announced".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupGranularity {
    /// Each line item is announced once, keyed by variant label or position.
    #[default]
    Item,
    /// The first announcement of any item uses up the whole order.
    Order,
}

impl std::fmt::Display for DedupGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item => write!(f, "item"),
            Self::Order => write!(f, "order"),
        }
    }
}

impl DedupGranularity {
    /// Key for the item at `index` of `order`, scoped to `recipient`.
    #[must_use]
    pub fn key_for(
        self,
        recipient: RecipientId,
        order: &Order,
        index: usize,
        item: &OrderItem,
    ) -> DedupKey {
        match self {
            Self::Item => {
                let discriminator = item
                    .variant_label
                    .clone()
                    .unwrap_or_else(|| index.to_string());
                DedupKey::new(format!("{recipient}:{}_{discriminator}", order.id))
            }
            Self::Order => DedupKey::new(format!("{recipient}:{}", order.id)),
        }
    }

    /// Keys of all items of `order`, paired with the items, in order.
    #[must_use]
    pub fn keys<'a>(
        self,
        recipient: RecipientId,
        order: &'a Order,
    ) -> Vec<(DedupKey, &'a OrderItem)> {
        order
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| (self.key_for(recipient, order, index, item), item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(
            "42",
            vec![
                OrderItem::new("Shirt", 1).with_variant("XL"),
                OrderItem::new("Mug", 2),
            ],
        )
    }

    #[test]
    fn item_keys_use_variant_then_index() {
        let recipient = RecipientId::new(7);
        let keys: Vec<_> = DedupGranularity::Item
            .keys(recipient, &order())
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, vec!["7:42_XL", "7:42_1"]);
    }

    #[test]
    fn order_keys_collapse_to_order_id() {
        let recipient = RecipientId::new(7);
        let keys: Vec<_> = DedupGranularity::Order
            .keys(recipient, &order())
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, vec!["7:42", "7:42"]);
    }

    #[test]
    fn keys_are_scoped_per_recipient() {
        let o = order();
        let item = &o.items[1];
        let a = DedupGranularity::Item.key_for(RecipientId::new(1), &o, 1, item);
        let b = DedupGranularity::Item.key_for(RecipientId::new(2), &o, 1, item);
        assert_ne!(a, b);
    }
}
