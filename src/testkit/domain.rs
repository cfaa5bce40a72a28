//! Builders for domain values used across tests.

use chrono::NaiveTime;

use crate::domain::{Credential, Order, OrderItem, RecipientConfig, RecipientId};

/// Recipient `id` with credential `key-{id}` and a 16:00 digest.
pub fn recipient(id: i64) -> RecipientConfig {
    RecipientConfig::new(
        RecipientId::new(id),
        Credential::new(format!("key-{id}")),
        NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
    )
}

/// Order `id` with one image-less item per `(title, quantity)`.
pub fn order(id: &str, items: &[(&str, u32)]) -> Order {
    Order::new(
        id,
        items
            .iter()
            .map(|(title, quantity)| OrderItem::new(*title, *quantity))
            .collect(),
    )
}

/// Order `id` with `n` items, each with its own image `https://img/{id}/{i}.jpg`.
pub fn order_with_images(id: &str, n: usize) -> Order {
    Order::new(
        id,
        (0..n)
            .map(|i| OrderItem::new(format!("Item {i}"), 1).with_image(format!("https://img/{id}/{i}.jpg")))
            .collect(),
    )
}
