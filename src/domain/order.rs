//! Normalized order model.
//!
//! Everything past the normalizer boundary works with these types; nothing
//! downstream re-inspects the raw upstream JSON.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use super::id::OrderId;

/// A line item of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// Product title, never empty.
    pub title: String,
    /// SKU characteristic (size, color, ...), shown after the title.
    pub variant_label: Option<String>,
    pub quantity: u32,
    /// Best available product image.
    pub image_url: Option<String>,
}

impl OrderItem {
    pub fn new(title: impl Into<String>, quantity: u32) -> Self {
        Self {
            title: title.into(),
            variant_label: None,
            quantity,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_variant(mut self, label: impl Into<String>) -> Self {
        self.variant_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Title with the variant label appended in parentheses.
    #[must_use]
    pub fn display_title(&self) -> String {
        match &self.variant_label {
            Some(label) => format!("{} ({})", self.title, label),
            None => self.title.clone(),
        }
    }
}

/// An order as fetched in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub created_at: Option<DateTime<Utc>>,
    pub deliver_until: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, items: Vec<OrderItem>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            deliver_until: None,
            items,
        }
    }

    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    #[must_use]
    pub fn deliver_until(mut self, at: DateTime<Utc>) -> Self {
        self.deliver_until = Some(at);
        self
    }

    /// Sum of all item quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Calendar date of creation in the given timezone, if known.
    #[must_use]
    pub fn created_on(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.created_at
            .map(|at| at.with_timezone(&offset).date_naive())
    }
}
