//! Daily digest selection.

use chrono::{FixedOffset, NaiveDate};

use crate::domain::Order;

/// Orders created on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    date: NaiveDate,
    orders: Vec<Order>,
}

impl Digest {
    #[must_use]
    pub const fn new(date: NaiveDate, orders: Vec<Order>) -> Self {
        Self { date, orders }
    }

    /// Keep the orders whose creation date in `offset` is `today`.
    ///
    /// Orders with an unknown creation time never match.
    #[must_use]
    pub fn for_day(orders: Vec<Order>, today: NaiveDate, offset: FixedOffset) -> Self {
        let orders = orders
            .into_iter()
            .filter(|order| order.created_on(offset) == Some(today))
            .collect();
        Self::new(today, orders)
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Sum of item quantities across all orders.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.orders.iter().map(Order::total_quantity).sum()
    }

    /// One-line fallback used when the full digest cannot be delivered.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "📊 ЕЖЕДНЕВНЫЙ ОТЧЕТ: {} заказов, {} товаров.",
            self.order_count(),
            self.item_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderItem;
    use chrono::{TimeZone, Utc};

    fn tashkent() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600).unwrap()
    }

    #[test]
    fn for_day_filters_by_local_date() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let orders = vec![
            // 20:00 UTC on the 5th is 01:00 on the 6th in Tashkent.
            Order::new("late", vec![OrderItem::new("a", 1)])
                .created_at(Utc.with_ymd_and_hms(2024, 1, 5, 20, 0, 0).unwrap()),
            Order::new("early", vec![OrderItem::new("b", 1)])
                .created_at(Utc.with_ymd_and_hms(2024, 1, 5, 18, 0, 0).unwrap()),
            Order::new("unknown", vec![OrderItem::new("c", 1)]),
            Order::new("noon", vec![OrderItem::new("d", 4)])
                .created_at(Utc.with_ymd_and_hms(2024, 1, 6, 7, 0, 0).unwrap()),
        ];

        let digest = Digest::for_day(orders, today, tashkent());
        let ids: Vec<_> = digest.orders().iter().map(|o| o.id.as_str()).collect();

        assert_eq!(ids, vec!["late", "noon"]);
        assert_eq!(digest.order_count(), 2);
        assert_eq!(digest.item_count(), 5);
        assert_eq!(digest.date(), today);
    }

    #[test]
    fn summary_line_counts() {
        let digest = Digest::new(
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            vec![Order::new("1", vec![OrderItem::new("a", 3)])],
        );
        assert_eq!(digest.summary_line(), "📊 ЕЖЕДНЕВНЫЙ ОТЧЕТ: 1 заказов, 3 товаров.");
    }
}
