//! Wire types of the seller orders endpoint.
//!
//! Orders are kept as raw JSON values at the envelope level so one
//! malformed order can be skipped without failing the whole batch.

use serde::Deserialize;
use serde_json::Value;

/// `{ "payload": { "orders": [...] } }`; both levels may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub payload: Option<OrdersPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersPayload {
    #[serde(default)]
    pub orders: Option<Vec<Value>>,
}

impl OrdersResponse {
    pub fn into_orders(self) -> Vec<Value> {
        self.payload
            .and_then(|payload| payload.orders)
            .unwrap_or_default()
    }
}

/// One order as sent by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    /// Number or string.
    pub id: Value,
    #[serde(default)]
    pub date_created: Option<Value>,
    #[serde(default)]
    pub deliver_until: Option<Value>,
    #[serde(default)]
    pub order_items: Option<Vec<RawOrderItem>>,
}

/// One line item as sent by the API.
///
/// Scalar fields stay raw JSON: the API is loose about their types, and a
/// field of the wrong type must not cost the whole order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderItem {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub product_title: Option<Value>,
    #[serde(default)]
    pub sku_char_value: Option<Value>,
    /// Integer, integral float or digit string.
    #[serde(default)]
    pub amount: Option<Value>,
    /// `{ "photo": { "800": { "high": url }, ... } }`
    #[serde(default)]
    pub photo: Option<Value>,
    /// Same shape as `photo`.
    #[serde(default)]
    pub product_image: Option<Value>,
}
