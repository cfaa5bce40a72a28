//! Raw order JSON to domain [`Order`]s.
//!
//! This is the only place that looks at upstream field names. Lenient on
//! optional data (dates, images, titles), strict on shape: an order that
//! does not decode is skipped with a warning.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use super::dto::{OrdersResponse, RawOrder, RawOrderItem};
use crate::domain::{Order, OrderId, OrderItem};
use crate::error::FetchError;

/// Title used when an item carries none.
pub const UNKNOWN_TITLE: &str = "Неизвестный товар";

/// Image sizes in order of preference.
const IMAGE_SIZES: [&str; 5] = ["800", "720", "540", "480", "240"];

/// A way of reading an instant out of a JSON value.
type InstantStrategy = fn(&Value) -> Option<DateTime<Utc>>;

/// Tried in order; the first strategy that yields a value wins.
const INSTANT_STRATEGIES: [InstantStrategy; 3] = [epoch_millis, rfc3339, naive_iso];

/// Decode a response body into orders.
///
/// # Errors
/// Returns [`FetchError::Decode`] if the envelope is not valid JSON of
/// the expected shape. Bad individual orders are skipped, not reported.
pub fn parse_orders_body(body: &str) -> Result<Vec<Order>, FetchError> {
    let response: OrdersResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(normalize_orders(response.into_orders()))
}

/// Normalize every order that decodes, in input order.
#[must_use]
pub fn normalize_orders(values: Vec<Value>) -> Vec<Order> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let decoded = serde_json::from_value::<RawOrder>(value)
                .map_err(|e| e.to_string())
                .and_then(normalize_order);
            match decoded {
                Ok(order) => Some(order),
                Err(reason) => {
                    warn!(index, reason = %reason, "Skipping malformed order");
                    None
                }
            }
        })
        .collect()
}

/// Normalize one decoded order.
///
/// # Errors
/// Returns a reason if the order has no usable id.
pub fn normalize_order(raw: RawOrder) -> Result<Order, String> {
    let id = match &raw.id {
        Value::Number(n) => OrderId::new(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => OrderId::new(s.trim()),
        other => return Err(format!("unusable order id: {other}")),
    };

    let items = raw
        .order_items
        .unwrap_or_default()
        .iter()
        .map(normalize_item)
        .collect();

    let mut order = Order::new(id, items);
    order.created_at = raw.date_created.as_ref().and_then(parse_instant);
    order.deliver_until = raw.deliver_until.as_ref().and_then(parse_instant);
    Ok(order)
}

fn normalize_item(raw: &RawOrderItem) -> OrderItem {
    let mut item = OrderItem::new(resolve_title(raw), resolve_quantity(raw.amount.as_ref()));
    item.variant_label = text(raw.sku_char_value.as_ref()).map(ToOwned::to_owned);
    item.image_url = resolve_image(raw);
    item
}

/// `title`, then `productTitle`, then [`UNKNOWN_TITLE`].
#[must_use]
pub fn resolve_title(raw: &RawOrderItem) -> String {
    text(raw.title.as_ref())
        .or_else(|| text(raw.product_title.as_ref()))
        .unwrap_or(UNKNOWN_TITLE)
        .to_string()
}

/// Item quantity from an integer, an integral float or a digit string.
///
/// Anything else, including negatives and values beyond `u32`, is 0.
#[must_use]
pub fn resolve_quantity(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}

/// Best image from `photo`, falling back to `productImage`.
#[must_use]
pub fn resolve_image(raw: &RawOrderItem) -> Option<String> {
    best_image(raw.photo.as_ref()).or_else(|| best_image(raw.product_image.as_ref()))
}

fn best_image(container: Option<&Value>) -> Option<String> {
    let sizes = container?.get("photo")?;
    IMAGE_SIZES.iter().find_map(|size| {
        sizes
            .get(size)?
            .get("high")?
            .as_str()
            .filter(|url| !url.trim().is_empty())
            .map(ToOwned::to_owned)
    })
}

/// Read an instant using the first strategy that understands `value`.
///
/// Never fails: unreadable input is `None`.
#[must_use]
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    INSTANT_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(value))
}

/// Epoch milliseconds, as a JSON integer or a string of digits.
fn epoch_millis(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()?
        }
        _ => return None,
    };
    DateTime::from_timestamp_millis(millis)
}

/// RFC 3339 with an explicit offset; a trailing `Z` means UTC.
fn rfc3339(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    let normalized = match raw.strip_suffix('Z') {
        Some(prefix) => format!("{prefix}+00:00"),
        None => raw.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// ISO datetime or date without an offset, read as UTC.
fn naive_iso(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// A non-blank JSON string; other types count as absent.
fn text(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.trim().is_empty())
}
