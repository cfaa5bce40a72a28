//! Database model types for Diesel ORM.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{notification_records, recipients};
use crate::error::{Error, Result};

/// Database row for an announced dedup key.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = notification_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationRecordRow {
    pub key: String,
    pub recorded_at: String,
}

/// Database row for a recipient's configuration.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = recipients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipientRow {
    pub recipient_id: i64,
    pub api_key: String,
    pub daily_report_time: String,
    pub updated_at: String,
}

/// Fixed-width UTC timestamp (`2024-01-05T10:00:00.000000Z`).
///
/// Every stored instant uses this form so `<` on text is `<` on time.
#[must_use]
pub fn encode_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// # Errors
/// Returns [`Error::Parse`] for anything that is not RFC 3339.
pub fn decode_instant(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("bad timestamp {raw:?}: {e}")))
}
