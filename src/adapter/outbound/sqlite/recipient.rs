//! SQLite recipient store implementation.

use async_trait::async_trait;
use chrono::NaiveTime;
use diesel::prelude::*;

use super::database::connection::DbPool;
use super::database::model::{decode_instant, encode_instant, RecipientRow};
use super::database::schema::recipients;
use crate::domain::{Credential, RecipientConfig, RecipientId};
use crate::error::{Error, Result};
use crate::port::RecipientStore;

const TIME_FORMAT: &str = "%H:%M";

/// SQLite-backed recipient store.
pub struct SqliteRecipientStore {
    pool: DbPool,
}

impl SqliteRecipientStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(config: &RecipientConfig) -> RecipientRow {
        RecipientRow {
            recipient_id: config.recipient_id.get(),
            api_key: config.api_key.reveal().to_string(),
            daily_report_time: config.daily_report_time.format(TIME_FORMAT).to_string(),
            updated_at: encode_instant(config.updated_at),
        }
    }

    fn from_row(row: RecipientRow) -> Result<RecipientConfig> {
        let daily_report_time = NaiveTime::parse_from_str(&row.daily_report_time, TIME_FORMAT)
            .map_err(|e| Error::Parse(format!("bad report time {:?}: {e}", row.daily_report_time)))?;
        Ok(RecipientConfig {
            recipient_id: RecipientId::new(row.recipient_id),
            api_key: Credential::new(row.api_key),
            daily_report_time,
            updated_at: decode_instant(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl RecipientStore for SqliteRecipientStore {
    async fn upsert(&self, config: &RecipientConfig) -> Result<()> {
        let row = Self::to_row(config);
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        diesel::replace_into(recipients::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, id: RecipientId) -> Result<Option<RecipientConfig>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let row: Option<RecipientRow> = recipients::table
            .find(id.get())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(Self::from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<RecipientConfig>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<RecipientRow> = recipients::table
            .order(recipients::recipient_id.asc())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;

    fn config(id: i64, key: &str, hh: u32) -> RecipientConfig {
        RecipientConfig::new(
            RecipientId::new(id),
            Credential::new(key),
            NaiveTime::from_hms_opt(hh, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn upsert_then_get() {
        let store = SqliteRecipientStore::new(open(":memory:").unwrap());
        store.upsert(&config(5, "secret", 16)).await.unwrap();

        let loaded = store.get(RecipientId::new(5)).await.unwrap().unwrap();
        assert_eq!(loaded.api_key.reveal(), "secret");
        assert_eq!(loaded.daily_report_time, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert!(store.get(RecipientId::new(6)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing() {
        let store = SqliteRecipientStore::new(open(":memory:").unwrap());
        store.upsert(&config(5, "old", 16)).await.unwrap();
        store.upsert(&config(5, "new", 9)).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].api_key.reveal(), "new");
        assert_eq!(all[0].daily_report_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = SqliteRecipientStore::new(open(":memory:").unwrap());
        store.upsert(&config(30, "c", 1)).await.unwrap();
        store.upsert(&config(10, "a", 1)).await.unwrap();
        store.upsert(&config(20, "b", 1)).await.unwrap();

        let ids: Vec<i64> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.recipient_id.get())
            .collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }
}
