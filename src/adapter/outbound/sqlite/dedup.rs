//! SQLite dedup store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::database::connection::DbPool;
use super::database::model::{encode_instant, NotificationRecordRow};
use super::database::schema::notification_records;
use crate::domain::DedupKey;
use crate::error::{Error, Result};
use crate::port::DedupStore;

/// SQLite-backed dedup store; survives restarts.
pub struct SqliteDedupStore {
    pool: DbPool,
}

impl SqliteDedupStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    async fn is_new(&self, key: &DedupKey) -> Result<bool> {
        let mut conn = self.conn()?;
        let found: Option<String> = notification_records::table
            .find(key.as_str())
            .select(notification_records::key)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(found.is_none())
    }

    async fn record_at(&self, key: &DedupKey, at: DateTime<Utc>) -> Result<()> {
        let row = NotificationRecordRow {
            key: key.as_str().to_string(),
            recorded_at: encode_instant(at),
        };
        let mut conn = self.conn()?;
        diesel::insert_or_ignore_into(notification_records::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = encode_instant(cutoff);
        let mut conn = self.conn()?;
        diesel::delete(notification_records::table.filter(notification_records::recorded_at.lt(&cutoff)))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn len(&self) -> Result<usize> {
        let mut conn = self.conn()?;
        let count: i64 = notification_records::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        usize::try_from(count).map_err(|e| Error::Database(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
