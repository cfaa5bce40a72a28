//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for SQLite databases.

use std::time::Duration;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Applies pragmas to every pooled connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        diesel::sql_query("PRAGMA busy_timeout=5000")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        Ok(())
    }
}

/// Pool sizing and recycling for one database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolLimits {
    max_size: u32,
    max_lifetime: Option<Duration>,
    idle_timeout: Option<Duration>,
}

impl PoolLimits {
    /// `:memory:` gets a single connection that is never recycled: each
    /// SQLite connection opens its own empty in-memory database, so
    /// replacing it would lose every table and record.
    fn for_url(database_url: &str) -> Self {
        if database_url == ":memory:" {
            Self {
                max_size: 1,
                max_lifetime: None,
                idle_timeout: None,
            }
        } else {
            Self {
                max_size: 5,
                max_lifetime: Some(Duration::from_secs(30 * 60)),
                idle_timeout: Some(Duration::from_secs(10 * 60)),
            }
        }
    }
}

/// Create a connection pool for the given database URL.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let limits = PoolLimits::for_url(database_url);
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(limits.max_size)
        .max_lifetime(limits.max_lifetime)
        .idle_timeout(limits.idle_timeout)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

/// Open `database_url`, creating its parent directory, and migrate it.
///
/// # Errors
/// Returns an error if the directory, pool, or migrations fail.
pub fn open(database_url: &str) -> Result<DbPool> {
    if database_url != ":memory:" {
        if let Some(parent) = std::path::Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let pool = create_pool(database_url)?;
    run_migrations(&pool)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct BusyTimeout {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        timeout: i64,
    }

    #[test]
    fn create_pool_with_memory_db() {
        let pool = create_pool(":memory:").unwrap();
        assert!(pool.get().is_ok());
    }

    #[test]
    fn memory_pool_keeps_its_only_connection() {
        let limits = PoolLimits::for_url(":memory:");
        assert_eq!(limits.max_size, 1);
        assert_eq!(limits.max_lifetime, None);
        assert_eq!(limits.idle_timeout, None);

        let file = PoolLimits::for_url("data/orderbell.db");
        assert_eq!(file.max_size, 5);
        assert!(file.max_lifetime.is_some());
        assert!(file.idle_timeout.is_some());
    }

    #[test]
    fn memory_pool_reuses_migrated_connection() {
        let pool = open(":memory:").unwrap();
        for _ in 0..3 {
            let mut conn = pool.get().unwrap();
            let tables = diesel::sql_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name = 'notification_records'",
            )
            .load::<TableName>(&mut conn)
            .unwrap();
            assert_eq!(tables.len(), 1);
        }
        assert_eq!(pool.state().connections, 1);
    }

    #[test]
    fn run_migrations_creates_tables() {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let tables: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        assert_eq!(tables, vec!["notification_records", "recipients"]);
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();
    }

    #[test]
    fn pooled_connections_have_busy_timeout() {
        let pool = create_pool(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        let rows = diesel::sql_query("PRAGMA busy_timeout")
            .load::<BusyTimeout>(&mut conn)
            .unwrap();
        assert_eq!(rows[0].timeout, 5000);
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orders.db");
        let pool = open(path.to_str().unwrap()).unwrap();
        assert!(pool.get().is_ok());
        assert!(path.exists());
    }
}
