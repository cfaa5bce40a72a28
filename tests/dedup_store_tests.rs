//! The same store contract, run against every backend.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use orderbell::adapter::outbound::memory::InMemoryDedupStore;
use orderbell::adapter::outbound::sqlite::database::connection;
use orderbell::adapter::outbound::sqlite::{SqliteDedupStore, SqliteRecipientStore};
use orderbell::domain::{DedupKey, RecipientId};
use orderbell::error::{ConfigError, Error};
use orderbell::port::{DedupStore, RecipientStore};
use orderbell::testkit::domain::recipient;

/// Keeps the temporary directory alive as long as the store.
struct Backend {
    store: Arc<dyn DedupStore>,
    _dir: Option<TempDir>,
}

fn backends() -> Vec<Backend> {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("dedup.db");
    let pool = connection::open(path.to_str().expect("utf-8 path")).expect("open sqlite");

    vec![
        Backend {
            store: Arc::new(InMemoryDedupStore::new()),
            _dir: None,
        },
        Backend {
            store: Arc::new(SqliteDedupStore::new(pool)),
            _dir: Some(dir),
        },
    ]
}

#[tokio::test]
async fn record_is_idempotent() {
    for backend in backends() {
        let store = &backend.store;
        let key = DedupKey::new("1:42_0");

        assert!(store.is_new(&key).await.unwrap(), "{}", store.backend_name());
        store.record(&key).await.unwrap();
        store.record(&key).await.unwrap();

        assert!(!store.is_new(&key).await.unwrap(), "{}", store.backend_name());
        assert_eq!(store.len().await.unwrap(), 1, "{}", store.backend_name());
    }
}

#[tokio::test]
async fn keys_are_independent() {
    for backend in backends() {
        let store = &backend.store;
        store.record(&DedupKey::new("1:42_0")).await.unwrap();

        assert!(store.is_new(&DedupKey::new("1:42_1")).await.unwrap());
        assert!(store.is_new(&DedupKey::new("2:42_0")).await.unwrap());
    }
}

#[tokio::test]
async fn expiry_respects_retention_boundary() {
    let retention = Duration::hours(48);
    for backend in backends() {
        let store = &backend.store;
        let now = Utc::now();
        let expired = DedupKey::new("expired");
        let kept = DedupKey::new("kept");

        store
            .record_at(&expired, now - retention - Duration::seconds(1))
            .await
            .unwrap();
        store
            .record_at(&kept, now - retention + Duration::seconds(1))
            .await
            .unwrap();

        let removed = store.purge_before(now - retention).await.unwrap();

        assert_eq!(removed, 1, "{}", store.backend_name());
        assert!(store.is_new(&expired).await.unwrap());
        assert!(!store.is_new(&kept).await.unwrap());
    }
}

#[tokio::test]
async fn purge_older_than_uses_current_time() {
    for backend in backends() {
        let store = &backend.store;
        store
            .record_at(&DedupKey::new("old"), Utc::now() - Duration::hours(72))
            .await
            .unwrap();
        store.record(&DedupKey::new("new")).await.unwrap();

        assert_eq!(store.purge_older_than(Duration::hours(48)).await.unwrap(), 1);
        assert_eq!(store.len().await.unwrap(), 1);
    }
}

#[tokio::test]
async fn unrepresentable_retention_is_an_error() {
    for backend in backends() {
        let store = &backend.store;
        store.record(&DedupKey::new("kept")).await.unwrap();

        let err = store.purge_older_than(Duration::MAX).await.unwrap_err();
        assert!(
            matches!(&err, Error::Config(ConfigError::InvalidValue { field: "retention_hours", .. })),
            "{}: {err}",
            store.backend_name()
        );
        assert_eq!(store.len().await.unwrap(), 1);
    }
}

#[tokio::test]
async fn sqlite_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("orderbell.db");
    let url = path.to_str().unwrap().to_string();
    let key = DedupKey::new("1:42_0");

    {
        let store = SqliteDedupStore::new(connection::open(&url).unwrap());
        store.record(&key).await.unwrap();
    }

    let reopened = SqliteDedupStore::new(connection::open(&url).unwrap());
    assert!(!reopened.is_new(&key).await.unwrap());
}

#[tokio::test]
async fn sqlite_recipients_round_trip_and_replace() {
    let dir = tempfile::tempdir().unwrap();
    let url = dir.path().join("r.db").to_str().unwrap().to_string();
    let store = SqliteRecipientStore::new(connection::open(&url).unwrap());

    store.upsert(&recipient(2)).await.unwrap();
    store.upsert(&recipient(1)).await.unwrap();
    let mut updated = recipient(2);
    updated.daily_report_time = chrono::NaiveTime::from_hms_opt(8, 15, 0).unwrap();
    store.upsert(&updated).await.unwrap();

    let all = store.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].recipient_id, RecipientId::new(1));
    assert_eq!(all[1].daily_report_time, updated.daily_report_time);
    assert_eq!(all[1].api_key, updated.api_key);
    assert!(store.get(RecipientId::new(3)).await.unwrap().is_none());
}
