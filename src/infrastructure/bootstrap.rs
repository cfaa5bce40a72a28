//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::adapter::outbound::memory::InMemoryDedupStore;
use crate::adapter::outbound::sqlite::database::connection::{self, DbPool};
use crate::adapter::outbound::sqlite::{SqliteDedupStore, SqliteRecipientStore};
use crate::application::{Dispatcher, Orchestrator};
use crate::error::Result;
use crate::infrastructure::config::dedup::DedupBackend;
use crate::infrastructure::config::settings::Config;
use crate::port::{Channel, DedupStore, OrderSource, RecipientStore};

/// Open the database and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or migrated.
pub fn open_database(config: &Config) -> Result<DbPool> {
    let pool = connection::open(&config.database)?;
    info!(database = %config.database, "Database initialized");
    Ok(pool)
}

/// Dedup store for the configured backend.
#[must_use]
pub fn build_dedup_store(config: &Config, pool: &DbPool) -> Arc<dyn DedupStore> {
    match config.dedup.backend {
        DedupBackend::Memory => Arc::new(InMemoryDedupStore::new()),
        DedupBackend::Sqlite => Arc::new(SqliteDedupStore::new(pool.clone())),
    }
}

#[must_use]
pub fn build_recipient_store(pool: &DbPool) -> Arc<dyn RecipientStore> {
    Arc::new(SqliteRecipientStore::new(pool.clone()))
}

/// Register the configured chat, if any.
///
/// A new chat gets the default report time. A known chat keeps its report
/// time and only has its credential refreshed when it changed.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn seed_recipient(config: &Config, store: &dyn RecipientStore) -> Result<()> {
    let Some(seed) = config.seed_recipient()? else {
        return Ok(());
    };

    match store.get(seed.recipient_id).await? {
        None => {
            store.upsert(&seed).await?;
            info!(recipient = %seed.recipient_id, "Registered configured recipient");
        }
        Some(mut existing) if existing.api_key != seed.api_key => {
            existing.api_key = seed.api_key;
            existing.updated_at = chrono::Utc::now();
            store.upsert(&existing).await?;
            info!(recipient = %existing.recipient_id, "Refreshed configured recipient credential");
        }
        Some(_) => {}
    }
    Ok(())
}

/// Assemble the orchestrator from its collaborators.
///
/// # Errors
///
/// Returns an error if the pipeline settings are invalid.
pub fn build_orchestrator(
    config: &Config,
    source: Arc<dyn OrderSource>,
    channel: Arc<dyn Channel>,
    dedup: Arc<dyn DedupStore>,
    recipients: Arc<dyn RecipientStore>,
) -> Result<Arc<Orchestrator>> {
    let dispatcher = Dispatcher::new(channel, config.schedule.dispatch_policy());
    let orchestrator = Orchestrator::new(
        source,
        dedup,
        recipients,
        dispatcher,
        config.pipeline_settings()?,
    );
    Ok(Arc::new(orchestrator))
}

/// Delete expired dedup records once.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the purge fails.
pub async fn purge_once(config: &Config) -> Result<usize> {
    let pool = open_database(config)?;
    let dedup = build_dedup_store(config, &pool);
    let removed = dedup.purge_older_than(config.dedup.retention()).await?;
    info!(
        removed,
        backend = dedup.backend_name(),
        retention_hours = config.dedup.retention_hours,
        "Purged expired notification records"
    );
    Ok(removed)
}

/// Run the service until `shutdown` flips to `true`.
///
/// # Errors
///
/// Returns an error if the bot token is missing or startup wiring fails.
#[cfg(feature = "telegram")]
pub async fn run_with_shutdown(config: Config, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    use teloxide::Bot;

    use crate::adapter::inbound::telegram::handler::{run_command_listener, ChatAllowlist};
    use crate::adapter::inbound::telegram::{RegistrationDefaults, TelegramControl};
    use crate::adapter::outbound::telegram::TelegramChannel;
    use crate::adapter::outbound::uzum::UzumClient;
    use crate::infrastructure::scheduler::{stopped, Scheduler, SchedulerConfig};

    let token = config.bot_token()?.to_string();
    info!(
        shop_id = %config.source.shop_id,
        dedup = %config.dedup.backend,
        granularity = %config.dedup.granularity,
        "Starting orderbell"
    );

    let pool = open_database(&config)?;
    let dedup = build_dedup_store(&config, &pool);
    let recipients = build_recipient_store(&pool);
    seed_recipient(&config, recipients.as_ref()).await?;

    let bot = Bot::new(token);
    let source: Arc<dyn OrderSource> = Arc::new(UzumClient::from_config(&config.source));
    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(bot.clone()));
    let orchestrator = build_orchestrator(&config, source, channel, dedup, recipients)?;

    let scheduler = Scheduler::start(
        Arc::clone(&orchestrator),
        SchedulerConfig::from_config(&config),
        &shutdown,
    );

    let listener = if config.telegram.commands_enabled {
        let control = TelegramControl::new(
            Arc::clone(&orchestrator),
            RegistrationDefaults {
                api_key: config.default_credential(),
                report_time: config.default_report_time()?,
            },
        );
        let allowlist = ChatAllowlist::new(config.telegram.allowed_chats.clone());
        Some(tokio::spawn(run_command_listener(
            bot,
            control,
            allowlist,
            config.telegram.register_commands,
        )))
    } else {
        None
    };

    stopped(&mut shutdown).await;
    info!("Shutting down");
    if let Some(listener) = listener {
        listener.abort();
    }
    scheduler.join().await;
    Ok(())
}

/// Without the `telegram` feature there is no channel to deliver to.
///
/// # Errors
///
/// Always.
#[cfg(not(feature = "telegram"))]
pub async fn run_with_shutdown(_config: Config, _shutdown: watch::Receiver<bool>) -> Result<()> {
    Err(crate::error::ConfigError::InvalidValue {
        field: "telegram",
        reason: "built without the telegram feature".to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::InMemoryRecipientStore;
    use crate::domain::{Credential, RecipientId};

    fn config(toml: &str) -> Config {
        Config::parse_toml_with_env(toml, |_| None).unwrap()
    }

    const BASE: &str = r#"
database = ":memory:"
[source]
shop_id = "77"
api_key = "key-a"
[telegram]
chat_id = 10
"#;

    #[tokio::test]
    async fn seed_registers_new_chat() {
        let store = InMemoryRecipientStore::new();
        seed_recipient(&config(BASE), &store).await.unwrap();

        let seeded = store.get(RecipientId::new(10)).await.unwrap().unwrap();
        assert_eq!(seeded.api_key, Credential::new("key-a"));
        assert_eq!(seeded.daily_report_time.to_string(), "16:00:00");
    }

    #[tokio::test]
    async fn seed_keeps_report_time_and_refreshes_key() {
        let store = InMemoryRecipientStore::new();
        seed_recipient(&config(BASE), &store).await.unwrap();

        let mut custom = store.get(RecipientId::new(10)).await.unwrap().unwrap();
        custom.daily_report_time = chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        store.upsert(&custom).await.unwrap();

        let rotated = config(&BASE.replace("key-a", "key-b"));
        seed_recipient(&rotated, &store).await.unwrap();

        let seeded = store.get(RecipientId::new(10)).await.unwrap().unwrap();
        assert_eq!(seeded.api_key, Credential::new("key-b"));
        assert_eq!(seeded.daily_report_time.to_string(), "09:30:00");
    }

    #[tokio::test]
    async fn no_seed_without_chat_id() {
        let store = InMemoryRecipientStore::new();
        let toml = BASE.replace("chat_id = 10", "");
        seed_recipient(&config(&toml), &store).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_backend_ignores_database_for_dedup() {
        let config = config(&format!("{BASE}\n[dedup]\nbackend = \"memory\"\n"));
        let pool = open_database(&config).unwrap();
        assert_eq!(build_dedup_store(&config, &pool).backend_name(), "memory");
    }

    #[tokio::test]
    async fn purge_once_on_fresh_database_removes_nothing() {
        assert_eq!(purge_once(&config(BASE)).await.unwrap(), 0);
    }
}
