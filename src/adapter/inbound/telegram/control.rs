//! Command execution against the orchestrator and recipient store.
//!
//! Kept free of teloxide so the replies can be tested directly.

use std::sync::Arc;

use chrono::NaiveTime;
use tracing::{info, warn};

use crate::application::{DigestOutcome, Orchestrator};
use crate::domain::{Credential, RecipientConfig, RecipientId};

use super::command::{command_help, parse_command, CommandParseError, TelegramCommand};

pub const STARTED_REPLY: &str = "Бот запущен! Теперь я буду отправлять уведомления сюда.";
pub const NOT_CONFIGURED_REPLY: &str =
    "Ключ API не настроен. Отправьте /config <api_key> [ЧЧ:ММ].";
pub const STORE_FAILURE_REPLY: &str = "❌ Не удалось сохранить настройки, попробуйте позже.";
pub const REPORT_FAILED_REPLY: &str = "❌ Не удалось отправить ежедневный отчет.";

/// Defaults applied to chats that register with `/start`.
#[derive(Debug, Clone)]
pub struct RegistrationDefaults {
    pub api_key: Option<Credential>,
    pub report_time: NaiveTime,
}

/// Runs parsed commands and produces reply texts.
#[derive(Clone)]
pub struct TelegramControl {
    orchestrator: Arc<Orchestrator>,
    defaults: RegistrationDefaults,
}

impl TelegramControl {
    pub fn new(orchestrator: Arc<Orchestrator>, defaults: RegistrationDefaults) -> Self {
        Self {
            orchestrator,
            defaults,
        }
    }

    /// Handle one incoming message. Non-commands get no reply.
    pub async fn respond(&self, chat: RecipientId, text: &str) -> Vec<String> {
        match parse_command(text) {
            Ok(command) => self.execute(chat, command).await,
            Err(CommandParseError::NotACommand) => Vec::new(),
            Err(err) => vec![format!("Неверная команда: {err}\n\n{}", command_help())],
        }
    }

    pub async fn execute(&self, chat: RecipientId, command: TelegramCommand) -> Vec<String> {
        match command {
            TelegramCommand::Start => vec![self.start(chat).await],
            TelegramCommand::Help => vec![command_help().to_string()],
            TelegramCommand::Check => self.check(chat).await,
            TelegramCommand::Report => self.report(chat).await,
            TelegramCommand::Config {
                api_key,
                report_time,
            } => vec![self.configure(chat, api_key, report_time).await],
        }
    }

    async fn start(&self, chat: RecipientId) -> String {
        match self.recipient(chat).await {
            Ok(Some(_)) => return STARTED_REPLY.to_string(),
            Ok(None) => {}
            Err(reply) => return reply,
        }

        let Some(api_key) = self.defaults.api_key.clone() else {
            return NOT_CONFIGURED_REPLY.to_string();
        };
        let config = RecipientConfig::new(chat, api_key, self.defaults.report_time);
        if let Err(error) = self.orchestrator.recipients().upsert(&config).await {
            warn!(recipient = %chat, error = %error, "Failed to register recipient");
            return STORE_FAILURE_REPLY.to_string();
        }
        info!(recipient = %chat, "Recipient registered");
        STARTED_REPLY.to_string()
    }

    async fn configure(
        &self,
        chat: RecipientId,
        api_key: String,
        report_time: Option<NaiveTime>,
    ) -> String {
        let existing = match self.recipient(chat).await {
            Ok(existing) => existing,
            Err(reply) => return reply,
        };
        let report_time = report_time
            .or_else(|| existing.map(|c| c.daily_report_time))
            .unwrap_or(self.defaults.report_time);

        let config = RecipientConfig::new(chat, Credential::new(api_key), report_time);
        if let Err(error) = self.orchestrator.recipients().upsert(&config).await {
            warn!(recipient = %chat, error = %error, "Failed to save recipient config");
            return STORE_FAILURE_REPLY.to_string();
        }
        info!(recipient = %chat, report_time = %report_time.format("%H:%M"), "Recipient configured");
        format!(
            "✅ Настройки сохранены. Ежедневный отчет в {}.",
            report_time.format("%H:%M")
        )
    }

    async fn check(&self, chat: RecipientId) -> Vec<String> {
        let config = match self.recipient(chat).await {
            Ok(Some(config)) => config,
            Ok(None) => return vec![NOT_CONFIGURED_REPLY.to_string()],
            Err(reply) => return vec![reply],
        };
        self.orchestrator
            .check(chat, &config.api_key)
            .await
            .replies()
    }

    async fn report(&self, chat: RecipientId) -> Vec<String> {
        let config = match self.recipient(chat).await {
            Ok(Some(config)) => config,
            Ok(None) => return vec![NOT_CONFIGURED_REPLY.to_string()],
            Err(reply) => return vec![reply],
        };
        let today = self.orchestrator.today();
        match self.orchestrator.daily_digest(&config, today).await {
            DigestOutcome::Failed => vec![REPORT_FAILED_REPLY.to_string()],
            _ => Vec::new(),
        }
    }

    async fn recipient(&self, chat: RecipientId) -> Result<Option<RecipientConfig>, String> {
        self.orchestrator
            .recipients()
            .get(chat)
            .await
            .map_err(|error| {
                warn!(recipient = %chat, error = %error, "Failed to load recipient");
                STORE_FAILURE_REPLY.to_string()
            })
    }
}
