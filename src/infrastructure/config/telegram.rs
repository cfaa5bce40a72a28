//! Telegram bot configuration.

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

/// Telegram bot configuration.
#[derive(Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Bot token. Overridden by `TELEGRAM_BOT_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
    /// Chat registered at startup with the default credential.
    /// Overridden by `TELEGRAM_CHAT_ID`.
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Chats allowed to issue commands. Empty allows every chat.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
    /// Publish the command menu on startup.
    #[serde(default = "default_true")]
    pub register_commands: bool,
    /// Listen for chat commands. Notifications are sent either way.
    #[serde(default = "default_true")]
    pub commands_enabled: bool,
}

impl TelegramAppConfig {
    /// Token with surrounding whitespace removed, if non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl std::fmt::Debug for TelegramAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAppConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("allowed_chats", &self.allowed_chats)
            .field("register_commands", &self.register_commands)
            .field("commands_enabled", &self.commands_enabled)
            .finish()
    }
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            allowed_chats: Vec::new(),
            register_commands: default_true(),
            commands_enabled: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_missing() {
        let config = TelegramAppConfig {
            token: Some("  ".into()),
            ..Default::default()
        };
        assert!(config.token().is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let config = TelegramAppConfig {
            token: Some("123:secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
