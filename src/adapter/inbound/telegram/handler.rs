//! Telegram command listener.
//!
//! Requires the `telegram` feature to be enabled.

use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{error, info, warn};

use crate::domain::RecipientId;

use super::command::bot_commands;
use super::control::TelegramControl;

/// Chats allowed to issue commands; empty allows everyone.
#[derive(Debug, Clone, Default)]
pub struct ChatAllowlist(Vec<i64>);

impl ChatAllowlist {
    #[must_use]
    pub fn new(chats: Vec<i64>) -> Self {
        Self(chats)
    }

    #[must_use]
    pub fn allows(&self, chat: ChatId) -> bool {
        if self.0.is_empty() || self.0.contains(&chat.0) {
            return true;
        }
        warn!(chat_id = chat.0, "Ignoring Telegram message from unauthorized chat");
        false
    }
}

/// Optionally register the command menu, then answer commands until shutdown.
pub async fn run_command_listener(
    bot: Bot,
    control: TelegramControl,
    allowlist: ChatAllowlist,
    register_commands: bool,
) {
    // Register commands with Telegram so they appear in the "/" menu
    if register_commands {
        if let Err(e) = register_bot_commands(&bot).await {
            warn!(error = %e, "Failed to register bot commands with Telegram");
        }
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        let allowlist = allowlist.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };
            if !allowlist.allows(msg.chat.id) {
                return respond(());
            }

            let replies = control.respond(RecipientId::new(msg.chat.id.0), text).await;
            for reply in replies {
                if let Err(e) = bot.send_message(msg.chat.id, reply).await {
                    error!(error = %e, "Failed to send Telegram command response");
                }
            }

            respond(())
        }
    })
    .await;
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allowlist_allows_everyone() {
        assert!(ChatAllowlist::default().allows(ChatId(5)));
    }

    #[test]
    fn allowlist_filters_chats() {
        let allowlist = ChatAllowlist::new(vec![1, 2]);
        assert!(allowlist.allows(ChatId(2)));
        assert!(!allowlist.allows(ChatId(3)));
    }
}
