//! Telegram command parsing.

use chrono::NaiveTime;

use crate::domain::recipient::parse_report_time;

/// Supported Telegram commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramCommand {
    Start,
    Help,
    Check,
    Report,
    Config {
        api_key: String,
        report_time: Option<NaiveTime>,
    },
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidTime(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "сообщение не является командой"),
            Self::UnknownCommand(cmd) => write!(f, "неизвестная команда `{cmd}`"),
            Self::MissingArgument(name) => write!(f, "не указан аргумент `{name}`"),
            Self::InvalidTime(value) => {
                write!(f, "неверное время `{value}`, ожидается формат ЧЧ:ММ")
            }
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command.
pub fn parse_command(text: &str) -> Result<TelegramCommand, CommandParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(TelegramCommand::Start),
        "/help" => Ok(TelegramCommand::Help),
        "/check" => Ok(TelegramCommand::Check),
        "/report" => Ok(TelegramCommand::Report),
        "/config" => {
            let api_key = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("api_key"))?;
            let report_time = parts
                .next()
                .map(|raw| {
                    parse_report_time(raw).ok_or_else(|| CommandParseError::InvalidTime(raw.to_string()))
                })
                .transpose()?;

            Ok(TelegramCommand::Config {
                api_key: api_key.to_string(),
                report_time,
            })
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Help text returned by `/help` and on parse errors.
#[must_use]
pub const fn command_help() -> &'static str {
    "📋 Команды\n\n\
    /start - 🔔 Получать уведомления о заказах в этот чат\n\
    /check - 🔍 Отправить все текущие заказы\n\
    /report - 📊 Ежедневный отчет прямо сейчас\n\
    /config <api_key> [ЧЧ:ММ] - ⚙️ Ключ API и время отчета\n\
    /help - 📋 Список команд"
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Получать уведомления о заказах"),
        ("check", "Отправить все текущие заказы"),
        ("report", "Ежедневный отчет сейчас"),
        ("config", "Ключ API и время отчета"),
        ("help", "Список команд"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_basic_commands() {
        assert_eq!(parse_command("/start").unwrap(), TelegramCommand::Start);
        assert_eq!(parse_command("/help").unwrap(), TelegramCommand::Help);
        assert_eq!(parse_command("/check").unwrap(), TelegramCommand::Check);
        assert_eq!(parse_command("/report").unwrap(), TelegramCommand::Report);
    }

    #[test]
    fn parse_command_with_bot_mention() {
        assert_eq!(
            parse_command("/check@orderbell_bot").unwrap(),
            TelegramCommand::Check
        );
    }

    #[test]
    fn parse_config_with_and_without_time() {
        assert_eq!(
            parse_command("/config abc+def=").unwrap(),
            TelegramCommand::Config {
                api_key: "abc+def=".into(),
                report_time: None,
            }
        );
        assert_eq!(
            parse_command("/config key 09:30").unwrap(),
            TelegramCommand::Config {
                api_key: "key".into(),
                report_time: NaiveTime::from_hms_opt(9, 30, 0),
            }
        );
    }

    #[test]
    fn parse_config_errors() {
        assert_eq!(
            parse_command("/config"),
            Err(CommandParseError::MissingArgument("api_key"))
        );
        assert_eq!(
            parse_command("/config key 9am"),
            Err(CommandParseError::InvalidTime("9am".into()))
        );
    }

    #[test]
    fn non_commands_and_unknown_commands() {
        assert_eq!(parse_command("hello"), Err(CommandParseError::NotACommand));
        assert_eq!(parse_command("   "), Err(CommandParseError::NotACommand));
        assert_eq!(
            parse_command("/status"),
            Err(CommandParseError::UnknownCommand("/status".into()))
        );
    }

    #[test]
    fn menu_lists_every_command() {
        let names: Vec<_> = bot_commands().into_iter().map(|(name, _)| name).collect();
        for name in ["start", "check", "report", "config", "help"] {
            assert!(names.contains(&name), "missing {name}");
            assert!(command_help().contains(&format!("/{name}")));
        }
    }
}
