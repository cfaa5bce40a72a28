//! Inbound adapters (driving side): the CLI and Telegram commands.

pub mod cli;
pub mod telegram;
