//! Telegram outbound channel.
//!
//! Requires the `telegram` feature to be enabled.

mod channel;

pub use channel::TelegramChannel;
