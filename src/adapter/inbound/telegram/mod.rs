//! Telegram command handling.
//!
//! Parsing and execution are plain Rust; only the listener needs teloxide.

pub mod command;
pub mod control;
#[cfg(feature = "telegram")]
pub mod handler;

pub use control::{RegistrationDefaults, TelegramControl};
