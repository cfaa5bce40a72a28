//! Outbound adapters (driven side).

pub mod memory;
pub mod sqlite;
#[cfg(feature = "telegram")]
pub mod telegram;
pub mod uzum;
