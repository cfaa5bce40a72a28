//! Infrastructure configuration modules.

pub mod dedup;
pub mod logging;
pub mod schedule;
pub mod settings;
pub mod telegram;
