//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`channel`]: `RecordingChannel`, a [`Channel`](crate::port::Channel)
//!   that records calls and fails on command.
//! - [`source`]: `ScriptedOrderSource`, canned fetch results.
//! - [`domain`]: builders for orders, items and recipients.
//! - [`harness`]: a fully wired in-memory orchestrator.

pub mod channel;
pub mod domain;
pub mod harness;
pub mod source;
