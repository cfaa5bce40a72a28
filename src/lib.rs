//! orderbell - announce new seller orders to Telegram, once each.
//!
//! The crate polls a seller order API, decides which orders and line items
//! have not been announced yet, renders a bounded notification, and gets it
//! out over a rate-limited chat channel, degrading from media groups to
//! single photos to plain text when the channel refuses richer messages.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Orders, dedup keys and recipients; no I/O
//! - [`port`] - Traits for the order source, stores and chat channel
//! - [`application`] - Formatting, splitting, dispatch and orchestration
//! - [`adapter`] - Seller API client, SQLite and in-memory stores, Telegram,
//!   and the CLI
//! - [`infrastructure`] - Configuration, scheduler and wiring
//!
//! # Features
//!
//! - `telegram` (default) - Telegram channel and command listener
//! - `testkit` - Test doubles for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
