//! SQLite persistence adapters.
//!
//! Diesel-backed implementations of the dedup and recipient stores. Both
//! share one pool opened by [`database::connection::open`].

pub mod database;
mod dedup;
mod recipient;

pub use dedup::SqliteDedupStore;
pub use recipient::SqliteRecipientStore;
