//! In-memory adapters.
//!
//! Nothing here survives a restart; used when `[dedup] backend = "memory"`
//! and in tests.

mod dedup;
mod recipient;

pub use dedup::InMemoryDedupStore;
pub use recipient::InMemoryRecipientStore;
