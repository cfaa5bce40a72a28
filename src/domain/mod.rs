//! Core domain types: orders, recipients, dedup keys.

pub mod dedup;
pub mod id;
pub mod order;
pub mod recipient;

pub use dedup::DedupGranularity;
pub use id::{Credential, DedupKey, OrderId, RecipientId};
pub use order::{Order, OrderItem};
pub use recipient::RecipientConfig;
