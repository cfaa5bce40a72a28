//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Orders  │            │ Dedup /     │              │  Channel  │
//! │ Adapter │            │ Recipients  │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;

pub use outbound::channel::{Channel, MediaItem, TextFormat};
pub use outbound::dedup::DedupStore;
pub use outbound::orders::OrderSource;
pub use outbound::recipient::RecipientStore;
