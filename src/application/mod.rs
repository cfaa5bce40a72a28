//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the notification pipeline.

pub mod digest;
pub mod dispatch;
pub mod format;
pub mod orchestration;
pub mod split;

pub use dispatch::{DeliveryOutcome, DeliveryTier, DispatchPolicy, Dispatcher};
pub use format::{MessageFormatter, RenderedMessage};
pub use orchestration::{CheckReport, DigestOutcome, Orchestrator, PipelineSettings, TickSummary};
