//! Recipient configuration persistence port.

use async_trait::async_trait;

use crate::domain::{RecipientConfig, RecipientId};
use crate::error::Result;

/// Storage for per-recipient settings.
///
/// Written by the command layer; read-only for the notification pipeline.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    /// Insert or replace the configuration for a recipient.
    async fn upsert(&self, config: &RecipientConfig) -> Result<()>;

    /// Get one recipient's configuration.
    async fn get(&self, id: RecipientId) -> Result<Option<RecipientConfig>>;

    /// All known recipients, ordered by id.
    async fn list(&self) -> Result<Vec<RecipientConfig>>;
}
