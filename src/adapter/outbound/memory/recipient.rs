//! In-memory recipient store.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{RecipientConfig, RecipientId};
use crate::error::Result;
use crate::port::RecipientStore;

#[derive(Debug, Default)]
pub struct InMemoryRecipientStore {
    recipients: DashMap<RecipientId, RecipientConfig>,
}

impl InMemoryRecipientStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `configs`.
    #[must_use]
    pub fn with(configs: impl IntoIterator<Item = RecipientConfig>) -> Self {
        let store = Self::new();
        for config in configs {
            store.recipients.insert(config.recipient_id, config);
        }
        store
    }
}

#[async_trait]
impl RecipientStore for InMemoryRecipientStore {
    async fn upsert(&self, config: &RecipientConfig) -> Result<()> {
        self.recipients.insert(config.recipient_id, config.clone());
        Ok(())
    }

    async fn get(&self, id: RecipientId) -> Result<Option<RecipientConfig>> {
        Ok(self.recipients.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<RecipientConfig>> {
        let mut all: Vec<RecipientConfig> = self
            .recipients
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|config| config.recipient_id);
        Ok(all)
    }
}
