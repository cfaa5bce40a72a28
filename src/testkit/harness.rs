//! A fully wired orchestrator over in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::outbound::memory::{InMemoryDedupStore, InMemoryRecipientStore};
use crate::application::{DispatchPolicy, Dispatcher, Orchestrator, PipelineSettings};
use crate::domain::RecipientConfig;

use super::channel::RecordingChannel;
use super::source::ScriptedOrderSource;

/// No pacing and a tiny backoff cap, so tests never wait.
pub fn instant_policy() -> DispatchPolicy {
    DispatchPolicy {
        pacing: Duration::ZERO,
        max_retry_after: Duration::from_millis(5),
    }
}

pub struct Harness {
    pub source: Arc<ScriptedOrderSource>,
    pub channel: Arc<RecordingChannel>,
    pub dedup: Arc<InMemoryDedupStore>,
    pub recipients: Arc<InMemoryRecipientStore>,
    pub orchestrator: Arc<Orchestrator>,
}

impl Harness {
    pub fn new(
        source: ScriptedOrderSource,
        channel: RecordingChannel,
        recipients: Vec<RecipientConfig>,
    ) -> Self {
        Self::with_settings(source, channel, recipients, PipelineSettings::default())
    }

    pub fn with_settings(
        source: ScriptedOrderSource,
        channel: RecordingChannel,
        recipients: Vec<RecipientConfig>,
        settings: PipelineSettings,
    ) -> Self {
        let source = Arc::new(source);
        let channel = Arc::new(channel);
        let dedup = Arc::new(InMemoryDedupStore::new());
        let recipients = Arc::new(InMemoryRecipientStore::with(recipients));
        let dispatcher = Dispatcher::new(channel.clone(), instant_policy());
        let orchestrator = Arc::new(Orchestrator::new(
            source.clone(),
            dedup.clone(),
            recipients.clone(),
            dispatcher,
            settings,
        ));

        Self {
            source,
            channel,
            dedup,
            recipients,
            orchestrator,
        }
    }
}
