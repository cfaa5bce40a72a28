//! Recording [`Channel`] with scripted failures.
//!
//! Every call is recorded as an attempt; calls that succeed are also
//! recorded as sent. Failure rules are checked in insertion order and the
//! first match wins.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::RecipientId;
use crate::error::ChannelError;
use crate::port::{Channel, MediaItem, TextFormat};

/// Kind of channel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    Text,
    Photo,
    MediaGroup,
}

/// A recorded channel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        recipient: RecipientId,
        text: String,
        format: TextFormat,
    },
    Photo {
        recipient: RecipientId,
        url: String,
        caption: Option<String>,
    },
    MediaGroup {
        recipient: RecipientId,
        items: Vec<MediaItem>,
    },
}

impl Sent {
    pub const fn kind(&self) -> SendKind {
        match self {
            Self::Text { .. } => SendKind::Text,
            Self::Photo { .. } => SendKind::Photo,
            Self::MediaGroup { .. } => SendKind::MediaGroup,
        }
    }

    pub const fn recipient(&self) -> RecipientId {
        match self {
            Self::Text { recipient, .. }
            | Self::Photo { recipient, .. }
            | Self::MediaGroup { recipient, .. } => *recipient,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        match self {
            Self::Text { text, .. } => text.contains(needle),
            Self::Photo { url, .. } => url.contains(needle),
            Self::MediaGroup { items, .. } => items.iter().any(|item| item.url.contains(needle)),
        }
    }
}

struct FailureRule {
    kind: SendKind,
    needle: Option<String>,
    error: ChannelError,
    /// `None` means the rule never runs out.
    remaining: Option<usize>,
}

#[derive(Default)]
pub struct RecordingChannel {
    attempts: Mutex<Vec<Sent>>,
    sent: Mutex<Vec<Sent>>,
    rules: Mutex<Vec<FailureRule>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `kind`.
    pub fn fail_always(self, kind: SendKind, error: ChannelError) -> Self {
        self.push_rule(kind, None, error, None)
    }

    /// Fail calls of `kind` whose text or URL contains `needle`.
    pub fn fail_matching(self, kind: SendKind, needle: &str, error: ChannelError) -> Self {
        self.push_rule(kind, Some(needle.to_string()), error, None)
    }

    /// Fail only the next call of `kind`.
    pub fn fail_once(self, kind: SendKind, error: ChannelError) -> Self {
        self.push_rule(kind, None, error, Some(1))
    }

    fn push_rule(
        self,
        kind: SendKind,
        needle: Option<String>,
        error: ChannelError,
        remaining: Option<usize>,
    ) -> Self {
        self.rules.lock().push(FailureRule {
            kind,
            needle,
            error,
            remaining,
        });
        self
    }

    /// Every call made, successful or not.
    pub fn attempts(&self) -> Vec<Sent> {
        self.attempts.lock().clone()
    }

    /// Calls that succeeded.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Successful calls of one kind.
    pub fn sent_of(&self, kind: SendKind) -> Vec<Sent> {
        self.sent
            .lock()
            .iter()
            .filter(|sent| sent.kind() == kind)
            .cloned()
            .collect()
    }

    /// Texts of successful text messages, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|sent| match sent {
                Sent::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.attempts.lock().clear();
        self.sent.lock().clear();
    }

    fn handle(&self, call: Sent) -> Result<(), ChannelError> {
        self.attempts.lock().push(call.clone());

        let failure = {
            let mut rules = self.rules.lock();
            let matched = rules.iter_mut().find(|rule| {
                rule.kind == call.kind()
                    && rule.remaining != Some(0)
                    && rule
                        .needle
                        .as_deref()
                        .map_or(true, |needle| call.matches(needle))
            });
            matched.map(|rule| {
                if let Some(remaining) = rule.remaining.as_mut() {
                    *remaining -= 1;
                }
                rule.error.clone()
            })
        };

        match failure {
            Some(error) => Err(error),
            None => {
                self.sent.lock().push(call);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send_text(
        &self,
        recipient: RecipientId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChannelError> {
        self.handle(Sent::Text {
            recipient,
            text: text.to_string(),
            format,
        })
    }

    async fn send_photo(
        &self,
        recipient: RecipientId,
        url: &str,
        caption: Option<&str>,
        _format: TextFormat,
    ) -> Result<(), ChannelError> {
        self.handle(Sent::Photo {
            recipient,
            url: url.to_string(),
            caption: caption.map(ToOwned::to_owned),
        })
    }

    async fn send_media_group(
        &self,
        recipient: RecipientId,
        items: &[MediaItem],
    ) -> Result<(), ChannelError> {
        self.handle(Sent::MediaGroup {
            recipient,
            items: items.to_vec(),
        })
    }
}
