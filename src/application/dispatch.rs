//! Tiered notification delivery.
//!
//! A rendered message goes out as a media group, a single photo, or plain
//! text, depending on how many images it carries. When the image tier is
//! refused the text still goes out, followed by the images one at a time.
//! Only a refused text is a hard failure.
//!
//! Every send goes through one pacing gate, so successive notifications,
//! individual images and text chunks are spaced by at least
//! [`DispatchPolicy::pacing`]. A `RetryAfter` answer is honoured once.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::RecipientId;
use crate::error::{ChannelError, DeliveryError};
use crate::port::outbound::channel::{MAX_CAPTION_CHARS, MAX_MEDIA_GROUP, MAX_MESSAGE_CHARS};
use crate::port::{Channel, MediaItem, TextFormat};

use super::format::RenderedMessage;
use super::split::split;

/// Appended to the text when its only image could not be sent.
pub const IMAGE_FAILURE_NOTE: &str = "⚠️ Не удалось загрузить изображения";

/// Timing knobs for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Minimum spacing between two sends.
    pub pacing: Duration,
    /// Upper bound on a channel-requested backoff.
    pub max_retry_after: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(500),
            max_retry_after: Duration::from_secs(60),
        }
    }
}

/// The tier that carried a fully delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTier {
    Text,
    Photo,
    MediaGroup,
}

/// Result of a delivery that got the text out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Complete(DeliveryTier),
    /// Text delivered, image tier refused; images retried one by one.
    Partial {
        images_sent: usize,
        images_failed: usize,
    },
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// One channel call, kept as data so it can be replayed after a backoff.
#[derive(Clone, Copy)]
enum Outgoing<'a> {
    Text(&'a str, TextFormat),
    Photo(&'a str, Option<&'a str>, TextFormat),
    MediaGroup(&'a [MediaItem]),
}

impl Outgoing<'_> {
    const fn label(&self) -> &'static str {
        match self {
            Self::Text(..) => "text",
            Self::Photo(..) => "photo",
            Self::MediaGroup(..) => "media_group",
        }
    }
}

/// Sends rendered messages through a [`Channel`].
pub struct Dispatcher {
    channel: Arc<dyn Channel>,
    policy: DispatchPolicy,
    last_send: Mutex<Option<Instant>>,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn Channel>, policy: DispatchPolicy) -> Self {
        Self {
            channel,
            policy,
            last_send: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Deliver a rendered notification.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::TextRejected`] when the text itself could
    /// not be sent. Image failures alone never fail the delivery.
    pub async fn deliver(
        &self,
        recipient: RecipientId,
        message: &RenderedMessage,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let urls: Vec<&str> = message
            .image_urls
            .iter()
            .map(String::as_str)
            .take(MAX_MEDIA_GROUP)
            .collect();

        match urls.as_slice() {
            [] => {
                self.send_text(recipient, &message.text, message.format)
                    .await?;
                Ok(DeliveryOutcome::Complete(DeliveryTier::Text))
            }
            [url] => self.deliver_photo(recipient, message, url).await,
            _ => self.deliver_group(recipient, message, &urls).await,
        }
    }

    /// Send plain text, split into chunks the channel accepts.
    ///
    /// Whitespace-only chunks are skipped. Only a failure of the first
    /// chunk is reported; later failures are logged. Returns the number of
    /// chunks delivered.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::TextRejected`] if the first chunk fails.
    pub async fn deliver_plain(
        &self,
        recipient: RecipientId,
        text: &str,
    ) -> Result<usize, DeliveryError> {
        self.send_text(recipient, text, TextFormat::Plain).await
    }

    async fn deliver_photo(
        &self,
        recipient: RecipientId,
        message: &RenderedMessage,
        url: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let caption = fitting_caption(&message.text);
        let photo = self
            .send(recipient, Outgoing::Photo(url, caption, message.format))
            .await;

        match photo {
            Ok(()) => {
                if caption.is_none() {
                    self.send_text(recipient, &message.text, message.format)
                        .await?;
                }
                Ok(DeliveryOutcome::Complete(DeliveryTier::Photo))
            }
            Err(error) => {
                warn!(%recipient, url, error = %error, "Photo refused, falling back to text");
                let text = format!("{}\n\n{IMAGE_FAILURE_NOTE}", message.text);
                self.send_text(recipient, &text, message.format).await?;
                Ok(DeliveryOutcome::Partial {
                    images_sent: 0,
                    images_failed: 1,
                })
            }
        }
    }

    async fn deliver_group(
        &self,
        recipient: RecipientId,
        message: &RenderedMessage,
        urls: &[&str],
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let caption = fitting_caption(&message.text);
        let items: Vec<MediaItem> = urls
            .iter()
            .enumerate()
            .map(|(index, url)| {
                let item = MediaItem::photo(*url);
                match caption {
                    Some(caption) if index == 0 => item.with_caption(caption, message.format),
                    _ => item,
                }
            })
            .collect();

        match self.send(recipient, Outgoing::MediaGroup(&items)).await {
            Ok(()) => {
                if caption.is_none() {
                    self.send_text(recipient, &message.text, message.format)
                        .await?;
                }
                return Ok(DeliveryOutcome::Complete(DeliveryTier::MediaGroup));
            }
            Err(error) => warn!(
                %recipient,
                images = urls.len(),
                error = %error,
                "Media group refused, sending text and images individually"
            ),
        }

        self.send_text(recipient, &message.text, message.format)
            .await?;

        let mut images_sent = 0;
        let mut images_failed = 0;
        for url in urls {
            match self
                .send(recipient, Outgoing::Photo(url, None, TextFormat::Plain))
                .await
            {
                Ok(()) => images_sent += 1,
                Err(error) => {
                    images_failed += 1;
                    warn!(%recipient, url, error = %error, "Individual image refused");
                }
            }
        }

        Ok(DeliveryOutcome::Partial {
            images_sent,
            images_failed,
        })
    }

    /// Send text in chunks; only the first chunk's failure is fatal.
    async fn send_text(
        &self,
        recipient: RecipientId,
        text: &str,
        format: TextFormat,
    ) -> Result<usize, DeliveryError> {
        let chunks: Vec<String> = split(text, MAX_MESSAGE_CHARS)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();

        let mut delivered = 0;
        for (index, chunk) in chunks.iter().enumerate() {
            match self.send(recipient, Outgoing::Text(chunk, format)).await {
                Ok(()) => delivered += 1,
                Err(error) if index == 0 => return Err(DeliveryError::TextRejected(error)),
                Err(error) => {
                    warn!(%recipient, chunk = index, error = %error, "Text chunk refused");
                }
            }
        }
        Ok(delivered)
    }

    /// One paced send, retried once after a `RetryAfter` backoff.
    async fn send(&self, recipient: RecipientId, outgoing: Outgoing<'_>) -> Result<(), ChannelError> {
        match self.send_paced(recipient, outgoing).await {
            Err(ChannelError::RetryAfter(wait)) => {
                let wait = wait.min(self.policy.max_retry_after);
                warn!(
                    %recipient,
                    kind = outgoing.label(),
                    wait_ms = wait.as_millis() as u64,
                    "Channel rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
                self.send_paced(recipient, outgoing).await
            }
            other => other,
        }
    }

    async fn send_paced(&self, recipient: RecipientId, outgoing: Outgoing<'_>) -> Result<(), ChannelError> {
        self.wait_for_slot().await;
        let result = match outgoing {
            Outgoing::Text(text, format) => self.channel.send_text(recipient, text, format).await,
            Outgoing::Photo(url, caption, format) => {
                self.channel
                    .send_photo(recipient, url, caption, format)
                    .await
            }
            Outgoing::MediaGroup(items) => self.channel.send_media_group(recipient, items).await,
        };
        *self.last_send.lock() = Some(Instant::now());
        debug!(%recipient, kind = outgoing.label(), ok = result.is_ok(), "Channel send");
        result
    }

    async fn wait_for_slot(&self) {
        let remaining = {
            let last = self.last_send.lock();
            last.and_then(|at| self.policy.pacing.checked_sub(at.elapsed()))
        };
        if let Some(remaining) = remaining.filter(|d| !d.is_zero()) {
            tokio::time::sleep(remaining).await;
        }
    }
}

/// The text as a caption, if it fits the caption limit.
fn fitting_caption(text: &str) -> Option<&str> {
    (text.chars().count() <= MAX_CAPTION_CHARS).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::channel::{RecordingChannel, SendKind, Sent};

    fn instant() -> DispatchPolicy {
        DispatchPolicy {
            pacing: Duration::ZERO,
            max_retry_after: Duration::from_millis(5),
        }
    }

    fn dispatcher(channel: &Arc<RecordingChannel>) -> Dispatcher {
        Dispatcher::new(channel.clone(), instant())
    }

    fn message(text: &str, images: usize) -> RenderedMessage {
        RenderedMessage {
            text: text.to_string(),
            image_urls: (0..images).map(|i| format!("https://img/{i}.jpg")).collect(),
            format: TextFormat::Markdown,
        }
    }

    const R: RecipientId = RecipientId::new(1);

    #[tokio::test]
    async fn text_only_uses_text_tier() {
        let channel = Arc::new(RecordingChannel::new());
        let outcome = dispatcher(&channel).deliver(R, &message("hi", 0)).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Complete(DeliveryTier::Text));
        assert_eq!(channel.texts(), vec!["hi"]);
    }

    #[tokio::test]
    async fn single_image_sent_as_captioned_photo() {
        let channel = Arc::new(RecordingChannel::new());
        let outcome = dispatcher(&channel).deliver(R, &message("hi", 1)).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Complete(DeliveryTier::Photo));
        assert_eq!(
            channel.sent(),
            vec![Sent::Photo {
                recipient: R,
                url: "https://img/0.jpg".into(),
                caption: Some("hi".into()),
            }]
        );
    }

    #[tokio::test]
    async fn several_images_sent_as_group_with_first_caption() {
        let channel = Arc::new(RecordingChannel::new());
        let outcome = dispatcher(&channel).deliver(R, &message("hi", 3)).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Complete(DeliveryTier::MediaGroup));
        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        let Sent::MediaGroup { items, .. } = &sent[0] else {
            panic!("expected media group, got {sent:?}");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].caption.as_deref(), Some("hi"));
        assert!(items[1..].iter().all(|item| item.caption.is_none()));
    }

    #[tokio::test]
    async fn failed_group_degrades_to_text_and_single_images() {
        let channel = Arc::new(
            RecordingChannel::new()
                .fail_always(SendKind::MediaGroup, ChannelError::Rejected("bad media".into()))
                .fail_matching(SendKind::Photo, "1.jpg", ChannelError::Rejected("bad url".into())),
        );
        let outcome = dispatcher(&channel).deliver(R, &message("hi", 3)).await.unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Partial {
                images_sent: 2,
                images_failed: 1
            }
        );
        let kinds: Vec<SendKind> = channel.attempts().iter().map(Sent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SendKind::MediaGroup,
                SendKind::Text,
                SendKind::Photo,
                SendKind::Photo,
                SendKind::Photo
            ]
        );
        assert_eq!(channel.texts(), vec!["hi"]);
    }

    #[tokio::test]
    async fn failed_photo_sends_text_with_note() {
        let channel = Arc::new(
            RecordingChannel::new()
                .fail_always(SendKind::Photo, ChannelError::Rejected("bad".into())),
        );
        let outcome = dispatcher(&channel).deliver(R, &message("hi", 1)).await.unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Partial {
                images_sent: 0,
                images_failed: 1
            }
        );
        assert_eq!(channel.texts(), vec![format!("hi\n\n{IMAGE_FAILURE_NOTE}")]);
    }

    #[tokio::test]
    async fn rejected_text_is_hard_failure() {
        let channel = Arc::new(
            RecordingChannel::new()
                .fail_always(SendKind::Text, ChannelError::Transport("down".into())),
        );
        let result = dispatcher(&channel).deliver(R, &message("hi", 0)).await;
        assert!(matches!(result, Err(DeliveryError::TextRejected(_))));
    }

    #[tokio::test]
    async fn long_caption_goes_out_as_text_after_images() {
        let channel = Arc::new(RecordingChannel::new());
        let text = "x".repeat(MAX_CAPTION_CHARS + 1);
        let outcome = dispatcher(&channel).deliver(R, &message(&text, 2)).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::Complete(DeliveryTier::MediaGroup));
        let sent = channel.sent();
        let Sent::MediaGroup { items, .. } = &sent[0] else {
            panic!("expected media group first, got {sent:?}");
        };
        assert!(items.iter().all(|item| item.caption.is_none()));
        assert_eq!(channel.texts(), vec![text]);
    }

    #[tokio::test]
    async fn retry_after_is_honoured_once() {
        let channel = Arc::new(
            RecordingChannel::new()
                .fail_once(SendKind::Text, ChannelError::RetryAfter(Duration::from_millis(1))),
        );
        let outcome = dispatcher(&channel).deliver(R, &message("hi", 0)).await.unwrap();

        assert!(outcome.is_complete());
        assert_eq!(channel.attempts().len(), 2);
        assert_eq!(channel.texts(), vec!["hi"]);
    }

    #[tokio::test]
    async fn second_retry_after_fails() {
        let channel = Arc::new(
            RecordingChannel::new()
                .fail_always(SendKind::Text, ChannelError::RetryAfter(Duration::from_millis(1))),
        );
        let result = dispatcher(&channel).deliver(R, &message("hi", 0)).await;

        assert!(result.is_err());
        assert_eq!(channel.attempts().len(), 2);
    }

    #[tokio::test]
    async fn plain_text_is_split_and_blank_chunks_skipped() {
        let channel = Arc::new(RecordingChannel::new());
        let paragraph = "y".repeat(3000);
        let text = format!("{paragraph}\n\n{paragraph}");
        let sent = dispatcher(&channel).deliver_plain(R, &text).await.unwrap();

        assert_eq!(sent, 2);
        assert!(channel
            .texts()
            .iter()
            .all(|chunk| chunk.chars().count() <= MAX_MESSAGE_CHARS));
    }

    #[tokio::test]
    async fn plain_text_later_chunk_failure_is_logged_only() {
        let channel = Arc::new(RecordingChannel::new().fail_matching(
            SendKind::Text,
            "zzz",
            ChannelError::Rejected("nope".into()),
        ));
        let text = format!("{}\n\n{}", "a".repeat(3000), "z".repeat(3000));
        let sent = dispatcher(&channel).deliver_plain(R, &text).await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn pacing_spaces_sends() {
        let channel = Arc::new(RecordingChannel::new());
        let dispatcher = Dispatcher::new(
            channel.clone(),
            DispatchPolicy {
                pacing: Duration::from_millis(30),
                ..instant()
            },
        );
        let started = std::time::Instant::now();
        dispatcher.deliver(R, &message("a", 0)).await.unwrap();
        dispatcher.deliver(R, &message("b", 0)).await.unwrap();
        dispatcher.deliver(R, &message("c", 0)).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
