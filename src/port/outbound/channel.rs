//! Outbound chat channel port.
//!
//! The dispatcher only talks to this trait, so the delivery tiers can be
//! tested against a scripted channel and run against Telegram in production.

use async_trait::async_trait;

use crate::domain::RecipientId;
use crate::error::ChannelError;

/// Maximum characters in a single text message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Maximum characters in a photo caption.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Maximum items in one media group.
pub const MAX_MEDIA_GROUP: usize = 10;

/// How the channel should interpret markup in a text or caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Telegram `MarkdownV2`; callers must escape dynamic content.
    Markdown,
    /// No markup parsing.
    Plain,
}

/// One image of a media group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub url: String,
    pub caption: Option<String>,
    pub format: TextFormat,
}

impl MediaItem {
    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: None,
            format: TextFormat::Plain,
        }
    }

    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>, format: TextFormat) -> Self {
        self.caption = Some(caption.into());
        self.format = format;
        self
    }
}

/// Capability to send to a chat.
///
/// Implementations map platform errors to [`ChannelError`] so callers can
/// tell rate limiting apart from rejections.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send_text(
        &self,
        recipient: RecipientId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChannelError>;

    async fn send_photo(
        &self,
        recipient: RecipientId,
        url: &str,
        caption: Option<&str>,
        format: TextFormat,
    ) -> Result<(), ChannelError>;

    async fn send_media_group(
        &self,
        recipient: RecipientId,
        items: &[MediaItem],
    ) -> Result<(), ChannelError>;
}
