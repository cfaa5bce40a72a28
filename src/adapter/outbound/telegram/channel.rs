//! [`Channel`] implementation over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, ParseMode};
use teloxide::RequestError;
use url::Url;

use crate::domain::RecipientId;
use crate::error::ChannelError;
use crate::port::{Channel, MediaItem, TextFormat};

/// Sends messages with a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Self {
        Self::new(Bot::new(token))
    }
}

const fn parse_mode(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Markdown => Some(ParseMode::MarkdownV2),
        TextFormat::Plain => None,
    }
}

fn chat(recipient: RecipientId) -> ChatId {
    ChatId(recipient.get())
}

fn photo_file(url: &str) -> Result<InputFile, ChannelError> {
    Url::parse(url)
        .map(InputFile::url)
        .map_err(|e| ChannelError::Rejected(format!("invalid image url {url:?}: {e}")))
}

fn map_error(error: RequestError) -> ChannelError {
    match error {
        RequestError::RetryAfter(wait) => ChannelError::RetryAfter(wait.duration()),
        RequestError::Network(e) => ChannelError::Transport(e.to_string()),
        RequestError::Io(e) => ChannelError::Transport(e.to_string()),
        other => ChannelError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn send_text(
        &self,
        recipient: RecipientId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChannelError> {
        let mut request = self.bot.send_message(chat(recipient), text);
        if let Some(mode) = parse_mode(format) {
            request = request.parse_mode(mode);
        }
        request.await.map(|_| ()).map_err(map_error)
    }

    async fn send_photo(
        &self,
        recipient: RecipientId,
        url: &str,
        caption: Option<&str>,
        format: TextFormat,
    ) -> Result<(), ChannelError> {
        let mut request = self.bot.send_photo(chat(recipient), photo_file(url)?);
        if let Some(caption) = caption {
            request = request.caption(caption);
            if let Some(mode) = parse_mode(format) {
                request = request.parse_mode(mode);
            }
        }
        request.await.map(|_| ()).map_err(map_error)
    }

    async fn send_media_group(
        &self,
        recipient: RecipientId,
        items: &[MediaItem],
    ) -> Result<(), ChannelError> {
        let media = items
            .iter()
            .map(|item| {
                let mut photo = InputMediaPhoto::new(photo_file(&item.url)?);
                if let Some(caption) = &item.caption {
                    photo = photo.caption(caption.clone());
                    if let Some(mode) = parse_mode(item.format) {
                        photo = photo.parse_mode(mode);
                    }
                }
                Ok(InputMedia::Photo(photo))
            })
            .collect::<Result<Vec<_>, ChannelError>>()?;

        self.bot
            .send_media_group(chat(recipient), media)
            .await
            .map(|_| ())
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_uses_markdown_v2() {
        assert_eq!(parse_mode(TextFormat::Markdown), Some(ParseMode::MarkdownV2));
        assert_eq!(parse_mode(TextFormat::Plain), None);
    }

    #[test]
    fn invalid_image_url_is_rejected() {
        assert!(matches!(photo_file("not a url"), Err(ChannelError::Rejected(_))));
        assert!(photo_file("https://img/1.jpg").is_ok());
    }
}
