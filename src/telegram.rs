//! Telegram transport backed by `teloxide`.
//!
//! Maps Bot API calls onto [`TransportClient`] and classifies
//! [`RequestError`]s so the retry loop can tell flood control, network
//! trouble and rejected requests apart.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaAnimation, InputMediaAudio, InputMediaDocument,
    InputMediaPhoto, InputMediaVideo, LinkPreviewOptions, ParseMode, Recipient,
};
use teloxide::{ApiError, RequestError};
use tracing::trace;

use crate::destination::Destination;
use crate::error::TransportError;
use crate::format::FormatMode;
use crate::media::{WireMediaItem, WireMediaKind};
use crate::transport::TransportClient;

/// [`TransportClient`] that talks to the Telegram Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wraps an existing bot.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Creates a bot from its token.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }
}

/// Classifies a teloxide error for the retry loop.
///
/// Authorization-type API errors (blocked, kicked, bad token) are not
/// malformed requests: retrying cannot fix them and neither can the sender's
/// content, so they are reported as [`TransportError::Other`].
#[must_use]
pub fn classify_request_error(err: &RequestError) -> TransportError {
    match err {
        RequestError::RetryAfter(secs) => TransportError::RateLimited {
            retry_after: Duration::from_secs(u64::from(secs.seconds())),
        },
        RequestError::Network(_) | RequestError::Io(_) => TransportError::Network(err.to_string()),
        RequestError::Api(
            ApiError::BotBlocked
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup
            | ApiError::UserDeactivated
            | ApiError::CantInitiateConversation
            | ApiError::CantTalkWithBots
            | ApiError::InvalidToken,
        ) => TransportError::Other(err.to_string()),
        RequestError::Api(_) => TransportError::MalformedRequest(err.to_string()),
        _ => TransportError::Other(err.to_string()),
    }
}

fn media_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|e| TransportError::MalformedRequest(format!("invalid media url {url}: {e}")))
}

fn wire_to_input_media(item: WireMediaItem) -> Result<InputMedia, TransportError> {
    let file = InputFile::url(media_url(&item.url)?);
    let parse_mode = item.format.map(ParseMode::from);

    let media = match item.kind {
        WireMediaKind::Photo => {
            let mut m = InputMediaPhoto::new(file);
            m.caption = item.caption;
            m.parse_mode = parse_mode;
            InputMedia::Photo(m)
        }
        WireMediaKind::Video => {
            let mut m = InputMediaVideo::new(file);
            m.caption = item.caption;
            m.parse_mode = parse_mode;
            InputMedia::Video(m)
        }
        WireMediaKind::Animation => {
            let mut m = InputMediaAnimation::new(file);
            m.caption = item.caption;
            m.parse_mode = parse_mode;
            InputMedia::Animation(m)
        }
        WireMediaKind::Document => {
            let mut m = InputMediaDocument::new(file);
            m.caption = item.caption;
            m.parse_mode = parse_mode;
            InputMedia::Document(m)
        }
        WireMediaKind::Audio => {
            let mut m = InputMediaAudio::new(file);
            m.caption = item.caption;
            m.parse_mode = parse_mode;
            InputMedia::Audio(m)
        }
    };
    Ok(media)
}

const fn disabled_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl TransportClient for TelegramTransport {
    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
        format: Option<FormatMode>,
        disable_link_preview: bool,
    ) -> Result<(), TransportError> {
        trace!(destination = %destination, "sendMessage");
        let mut req = self.bot.send_message(Recipient::from(destination), text);
        if let Some(mode) = format {
            req = req.parse_mode(mode.into());
        }
        if disable_link_preview {
            req = req.link_preview_options(disabled_link_preview());
        }
        req.await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }

    async fn send_photo(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        trace!(destination = %destination, url = %url, "sendPhoto");
        let mut req = self
            .bot
            .send_photo(Recipient::from(destination), InputFile::url(media_url(url)?));
        if let Some(caption) = caption {
            req = req.caption(caption);
        }
        if let Some(mode) = format {
            req = req.parse_mode(mode.into());
        }
        req.await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }

    async fn send_video(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        trace!(destination = %destination, url = %url, "sendVideo");
        let mut req = self
            .bot
            .send_video(Recipient::from(destination), InputFile::url(media_url(url)?));
        if let Some(caption) = caption {
            req = req.caption(caption);
        }
        if let Some(mode) = format {
            req = req.parse_mode(mode.into());
        }
        req.await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }

    async fn send_animation(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        trace!(destination = %destination, url = %url, "sendAnimation");
        let mut req = self
            .bot
            .send_animation(Recipient::from(destination), InputFile::url(media_url(url)?));
        if let Some(caption) = caption {
            req = req.caption(caption);
        }
        if let Some(mode) = format {
            req = req.parse_mode(mode.into());
        }
        req.await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }

    async fn send_media_group(
        &self,
        destination: &Destination,
        items: Vec<WireMediaItem>,
    ) -> Result<(), TransportError> {
        trace!(destination = %destination, items = items.len(), "sendMediaGroup");
        let media = items
            .into_iter()
            .map(wire_to_input_media)
            .collect::<Result<Vec<_>, _>>()?;
        self.bot
            .send_media_group(Recipient::from(destination), media)
            .await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }
}
