//! Dispatchable messages and the retry loop.
//!
//! A message is a tagged variant over its content kind with one shared send
//! routine. Each attempt waits on the shared [`RateLimitGate`], performs the
//! kind-specific transport call and classifies the outcome:
//!
//! - success resets the retry counter,
//! - flood control moves the shared gate and retries,
//! - network errors back off for a fixed delay and retry,
//! - rejected requests and anything unclassified are returned immediately.
//!
//! The retry ceiling is cumulative across flood-control and network retries
//! and is checked before every attempt, so an exhausted message never reaches
//! the transport again until [`DispatchableMessage::reset_retries`] is called.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{
    DispatchSettings, DEFAULT_MAX_RETRIES, DEFAULT_NETWORK_BACKOFF_SECS,
    DEFAULT_THROTTLE_MARGIN_SECS,
};
use crate::destination::Destination;
use crate::error::{DispatchError, TransportError};
use crate::format::FormatMode;
use crate::gate::RateLimitGate;
use crate::media::{Medium, WireMediaItem};
use crate::transport::TransportClient;

/// Selects which transport call a message uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Plain text message
    Text,
    /// Single photo with optional caption
    Photo,
    /// Single video with optional caption
    Video,
    /// Single animation with optional caption
    Animation,
    /// Album of media; the first item carries the caption
    MediaGroup,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Animation => "animation",
            Self::MediaGroup => "media group",
        })
    }
}

/// Media attached to a message
#[derive(Debug, Clone, Default)]
pub enum MessageContent {
    /// No media
    #[default]
    None,
    /// One medium (photo, video, animation)
    Single(Arc<dyn Medium>),
    /// Ordered media for an album
    Group(Vec<Arc<dyn Medium>>),
}

/// Retry limits and delays applied by [`DispatchableMessage::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Cumulative recoverable failures tolerated before a message is dropped
    pub max_retries: u32,
    /// Extra wait added on top of an active flood-control deadline
    pub throttle_margin: Duration,
    /// Fixed pause after a network error
    pub network_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            throttle_margin: Duration::from_secs(DEFAULT_THROTTLE_MARGIN_SECS),
            network_backoff: Duration::from_secs(DEFAULT_NETWORK_BACKOFF_SECS),
        }
    }
}

/// Collaborators shared by every send: transport, flood-control gate, policy
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn TransportClient>,
    gate: Arc<RateLimitGate>,
    policy: RetryPolicy,
}

impl Dispatcher {
    /// Creates a dispatcher with the default retry policy.
    #[must_use]
    pub fn new(transport: Arc<dyn TransportClient>, gate: Arc<RateLimitGate>) -> Self {
        Self {
            transport,
            gate,
            policy: RetryPolicy::default(),
        }
    }

    /// Creates a dispatcher on the process-wide gate with the configured policy.
    #[must_use]
    pub fn from_settings(transport: Arc<dyn TransportClient>, settings: &DispatchSettings) -> Self {
        Self::new(transport, RateLimitGate::global()).with_policy(settings.retry_policy())
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Flood-control gate used by this dispatcher.
    #[must_use]
    pub fn gate(&self) -> &Arc<RateLimitGate> {
        &self.gate
    }

    /// Active retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

/// A message that can be sent, with its own retry counter
#[derive(Debug, Clone)]
pub struct DispatchableMessage {
    kind: MessageKind,
    text: Option<String>,
    content: MessageContent,
    format: Option<FormatMode>,
    retries: u32,
}

impl DispatchableMessage {
    /// Creates a message of any kind.
    ///
    /// Content is not checked against the kind here; a mismatch surfaces as
    /// [`DispatchError::ContentMismatch`] when the message is sent.
    #[must_use]
    pub fn new(kind: MessageKind, text: Option<String>, content: MessageContent) -> Self {
        Self {
            kind,
            text,
            content,
            format: Some(FormatMode::default()),
            retries: 0,
        }
    }

    /// Text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Text, Some(text.into()), MessageContent::None)
    }

    /// Photo message without caption.
    #[must_use]
    pub fn photo(medium: impl Medium + 'static) -> Self {
        Self::single(MessageKind::Photo, medium)
    }

    /// Video message without caption.
    #[must_use]
    pub fn video(medium: impl Medium + 'static) -> Self {
        Self::single(MessageKind::Video, medium)
    }

    /// Animation message without caption.
    #[must_use]
    pub fn animation(medium: impl Medium + 'static) -> Self {
        Self::single(MessageKind::Animation, medium)
    }

    /// Album message; order of `media` is display order.
    #[must_use]
    pub fn media_group(media: Vec<Arc<dyn Medium>>) -> Self {
        Self::new(MessageKind::MediaGroup, None, MessageContent::Group(media))
    }

    fn single(kind: MessageKind, medium: impl Medium + 'static) -> Self {
        Self::new(kind, None, MessageContent::Single(Arc::new(medium)))
    }

    /// Sets the body or caption.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the rendering mode; `None` sends plain text.
    #[must_use]
    pub const fn with_format(mut self, format: Option<FormatMode>) -> Self {
        self.format = format;
        self
    }

    /// Content kind.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Body or caption.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Attached media.
    #[must_use]
    pub const fn content(&self) -> &MessageContent {
        &self.content
    }

    /// Rendering mode.
    #[must_use]
    pub const fn format(&self) -> Option<FormatMode> {
        self.format
    }

    /// Recoverable failures since the last successful send.
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Makes a dropped message sendable again.
    pub fn reset_retries(&mut self) {
        self.retries = 0;
    }

    /// Sends the message, absorbing flood control and network errors.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::RetriesExhausted`] once the retry ceiling is reached;
    ///   the transport is not called in that case.
    /// - [`DispatchError::MalformedRequest`] when the platform rejects the request.
    /// - [`DispatchError::ContentMismatch`] when the content does not fit the kind.
    /// - [`DispatchError::Transport`] for any unclassified failure.
    pub async fn send(
        &mut self,
        dispatcher: &Dispatcher,
        destination: &Destination,
    ) -> Result<(), DispatchError> {
        let policy = dispatcher.policy;
        loop {
            if self.retries >= policy.max_retries {
                warn!(
                    kind = %self.kind,
                    destination = %destination,
                    "Retried too many times! Message dropped!"
                );
                return Err(DispatchError::RetriesExhausted {
                    retries: self.retries,
                });
            }

            dispatcher.gate.wait_turn(policy.throttle_margin).await;

            let outgoing = self.outgoing()?;
            let result = outgoing
                .deliver(
                    dispatcher.transport.as_ref(),
                    destination,
                    self.text.as_deref(),
                    self.format,
                )
                .await;

            match result {
                Ok(()) => {
                    self.retries = 0;
                    return Ok(());
                }
                Err(TransportError::RateLimited { retry_after }) => {
                    debug!(
                        destination = %destination,
                        "Flood control exceeded, retry in {}s",
                        retry_after.as_secs()
                    );
                    self.retries += 1;
                    dispatcher.gate.hold_for(retry_after);
                }
                Err(TransportError::MalformedRequest(details)) => {
                    return Err(DispatchError::MalformedRequest(details));
                }
                Err(TransportError::Network(details)) => {
                    warn!("Network error({details}). Retrying...");
                    self.retries += 1;
                    sleep(policy.network_backoff).await;
                }
                Err(other) => return Err(DispatchError::Transport(other)),
            }
        }
    }

    /// Resolves the content into the payload of the kind-specific call.
    fn outgoing(&self) -> Result<Outgoing<'_>, DispatchError> {
        let mismatch = |reason| DispatchError::ContentMismatch {
            kind: self.kind,
            reason,
        };
        match (self.kind, &self.content) {
            (MessageKind::Text, _) => Ok(Outgoing::Text),
            (MessageKind::Photo, MessageContent::Single(m)) => Ok(Outgoing::Photo(m.url())),
            (MessageKind::Video, MessageContent::Single(m)) => Ok(Outgoing::Video(m.url())),
            (MessageKind::Animation, MessageContent::Single(m)) => {
                Ok(Outgoing::Animation(m.url()))
            }
            (MessageKind::Photo | MessageKind::Video | MessageKind::Animation, _) => {
                Err(mismatch("a single medium is required"))
            }
            (MessageKind::MediaGroup, MessageContent::Group(media)) => {
                self.wire_items(media).map(Outgoing::Group).ok_or_else(|| {
                    mismatch("at least one medium is required")
                })
            }
            (MessageKind::MediaGroup, _) => Err(mismatch("a sequence of media is required")),
        }
    }

    /// Album items with the caption on the first item only.
    fn wire_items(&self, media: &[Arc<dyn Medium>]) -> Option<Vec<WireMediaItem>> {
        let mut items: Vec<WireMediaItem> = media.iter().map(|m| m.to_wire_item()).collect();
        let (first, rest) = items.split_first_mut()?;
        first.caption.clone_from(&self.text);
        first.format = self.format;
        for item in rest {
            item.caption = None;
            item.format = None;
        }
        Some(items)
    }
}

/// Payload of one kind-specific transport call
enum Outgoing<'a> {
    Text,
    Photo(&'a str),
    Video(&'a str),
    Animation(&'a str),
    Group(Vec<WireMediaItem>),
}

impl Outgoing<'_> {
    async fn deliver(
        self,
        transport: &dyn TransportClient,
        destination: &Destination,
        text: Option<&str>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        let caption = text.map(str::to_string);
        match self {
            Self::Text => {
                transport
                    .send_message(destination, text.unwrap_or_default(), format, true)
                    .await
            }
            Self::Photo(url) => transport.send_photo(destination, url, caption, format).await,
            Self::Video(url) => transport.send_video(destination, url, caption, format).await,
            Self::Animation(url) => {
                transport
                    .send_animation(destination, url, caption, format)
                    .await
            }
            Self::Group(items) => transport.send_media_group(destination, items).await,
        }
    }
}
