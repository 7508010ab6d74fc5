//! Transport capability.
//!
//! One method per content kind. Implementations classify every failure into a
//! [`TransportError`] so the retry loop never has to inspect native errors.

use async_trait::async_trait;

use crate::destination::Destination;
use crate::error::TransportError;
use crate::format::FormatMode;
use crate::media::WireMediaItem;

/// Performs the actual network calls to the chat platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Sends a text message.
    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
        format: Option<FormatMode>,
        disable_link_preview: bool,
    ) -> Result<(), TransportError>;

    /// Sends a photo by URL.
    async fn send_photo(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError>;

    /// Sends a video by URL.
    async fn send_video(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError>;

    /// Sends an animation by URL.
    async fn send_animation(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        format: Option<FormatMode>,
    ) -> Result<(), TransportError>;

    /// Sends an album; item order is display order.
    async fn send_media_group(
        &self,
        destination: &Destination,
        items: Vec<WireMediaItem>,
    ) -> Result<(), TransportError>;
}
