//! Media content and its transport-ready form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::FormatMode;

/// Kind of a single attachment as the Bot API sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireMediaKind {
    /// Still image
    Photo,
    /// Video file
    Video,
    /// GIF or soundless H.264 clip
    Animation,
    /// Generic file
    Document,
    /// Audio track
    Audio,
}

/// Transport-ready representation of a medium, as attached to a grouped send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMediaItem {
    /// Attachment kind
    pub kind: WireMediaKind,
    /// Remote URL the platform fetches the file from
    pub url: String,
    /// Caption; only the first item of a group carries one
    pub caption: Option<String>,
    /// Rendering mode for the caption
    pub format: Option<FormatMode>,
}

impl WireMediaItem {
    /// Creates an item without caption or rendering mode.
    #[must_use]
    pub fn new(kind: WireMediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            caption: None,
            format: None,
        }
    }
}

/// A piece of media content that can be delivered by URL.
pub trait Medium: fmt::Debug + Send + Sync {
    /// URL the platform should fetch the file from
    fn url(&self) -> &str;

    /// Converts the medium into a wire item for grouped sends
    fn to_wire_item(&self) -> WireMediaItem;
}

/// Medium backed by a plain remote URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMedium {
    /// Attachment kind
    pub kind: WireMediaKind,
    /// Remote URL
    pub url: String,
}

impl RemoteMedium {
    /// Creates a medium of the given kind.
    #[must_use]
    pub fn new(kind: WireMediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }

    /// Shorthand for a photo.
    #[must_use]
    pub fn photo(url: impl Into<String>) -> Self {
        Self::new(WireMediaKind::Photo, url)
    }

    /// Shorthand for a video.
    #[must_use]
    pub fn video(url: impl Into<String>) -> Self {
        Self::new(WireMediaKind::Video, url)
    }
}

impl Medium for RemoteMedium {
    fn url(&self) -> &str {
        &self.url
    }

    fn to_wire_item(&self) -> WireMediaItem {
        WireMediaItem::new(self.kind, self.url.clone())
    }
}
