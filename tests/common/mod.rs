//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tg_dispatch::{Destination, FormatMode, TransportClient, TransportError, WireMediaItem};

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Message {
        destination: Destination,
        text: String,
        format: Option<FormatMode>,
        disable_link_preview: bool,
    },
    Photo {
        destination: Destination,
        url: String,
        caption: Option<String>,
    },
    Video {
        destination: Destination,
        url: String,
    },
    Animation {
        destination: Destination,
        url: String,
    },
    MediaGroup {
        destination: Destination,
        items: Vec<WireMediaItem>,
    },
}

impl Call {
    pub fn destination(&self) -> &Destination {
        match self {
            Self::Message { destination, .. }
            | Self::Photo { destination, .. }
            | Self::Video { destination, .. }
            | Self::Animation { destination, .. }
            | Self::MediaGroup { destination, .. } => destination,
        }
    }
}

/// Returns scripted outcomes in order, then succeeds forever.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<(), TransportError>>>,
    calls: Mutex<Vec<(tokio::time::Instant, Call)>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Result<(), TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.timed_calls().into_iter().map(|(_, c)| c).collect()
    }

    pub fn timed_calls(&self) -> Vec<(tokio::time::Instant, Call)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    fn record(&self, call: Call) -> Result<(), TransportError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((tokio::time::Instant::now(), call));
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

#[async_trait]
impl TransportClient for ScriptedTransport {
    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
        format: Option<FormatMode>,
        disable_link_preview: bool,
    ) -> Result<(), TransportError> {
        self.record(Call::Message {
            destination: destination.clone(),
            text: text.to_string(),
            format,
            disable_link_preview,
        })
    }

    async fn send_photo(
        &self,
        destination: &Destination,
        url: &str,
        caption: Option<String>,
        _format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        self.record(Call::Photo {
            destination: destination.clone(),
            url: url.to_string(),
            caption,
        })
    }

    async fn send_video(
        &self,
        destination: &Destination,
        url: &str,
        _caption: Option<String>,
        _format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        self.record(Call::Video {
            destination: destination.clone(),
            url: url.to_string(),
        })
    }

    async fn send_animation(
        &self,
        destination: &Destination,
        url: &str,
        _caption: Option<String>,
        _format: Option<FormatMode>,
    ) -> Result<(), TransportError> {
        self.record(Call::Animation {
            destination: destination.clone(),
            url: url.to_string(),
        })
    }

    async fn send_media_group(
        &self,
        destination: &Destination,
        items: Vec<WireMediaItem>,
    ) -> Result<(), TransportError> {
        self.record(Call::MediaGroup {
            destination: destination.clone(),
            items,
        })
    }
}

pub fn rate_limited(secs: u64) -> TransportError {
    TransportError::RateLimited {
        retry_after: std::time::Duration::from_secs(secs),
    }
}

pub fn network(details: &str) -> TransportError {
    TransportError::Network(details.to_string())
}
