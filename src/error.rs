//! Error types for message dispatch.

use std::time::Duration;
use thiserror::Error;

use crate::message::MessageKind;

/// Classified outcome of a failed transport call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Flood control exceeded; the platform asks to wait before the next send
    #[error("Flood control exceeded, retry after {}s", .retry_after.as_secs())]
    RateLimited {
        /// Wait requested by the platform
        retry_after: Duration,
    },
    /// The request itself was rejected (bad content, bad destination)
    #[error("Bad request: {0}")]
    MalformedRequest(String),
    /// Transient network failure
    #[error("Network error: {0}")]
    Network(String),
    /// Any failure that does not fit the categories above
    #[error("Transport error: {0}")]
    Other(String),
}

/// Errors surfaced to callers of [`crate::message::DispatchableMessage::send`]
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Cumulative retry ceiling reached, message dropped
    #[error("Retried too many times ({retries}), message dropped")]
    RetriesExhausted {
        /// Retry count at the moment the message was dropped
        retries: u32,
    },
    /// Platform rejected the request; never retried
    #[error("Request rejected: {0}")]
    MalformedRequest(String),
    /// Message content does not fit its kind
    #[error("{kind} message cannot be sent: {reason}")]
    ContentMismatch {
        /// Kind of the offending message
        kind: MessageKind,
        /// What is wrong with the content
        reason: &'static str,
    },
    /// Unclassified transport failure, propagated as-is
    #[error(transparent)]
    Transport(TransportError),
}

impl DispatchError {
    /// Whether the message was dropped after exhausting its retries
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}
