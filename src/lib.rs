#![deny(missing_docs)]
//! Telegram message dispatch with flood-control aware retries.
//!
//! A [`message::DispatchableMessage`] knows which Bot API call its content
//! needs and retries it through a shared [`gate::RateLimitGate`] when the
//! platform asks the client to slow down.

/// Configuration management.
pub mod config;
/// Chat identifiers messages are sent to.
pub mod destination;
/// Error types for transport calls and message sends.
pub mod error;
/// Text rendering modes.
pub mod format;
/// Process-wide flood-control gate.
pub mod gate;
/// Media content and its wire representation.
pub mod media;
/// Dispatchable messages and the retry loop.
pub mod message;
/// teloxide-backed transport.
pub mod telegram;
/// Transport capability used to reach the chat platform.
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use destination::Destination;
pub use error::{DispatchError, TransportError};
pub use format::FormatMode;
pub use gate::RateLimitGate;
pub use media::{Medium, RemoteMedium, WireMediaItem, WireMediaKind};
pub use message::{DispatchableMessage, Dispatcher, MessageContent, MessageKind, RetryPolicy};
pub use transport::TransportClient;
