//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for dispatchers around a mocked transport.

use std::sync::Arc;

use crate::gate::RateLimitGate;
use crate::media::{Medium, RemoteMedium};
use crate::message::Dispatcher;
use crate::transport::MockTransportClient;

/// Wraps a mocked transport in a dispatcher with its own unrestricted gate.
///
/// A fresh gate keeps tests independent of [`RateLimitGate::global`].
#[must_use]
pub fn dispatcher_with(mock: MockTransportClient) -> Dispatcher {
    Dispatcher::new(Arc::new(mock), Arc::new(RateLimitGate::new()))
}

/// Create a mock transport that accepts every call.
#[must_use]
pub fn mock_transport_ok() -> MockTransportClient {
    let mut mock = MockTransportClient::new();
    mock.expect_send_message().returning(|_, _, _, _| Ok(()));
    mock.expect_send_photo().returning(|_, _, _, _| Ok(()));
    mock.expect_send_video().returning(|_, _, _, _| Ok(()));
    mock.expect_send_animation().returning(|_, _, _, _| Ok(()));
    mock.expect_send_media_group().returning(|_, _| Ok(()));
    mock
}

/// `count` photos with urls `https://m/{index}.jpg`.
#[must_use]
pub fn group_of(count: usize) -> Vec<Arc<dyn Medium>> {
    (0..count)
        .map(|i| Arc::new(RemoteMedium::photo(format!("https://m/{i}.jpg"))) as Arc<dyn Medium>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::Destination;
    use crate::message::DispatchableMessage;

    #[tokio::test(start_paused = true)]
    async fn test_ok_mock_accepts_every_kind() {
        let dispatcher = dispatcher_with(mock_transport_ok());
        let dest = Destination::Chat(5);

        let mut messages = vec![
            DispatchableMessage::text("t"),
            DispatchableMessage::photo(RemoteMedium::photo("https://p")),
            DispatchableMessage::video(RemoteMedium::video("https://v")),
            DispatchableMessage::media_group(group_of(2)),
        ];
        for msg in &mut messages {
            assert!(msg.send(&dispatcher, &dest).await.is_ok());
        }
    }
}
