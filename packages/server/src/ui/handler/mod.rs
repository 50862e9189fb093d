//! Request handlers.

mod http;
mod websocket;

use std::fmt::Display;

use crate::domain::{ConnectionEvent, ConnectionState};

pub use http::{connect, health_check, list_sessions};
pub use websocket::stream_handler;

/// Apply `event` to the connection state, logging the transition.
///
/// An invalid transition is logged and leaves the state unchanged.
fn advance(state: ConnectionState, event: ConnectionEvent, username: impl Display) -> ConnectionState {
    match state.next(event) {
        Ok(next) => {
            tracing::debug!(username = %username, "connection {:?} -> {:?}", state, next);
            next
        }
        Err(e) => {
            tracing::warn!(username = %username, "{}", e);
            state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_applies_valid_transition() {
        // テスト項目: 有効なイベントで次の状態に遷移する
        // given (前提条件):
        let state = ConnectionState::Connecting;

        // when (操作):
        let next = advance(state, ConnectionEvent::HandshakeAccepted, "alice");

        // then (期待する結果):
        assert_eq!(next, ConnectionState::Authenticated);
    }

    #[test]
    fn test_advance_keeps_state_on_invalid_transition() {
        // テスト項目: 無効なイベントでは状態が変わらない
        // given (前提条件):
        let state = ConnectionState::Disconnected;

        // when (操作):
        let next = advance(state, ConnectionEvent::StreamOpened, "alice");

        // then (期待する結果):
        assert_eq!(next, ConnectionState::Disconnected);
    }
}
