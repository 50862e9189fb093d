//! Connection lifecycle
//!
//! 1 本の接続が辿る状態遷移を表す状態機械。
//!
//! ```text
//!  +--HandshakeRejected--+
//!  v                     |
//! Connecting ------------+--HandshakeAccepted--> Authenticated --StreamOpened--> Streaming
//!                                                     |                             |
//!                                               Disconnected <------StreamClosed----+
//! ```
//!
//! 拒否されたハンドシェイクは `Connecting` に留まり、クライアントは別の
//! ユーザー名で再試行できる。`Disconnected` は終端状態。

use super::error::InvalidTransition;

/// State of one client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Authenticated,
    Streaming,
    Disconnected,
}

/// Input of the connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    HandshakeAccepted,
    HandshakeRejected,
    StreamOpened,
    StreamClosed,
}

/// Why a streaming session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The client closed the stream
    ClientClosed,
    /// Reading from or writing to the transport failed
    TransportFailure,
    /// The outbound queue overflowed and the session was evicted
    Unresponsive,
    /// The server is shutting down
    ServerShutdown,
    /// The stream was not opened in time after the handshake
    StreamNotOpened,
}

impl ConnectionState {
    /// Apply `event` and return the next state.
    pub fn next(self, event: ConnectionEvent) -> Result<Self, InvalidTransition> {
        use ConnectionEvent::*;
        use ConnectionState::*;

        match (self, event) {
            (Connecting, HandshakeAccepted) => Ok(Authenticated),
            (Connecting, HandshakeRejected) => Ok(Connecting),
            (Authenticated, StreamOpened) => Ok(Streaming),
            (Authenticated | Streaming, StreamClosed) => Ok(Disconnected),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Disconnected
    }
}
