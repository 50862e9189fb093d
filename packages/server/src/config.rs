//! Server configuration.

use std::time::Duration;

use chitchat_shared::{clock::ClockKind, protocol::MAX_MESSAGE_LENGTH};

/// Default capacity of each session's outbound queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Default participant id of the server in vector timestamps
pub const DEFAULT_NODE_ID: &str = "server";

/// Default time a handshake's session waits for its stream to open
pub const DEFAULT_STREAM_OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime settings of the server, filled from the command line by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to bind to (0 picks an ephemeral port)
    pub port: u16,
    /// Logical clock variant
    pub clock: ClockKind,
    /// Participant id of the server clock (vector clock only)
    pub node_id: String,
    /// Capacity of each session's outbound queue (at least 1)
    pub queue_capacity: usize,
    /// Maximum accepted message length, in characters
    pub max_message_length: usize,
    /// Sessions whose stream is not opened within this time are removed
    pub stream_open_timeout: Duration,
}

impl ServerConfig {
    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            clock: ClockKind::Lamport,
            node_id: DEFAULT_NODE_ID.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_message_length: MAX_MESSAGE_LENGTH,
            stream_open_timeout: DEFAULT_STREAM_OPEN_TIMEOUT,
        }
    }
}
