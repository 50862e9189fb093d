//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Username is already in use by a live session
    #[error("Username '{0}' is already in use")]
    UsernameTaken(String),

    /// The server rejected the username
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// The session token was rejected when opening the stream
    #[error("Session token was rejected")]
    Unauthenticated,

    /// Network or transport failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server sent something the client does not understand
    #[error("Protocol error: {0}")]
    Protocol(String),
}
