//! JSON wire protocol between the server and its clients.
//!
//! The handshake is a plain HTTP request/response; everything after it flows
//! over a WebSocket as one JSON text frame per event.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Handshake endpoint (POST)
pub const CONNECT_PATH: &str = "/api/connect";

/// Event stream endpoint (WebSocket upgrade)
pub const STREAM_PATH: &str = "/ws";

/// Header carrying the session token when the stream is opened
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Maximum message length, in characters
pub const MAX_MESSAGE_LENGTH: usize = 128;

/// Handshake request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub username: String,
    /// The client's starting clock value, merged into the server clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

/// Handshake response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub token: String,
    /// Server clock value right after merging the client's starting value
    pub timestamp: Timestamp,
}

/// Machine-readable error kind of an [`ErrorResponse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    AlreadyExists,
    Unauthenticated,
    InvalidArgument,
}

/// Error body returned by the HTTP endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

/// Client → server stream frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// The client's clock value when it sent the message
    pub timestamp: Timestamp,
    pub text: String,
}

/// Server → client stream frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFrame {
    /// Server-assigned logical timestamp
    pub timestamp: Timestamp,
    pub event: EventPayload,
}

/// Event carried by a [`ServerFrame`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventPayload {
    Message { username: String, text: String },
    Joined { username: String },
    Left { username: String },
}

/// Live session entry of `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    pub username: String,
    /// RFC 3339, UTC
    pub connected_at: String,
}
