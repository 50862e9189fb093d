//! Chat session: HTTP handshake, then a WebSocket event stream.

use std::sync::Arc;

use chitchat_shared::{
    clock::{LogicalClock, Timestamp},
    protocol::{
        AUTHORIZATION_HEADER, CONNECT_PATH, ClientFrame, ConnectRequest, ConnectResponse,
        ErrorCode, ErrorResponse, STREAM_PATH, ServerFrame,
    },
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode},
        protocol::Message,
    },
};

use crate::{domain::normalize_username, error::ClientError};

/// Raw event stream of an open session
pub type EventStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A connected chat session.
///
/// Created by [`ChatClient::connect`]; split it with
/// [`into_split`](Self::into_split) to send and receive concurrently.
pub struct ChatClient {
    username: String,
    token: String,
    /// Server timestamp returned by the handshake
    joined_at: Timestamp,
    clock: Arc<dyn LogicalClock>,
    stream: EventStream,
}

impl ChatClient {
    /// Register `username` with the server at `base_url` and open the stream.
    ///
    /// The handshake claims the current value of `clock`; the server's reply
    /// is merged back into it.
    ///
    /// # Errors
    ///
    /// * [`ClientError::UsernameTaken`] - another live session uses the name
    /// * [`ClientError::InvalidUsername`] - the server rejected the name
    /// * [`ClientError::Unauthenticated`] - the token was rejected
    /// * [`ClientError::Connection`] - the server could not be reached
    pub async fn connect(
        base_url: &str,
        username: &str,
        clock: Arc<dyn LogicalClock>,
    ) -> Result<Self, ClientError> {
        let reply = handshake(base_url, username, clock.now()).await?;
        let synced = clock.sync(&reply.timestamp);
        tracing::debug!(
            server_timestamp = %reply.timestamp,
            local_timestamp = %synced,
            "handshake accepted"
        );

        let stream = open_stream(base_url, &reply.token).await?;

        Ok(Self {
            username: normalize_username(username),
            token: reply.token,
            joined_at: reply.timestamp,
            clock,
            stream,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Server timestamp assigned to this session's join
    pub fn joined_at(&self) -> &Timestamp {
        &self.joined_at
    }

    pub fn clock(&self) -> &Arc<dyn LogicalClock> {
        &self.clock
    }

    /// Split into independently usable sending and receiving halves.
    pub fn into_split(self) -> (ClientSender, ClientReceiver) {
        let (sink, stream) = self.stream.split();
        (
            ClientSender {
                sink,
                clock: self.clock.clone(),
            },
            ClientReceiver {
                stream,
                clock: self.clock,
            },
        )
    }
}

/// Sending half of a session
pub struct ClientSender {
    sink: SplitSink<EventStream, Message>,
    clock: Arc<dyn LogicalClock>,
}

impl ClientSender {
    /// Tick the local clock and send `text` stamped with the new value.
    pub async fn send(&mut self, text: &str) -> Result<Timestamp, ClientError> {
        let timestamp = self.clock.tick();
        let frame = ClientFrame {
            timestamp: timestamp.clone(),
            text: text.to_string(),
        };
        let json =
            serde_json::to_string(&frame).map_err(|e| ClientError::Protocol(e.to_string()))?;

        self.sink
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(timestamp)
    }

    /// Close the stream. The server then broadcasts our departure.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.sink
            .close()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))
    }
}

/// Receiving half of a session
pub struct ClientReceiver {
    stream: SplitStream<EventStream>,
    clock: Arc<dyn LogicalClock>,
}

impl ClientReceiver {
    /// Wait for the next event and merge its timestamp into the local clock.
    ///
    /// Returns `Ok(None)` once the server closes the stream. Frames that do
    /// not decode are logged and skipped.
    pub async fn next_event(&mut self) -> Result<Option<ServerFrame>, ClientError> {
        while let Some(message) = self.stream.next().await {
            let message = message.map_err(|e| ClientError::Connection(e.to_string()))?;

            match message {
                Message::Text(text) => match serde_json::from_str::<ServerFrame>(&text) {
                    Ok(frame) => {
                        self.clock.sync(&frame.timestamp);
                        return Ok(Some(frame));
                    }
                    Err(e) => tracing::warn!("Ignoring undecodable frame: {}", e),
                },
                Message::Close(_) => {
                    tracing::info!("Server closed the connection");
                    return Ok(None);
                }
                _ => {}
            }
        }

        Ok(None)
    }
}

/// Perform the handshake against `base_url`.
pub async fn handshake(
    base_url: &str,
    username: &str,
    timestamp: Timestamp,
) -> Result<ConnectResponse, ClientError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), CONNECT_PATH);
    let request = ConnectRequest {
        username: username.to_string(),
        timestamp: Some(timestamp),
    };

    let response = reqwest::Client::new()
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error = response.json::<ErrorResponse>().await.ok();
        return Err(match error {
            Some(ErrorResponse {
                code: ErrorCode::AlreadyExists,
                ..
            }) => ClientError::UsernameTaken(username.to_string()),
            Some(ErrorResponse {
                code: ErrorCode::InvalidArgument,
                message,
            }) => ClientError::InvalidUsername(message),
            Some(ErrorResponse {
                code: ErrorCode::Unauthenticated,
                ..
            }) => ClientError::Unauthenticated,
            None => ClientError::Connection(format!("handshake failed with status {status}")),
        });
    }

    response
        .json::<ConnectResponse>()
        .await
        .map_err(|e| ClientError::Protocol(e.to_string()))
}

/// Open the event stream of the session identified by `token`.
///
/// The token travels in the `authorization` header; a rejected token is
/// reported as [`ClientError::Unauthenticated`].
pub async fn open_stream(base_url: &str, token: &str) -> Result<EventStream, ClientError> {
    let url = stream_url(base_url)?;
    let mut request = url
        .into_client_request()
        .map_err(|e| ClientError::Connection(e.to_string()))?;
    let authorization = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::Unauthenticated)?;
    request
        .headers_mut()
        .insert(AUTHORIZATION_HEADER, authorization);

    match connect_async(request).await {
        Ok((stream, _response)) => Ok(stream),
        Err(tungstenite::Error::Http(response))
            if response.status() == StatusCode::UNAUTHORIZED =>
        {
            Err(ClientError::Unauthenticated)
        }
        Err(e) => Err(ClientError::Connection(e.to_string())),
    }
}

/// WebSocket URL of the event stream for an HTTP base URL.
pub fn stream_url(base_url: &str) -> Result<String, ClientError> {
    let base = base_url.trim_end_matches('/');
    let (scheme, rest) = if let Some(rest) = base.strip_prefix("http://") {
        ("ws://", rest)
    } else if let Some(rest) = base.strip_prefix("https://") {
        ("wss://", rest)
    } else if let Some(rest) = base.strip_prefix("ws://") {
        ("ws://", rest)
    } else if let Some(rest) = base.strip_prefix("wss://") {
        ("wss://", rest)
    } else {
        return Err(ClientError::Connection(format!(
            "unsupported URL scheme: {base_url}"
        )));
    };

    Ok(format!("{scheme}{rest}{STREAM_PATH}"))
}
