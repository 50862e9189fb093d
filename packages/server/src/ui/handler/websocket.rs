//! WebSocket event stream handler.
//!
//! Each stream runs two tasks: a receiver loop feeding inbound messages to
//! `SendMessageUseCase`, and a pusher loop draining the session's outbound
//! queue to the socket. Whichever ends first (or a close signal from the
//! registry) tears the other down, then the session is disconnected once.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use chitchat_shared::protocol::{AUTHORIZATION_HEADER, ClientFrame, ServerFrame};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::task::JoinHandle;

use crate::{
    domain::{
        AuthenticatedSession, ConnectionEvent, ConnectionState, DisconnectReason, OutboundQueue,
        Username,
    },
    ui::{error::ApiError, state::AppState},
};

use super::advance;

/// Stream upgrade endpoint
///
/// The session token is read from the `authorization` header before the
/// upgrade, so a bad token is answered with a plain 401.
pub async fn stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let authorization = headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|value| value.to_str().ok());

    let session = state
        .open_stream_usecase
        .execute(authorization)
        .await
        .inspect_err(|e| tracing::warn!("Stream rejected: {}", e))?;

    let token = session.handle.token().clone();
    let disconnect = state.disconnect_session_usecase.clone();

    Ok(ws
        .on_failed_upgrade(move |error| {
            tracing::warn!("WebSocket upgrade failed: {}", error);
            tokio::spawn(async move {
                disconnect
                    .execute(&token, DisconnectReason::TransportFailure)
                    .await;
            });
        })
        .on_upgrade(move |socket| run_connection(socket, state, session)))
}

async fn run_connection(socket: WebSocket, state: Arc<AppState>, session: AuthenticatedSession) {
    let AuthenticatedSession { handle, queue } = session;
    let username = handle.username().clone();

    let mut connection = advance(
        ConnectionState::Authenticated,
        ConnectionEvent::StreamOpened,
        &username,
    );
    tracing::info!(username = %username, "stream opened");

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(queue, sender);
    let mut recv_task = receiver_loop(receiver, state.clone(), username.clone());

    // None: the session was already closed by the server
    let reason = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or(Some(DisconnectReason::TransportFailure))
        }
        result = &mut send_task => {
            recv_task.abort();
            result.unwrap_or(Some(DisconnectReason::TransportFailure))
        }
        _ = handle.closed() => {
            recv_task.abort();
            send_task.abort();
            None
        }
    };

    connection = advance(connection, ConnectionEvent::StreamClosed, &username);
    debug_assert!(connection.is_terminal());

    match reason {
        Some(reason) => {
            state
                .disconnect_session_usecase
                .execute(handle.token(), reason)
                .await;
        }
        None => tracing::info!(username = %username, "stream closed by server"),
    }
}

/// Drains the session's outbound queue to the socket.
///
/// Returns `None` when the queue is closed by the server, or the failure
/// reason when writing to the socket fails.
fn pusher_loop(
    mut queue: OutboundQueue,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<Option<DisconnectReason>> {
    tokio::spawn(async move {
        while let Some(event) = queue.recv().await {
            let frame = ServerFrame::from(event);
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                tracing::debug!("Failed to write to socket: {}", e);
                return Some(DisconnectReason::TransportFailure);
            }
        }

        let _ = sender.close().await;
        None
    })
}

/// Feeds inbound frames to `SendMessageUseCase` until the client goes away.
fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    username: Username,
) -> JoinHandle<Option<DisconnectReason>> {
    tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(username = %username, "WebSocket error: {}", e);
                    return Some(DisconnectReason::TransportFailure);
                }
            };

            match message {
                Message::Text(text) => {
                    let frame = match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!(username = %username, "Ignoring undecodable frame: {}", e);
                            continue;
                        }
                    };

                    if let Err(e) = state
                        .send_message_usecase
                        .execute(&username, frame.text, &frame.timestamp)
                        .await
                    {
                        tracing::warn!(username = %username, "Dropped message: {}", e);
                    }
                }
                Message::Close(_) => {
                    tracing::info!(username = %username, "client requested close");
                    return Some(DisconnectReason::ClientClosed);
                }
                Message::Binary(_) => {
                    tracing::debug!(username = %username, "Ignoring binary frame");
                }
                // Ping/pong is handled by the WebSocket protocol layer
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }

        Some(DisconnectReason::ClientClosed)
    })
}
