//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chitchat_shared::protocol::{ConnectRequest, ConnectResponse, SessionSummaryDto};

use crate::{
    domain::{ConnectionEvent, ConnectionState},
    ui::{error::ApiError, state::AppState},
};

use super::advance;

/// Handshake endpoint
///
/// Registers the username, merges the client's starting timestamp and
/// returns the session token. The session is dropped again if its stream is
/// not opened within the configured timeout.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected handshake body: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    })?;

    let connection = ConnectionState::default();
    let registration = match state
        .connect_session_usecase
        .execute(&request.username, request.timestamp)
        .await
    {
        Ok(registration) => registration,
        Err(e) => {
            tracing::warn!(username = %request.username, "Handshake rejected: {}", e);
            let connection = advance(
                connection,
                ConnectionEvent::HandshakeRejected,
                &request.username,
            );
            debug_assert_eq!(connection, ConnectionState::Connecting);
            return Err(e.into());
        }
    };
    let connection = advance(
        connection,
        ConnectionEvent::HandshakeAccepted,
        &registration.username,
    );
    debug_assert_eq!(connection, ConnectionState::Authenticated);

    state
        .disconnect_session_usecase
        .clone()
        .spawn_pending_expiry(registration.token.clone(), state.stream_open_timeout);

    Ok(Json(ConnectResponse {
        token: registration.token.as_str().to_string(),
        timestamp: registration.timestamp,
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Live sessions, sorted by username
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state.list_sessions_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(sessions.into_iter().map(SessionSummaryDto::from).collect())
}
