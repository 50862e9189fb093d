//! Conversion logic between domain entities and wire DTOs.

use chitchat_shared::{
    protocol::{EventPayload, ServerFrame, SessionSummaryDto},
    time::millis_to_rfc3339,
};

use crate::domain::{EventKind, ServerEvent, SessionSummary};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<EventKind> for EventPayload {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Message { username, text } => EventPayload::Message {
                username: username.into_string(),
                text: text.into_string(),
            },
            EventKind::Joined { username } => EventPayload::Joined {
                username: username.into_string(),
            },
            EventKind::Left { username } => EventPayload::Left {
                username: username.into_string(),
            },
        }
    }
}

impl From<ServerEvent> for ServerFrame {
    fn from(event: ServerEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            event: event.kind.into(),
        }
    }
}

impl From<SessionSummary> for SessionSummaryDto {
    fn from(summary: SessionSummary) -> Self {
        Self {
            username: summary.username.into_string(),
            connected_at: millis_to_rfc3339(summary.connected_at),
        }
    }
}
