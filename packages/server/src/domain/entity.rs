//! Entities: sessions and the events fanned out to them.

use std::sync::Arc;

use chitchat_shared::clock::Timestamp;
use tokio::sync::{Notify, mpsc};

use super::value_object::{MessageText, SessionToken, Username};

/// Consumer side of a session's bounded outbound queue
pub type OutboundQueue = mpsc::Receiver<ServerEvent>;

/// What happened, without the timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message { username: Username, text: MessageText },
    Joined { username: Username },
    Left { username: Username },
}

/// An event stamped by the server clock, ready for fanout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub timestamp: Timestamp,
    pub kind: EventKind,
}

impl ServerEvent {
    pub fn message(username: Username, text: MessageText, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            kind: EventKind::Message { username, text },
        }
    }

    pub fn joined(username: Username, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            kind: EventKind::Joined { username },
        }
    }

    pub fn left(username: Username, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            kind: EventKind::Left { username },
        }
    }

    /// The user the event is about.
    pub fn username(&self) -> &Username {
        match &self.kind {
            EventKind::Message { username, .. }
            | EventKind::Joined { username }
            | EventKind::Left { username } => username,
        }
    }
}

/// Why an event could not be enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The consumer is not keeping up
    QueueFull,
    /// The consumer is gone
    Closed,
}

/// Cheap, cloneable reference to a live session, used for fanout.
///
/// Holds the producer side of the outbound queue and the close signal; the
/// transport stays with the connection handler.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    token: SessionToken,
    username: Username,
    outbound: mpsc::Sender<ServerEvent>,
    close_signal: Arc<Notify>,
}

impl SessionHandle {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Enqueue without waiting.
    pub fn try_deliver(&self, event: ServerEvent) -> Result<(), DeliveryError> {
        self.outbound.try_send(event).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Ask the connection handler to tear the session down.
    ///
    /// The signal is stored if the handler is not waiting yet.
    pub fn close(&self) {
        self.close_signal.notify_one();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.close_signal.notified().await;
    }
}

/// Registry record of a session.
#[derive(Debug)]
pub struct Session {
    handle: SessionHandle,
    connected_at: i64,
    // Handed to the connection handler when the stream opens.
    queue: Option<OutboundQueue>,
}

impl Session {
    /// Create a session with an empty outbound queue of `queue_capacity`
    /// (at least 1).
    pub fn open(
        token: SessionToken,
        username: Username,
        connected_at: i64,
        queue_capacity: usize,
    ) -> Self {
        let (outbound, queue) = mpsc::channel(queue_capacity.max(1));
        Self {
            handle: SessionHandle {
                token,
                username,
                outbound,
                close_signal: Arc::new(Notify::new()),
            },
            connected_at,
            queue: Some(queue),
        }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn into_handle(self) -> SessionHandle {
        self.handle
    }

    pub fn token(&self) -> &SessionToken {
        &self.handle.token
    }

    pub fn username(&self) -> &Username {
        &self.handle.username
    }

    /// Unix milliseconds (UTC) of the handshake
    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }

    /// Take the queue consumer. Only the first call gets it.
    pub fn take_queue(&mut self) -> Option<OutboundQueue> {
        self.queue.take()
    }

    /// Registered, but no stream has taken the queue yet.
    pub fn is_pending(&self) -> bool {
        self.queue.is_some()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            username: self.handle.username.clone(),
            connected_at: self.connected_at,
        }
    }
}

/// Public view of a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub username: Username,
    /// Unix milliseconds (UTC)
    pub connected_at: i64,
}

/// Result of a successful handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub token: SessionToken,
    pub username: Username,
    /// Server clock right after merging the client's starting value
    pub timestamp: Timestamp,
}

/// A session whose stream has just been opened
#[derive(Debug)]
pub struct AuthenticatedSession {
    pub handle: SessionHandle,
    /// Exclusively consumed by this session's writer task
    pub queue: OutboundQueue,
}
