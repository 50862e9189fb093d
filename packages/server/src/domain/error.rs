//! Domain errors.

use thiserror::Error;

use super::connection::{ConnectionEvent, ConnectionState};

/// Validation errors of the value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username is {length} characters long (max {max})")]
    UsernameTooLong { length: usize, max: usize },

    #[error("username must not contain control characters")]
    InvalidUsername,

    #[error("message is {length} characters long (max {max})")]
    MessageTooLong { length: usize, max: usize },
}

/// Errors of the session registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another live session already uses the username
    #[error("username '{0}' is already in use")]
    UsernameTaken(String),

    /// Unknown token, or a token whose stream is already open
    #[error("unauthenticated")]
    Unauthenticated,
}

/// A connection state machine event that is not valid in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition from {from:?} on {event:?}")]
pub struct InvalidTransition {
    pub from: ConnectionState,
    pub event: ConnectionEvent,
}
