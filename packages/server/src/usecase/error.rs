//! UseCase errors.

use thiserror::Error;

use crate::domain::{RegistryError, ValueObjectError};

/// Handshake errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("invalid username: {0}")]
    InvalidUsername(ValueObjectError),

    #[error("username '{0}' is already in use")]
    UsernameTaken(String),

    #[error(transparent)]
    Registry(RegistryError),
}

/// Stream upgrade errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenStreamError {
    #[error("missing or invalid session token")]
    Unauthenticated,
}

/// Inbound message errors. The connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] ValueObjectError),
}
