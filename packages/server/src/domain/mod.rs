//! Domain layer: sessions, events, and the interfaces the use cases depend on.
//!
//! Concrete implementations of [`SessionRegistry`] and [`EventBroadcaster`]
//! live in the infrastructure layer.

pub mod broadcaster;
pub mod connection;
pub mod entity;
pub mod error;
pub mod registry;
pub mod value_object;

pub use broadcaster::{EventBroadcaster, PublishReport};
pub use connection::{ConnectionEvent, ConnectionState, DisconnectReason};
pub use entity::{
    AuthenticatedSession, DeliveryError, EventKind, OutboundQueue, Registration, ServerEvent,
    Session, SessionHandle, SessionSummary,
};
pub use error::{InvalidTransition, RegistryError, ValueObjectError};
pub use registry::SessionRegistry;
pub use value_object::{MessageText, SessionToken, Username};

#[cfg(test)]
pub use broadcaster::MockEventBroadcaster;
#[cfg(test)]
pub use registry::MockSessionRegistry;
