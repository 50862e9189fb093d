//! Code shared by the ChitChat server and client.
//!
//! - [`clock`]: logical clocks (Lamport and vector) and their timestamps
//! - [`protocol`]: JSON wire types for the handshake and the event stream
//! - [`logger`]: tracing subscriber setup for the binaries
//! - [`time`]: wall-clock helpers

pub mod clock;
pub mod logger;
pub mod protocol;
pub mod time;
