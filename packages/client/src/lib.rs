//! ChitChat chat client.
//!
//! [`ChatClient`] performs the HTTP handshake and opens the event stream,
//! keeping a local logical clock in step with the server: outgoing messages
//! tick it, incoming events are merged into it.
//!
//! The `chitchat-client` binary wraps it in an interactive prompt
//! ([`runner::run_client`]).

pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use session::{ChatClient, ClientReceiver, ClientSender};
