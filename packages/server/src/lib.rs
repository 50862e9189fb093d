//! ChitChat broadcast chat server.
//!
//! Clients register a username over HTTP, receive a session token, and open a
//! WebSocket event stream with it. Every event is stamped by a single
//! process-wide logical clock and fanned out to all live sessions through
//! bounded per-session queues.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

pub use config::ServerConfig;
pub use ui::Server;
