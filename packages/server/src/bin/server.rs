//! ChitChat broadcast chat server.
//!
//! Stamps every event with a logical clock and fans it out to all connected
//! clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chitchat-server
//! cargo run --bin chitchat-server -- --host 0.0.0.0 --port 3000 --clock vector
//! ```

use std::time::Duration;

use chitchat_server::{
    Server, ServerConfig,
    config::{DEFAULT_NODE_ID, DEFAULT_STREAM_OPEN_TIMEOUT},
};
use chitchat_shared::{
    clock::ClockKind,
    logger::setup_logger,
    protocol::MAX_MESSAGE_LENGTH,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chitchat-server")]
#[command(about = "Broadcast chat server with logical timestamps", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Logical clock variant
    #[arg(long, value_enum, default_value_t = ClockKind::Lamport)]
    clock: ClockKind,

    /// Participant id of the server in vector timestamps
    #[arg(long, default_value = DEFAULT_NODE_ID)]
    node_id: String,

    /// Capacity of each session's outbound queue
    #[arg(long, default_value = "32", value_parser = clap::value_parser!(u64).range(1..))]
    queue_capacity: u64,

    /// Maximum accepted message length, in characters
    #[arg(long, default_value_t = MAX_MESSAGE_LENGTH)]
    max_message_length: usize,

    /// Seconds a handshake waits for its stream to open before the session is dropped
    #[arg(long, default_value_t = DEFAULT_STREAM_OPEN_TIMEOUT.as_secs())]
    stream_open_timeout_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            clock: args.clock,
            node_id: args.node_id,
            queue_capacity: usize::try_from(args.queue_capacity).unwrap_or(usize::MAX),
            max_message_length: args.max_message_length,
            stream_open_timeout: Duration::from_secs(args.stream_open_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    tracing::info!(
        clock = ?config.clock,
        queue_capacity = config.queue_capacity,
        "starting server"
    );

    let server = Server::from_config(&config);
    if let Err(e) = server.run(&config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
