//! Interactive ChitChat client.
//!
//! Registers a username with the server, then sends each line typed at the
//! prompt and prints every event the server broadcasts, stamped with its
//! logical timestamp. Reconnects automatically when the connection drops
//! (max 5 attempts with 5 second interval); a taken username is fatal.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chitchat-client -- --username alice
//! cargo run --bin chitchat-client -- -u bob --clock vector
//! ```

use clap::Parser;

use chitchat_client::runner::run_client;
use chitchat_shared::{clock::ClockKind, logger::setup_logger};

#[derive(Parser, Debug)]
#[command(name = "chitchat-client")]
#[command(about = "Chat client keeping a logical clock in step with the server", long_about = None)]
struct Args {
    /// Username shown to other participants (must be unique)
    #[arg(short = 'u', long)]
    username: String,

    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Logical clock variant (must match the server's)
    #[arg(long, value_enum, default_value_t = ClockKind::Lamport)]
    clock: ClockKind,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = run_client(args.url, args.username, args.clock).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
