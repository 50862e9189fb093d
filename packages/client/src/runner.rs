//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use chitchat_shared::clock::{ClockKind, LogicalClock};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    domain::{normalize_username, should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    formatter::MessageFormatter,
    session::ChatClient,
    ui::redisplay_prompt,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the interactive client with reconnection logic
///
/// The same logical clock is kept across reconnects, so timestamps never go
/// backwards from the user's point of view.
pub async fn run_client(
    url: String,
    username: String,
    clock_kind: ClockKind,
) -> Result<(), ClientError> {
    let username = normalize_username(&username);
    let clock = clock_kind.build(&username);
    let mut input_rx = spawn_readline(username.clone());
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &username, clock.clone(), &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    return Err(e);
                }
                if !should_attempt_reconnect(&e, reconnect_count + 1, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}

/// Run one session until the user exits (`Ok`) or the connection fails
async fn run_client_session(
    url: &str,
    username: &str,
    clock: Arc<dyn LogicalClock>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let client = ChatClient::connect(url, username, clock).await?;
    tracing::info!("Connected to chat server!");
    print!(
        "{}",
        MessageFormatter::format_welcome(client.username(), client.joined_at())
    );

    let (mut sender, mut receiver) = client.into_split();

    loop {
        tokio::select! {
            event = receiver.next_event() => match event? {
                Some(frame) => {
                    print!("{}", MessageFormatter::format_frame(&frame, username));
                    redisplay_prompt(username);
                }
                None => {
                    return Err(ClientError::Connection("Connection lost".to_string()));
                }
            },
            line = input_rx.recv() => match line {
                Some(line) => {
                    let timestamp = sender.send(&line).await?;
                    print!("{}", MessageFormatter::format_sent_confirmation(&timestamp));
                    redisplay_prompt(username);
                }
                None => {
                    if let Err(e) = sender.close().await {
                        tracing::debug!("Failed to close the stream: {}", e);
                    }
                    return Ok(());
                }
            },
        }
    }
}

/// Spawn a blocking thread for rustyline (synchronous readline)
///
/// The returned channel closes when input ends (Ctrl+D / Ctrl+C).
fn spawn_readline(username: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", username);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
