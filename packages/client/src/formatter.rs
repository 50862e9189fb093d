//! Message formatting utilities for client display.

use chitchat_shared::{
    clock::Timestamp,
    protocol::{EventPayload, ServerFrame},
};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown once the stream is open
    ///
    /// # Arguments
    ///
    /// * `username` - The current user's name
    /// * `joined_at` - Server timestamp of the join
    pub fn format_welcome(username: &str, joined_at: &Timestamp) -> String {
        format!(
            "\n============================================================\n\
             You are '{}' (joined at {}).\n\
             Type messages and press Enter to send. Press Ctrl+D to exit.\n\
             ============================================================\n",
            username, joined_at
        )
    }

    /// Format any event received from the server
    ///
    /// # Arguments
    ///
    /// * `frame` - The received frame
    /// * `current_username` - The current user's name (to mark as "me")
    pub fn format_frame(frame: &ServerFrame, current_username: &str) -> String {
        match &frame.event {
            EventPayload::Message { username, text } => {
                Self::format_chat_message(&frame.timestamp, username, text)
            }
            EventPayload::Joined { username } => Self::format_participant_joined(
                &frame.timestamp,
                username,
                username == current_username,
            ),
            EventPayload::Left { username } => {
                Self::format_participant_left(&frame.timestamp, username)
            }
        }
    }

    /// Format a chat message
    pub fn format_chat_message(timestamp: &Timestamp, from: &str, text: &str) -> String {
        format!("\n[{}] @{}: {}\n", timestamp, from, text)
    }

    /// Format a participant-joined notification
    pub fn format_participant_joined(timestamp: &Timestamp, username: &str, is_me: bool) -> String {
        let me_suffix = if is_me { " (me)" } else { "" };
        format!("\n[{}] + {}{} joined\n", timestamp, username, me_suffix)
    }

    /// Format a participant-left notification
    pub fn format_participant_left(timestamp: &Timestamp, username: &str) -> String {
        format!("\n[{}] - {} left\n", timestamp, username)
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(timestamp: &Timestamp) -> String {
        format!("sent at {}\n", timestamp)
    }
}
