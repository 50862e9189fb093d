//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use crate::error::ClientError;

/// Check if the client should exit immediately based on the error type.
///
/// Errors the server will keep returning no matter how often we retry
/// (a taken or invalid username, a rejected token) are not retried.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::UsernameTaken(_) | ClientError::InvalidUsername(_) | ClientError::Unauthenticated
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}

/// The username as the server registers it (surrounding whitespace removed).
///
/// Used as the participant id of the client's clock, so it must match the
/// name the server stamps events with.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username_trims_whitespace() {
        // テスト項目: 前後の空白が取り除かれ、サーバーが登録する名前と一致する
        // given (前提条件):
        let raw = "  alice\t";

        // when (操作):
        let result = normalize_username(raw);

        // then (期待する結果):
        assert_eq!(result, "alice");
    }

    #[test]
    fn test_should_exit_immediately_with_username_taken() {
        // テスト項目: UsernameTaken エラーの場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::UsernameTaken("alice".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_exit_immediately_with_unauthenticated() {
        // テスト項目: Unauthenticated エラーの場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::Unauthenticated;

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_exit_immediately_with_connection_error() {
        // テスト項目: Connection エラーの場合、即座に終了すべきではないと判定される
        // given (前提条件):
        let error = ClientError::Connection("network error".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_with_invalid_username() {
        // テスト項目: InvalidUsername エラーの場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::InvalidUsername("empty".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 0, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ClientError::Connection("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 4, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::Protocol("bad frame".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }
}
