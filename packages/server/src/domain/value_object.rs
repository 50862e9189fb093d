//! Value objects
//!
//! 検証済みの値だけを保持する不変の型。生成時にバリデーションを行うため、
//! 一度生成された値は常に有効であることが保証される。

use std::fmt;

use rand::Rng;

use super::error::ValueObjectError;

/// Maximum username length, in characters
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Username of a live session (unique among live sessions)
///
/// Surrounding whitespace is trimmed; the result must be 1 to
/// [`MAX_USERNAME_LENGTH`] characters without control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyUsername);
        }

        let length = trimmed.chars().count();
        if length > MAX_USERNAME_LENGTH {
            return Err(ValueObjectError::UsernameTooLong {
                length,
                max: MAX_USERNAME_LENGTH,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(ValueObjectError::InvalidUsername);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session credential issued by the handshake
///
/// 256 random bits, hex encoded. `Debug` only shows a short prefix so tokens
/// never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Number of random bytes in a generated token
    pub const BYTES: usize = 32;

    /// Generate a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let bytes: [u8; Self::BYTES] = rand::rng().random();
        Self(hex::encode(bytes))
    }

    /// Parse a token from an `authorization` header value.
    ///
    /// Accepts the raw token or `Bearer <token>`. Returns `None` for a blank
    /// value; whether the token is actually valid is up to the registry.
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .unwrap_or(value)
            .trim();

        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

/// Text of a chat message, at most `max_length` characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(text: impl Into<String>, max_length: usize) -> Result<Self, ValueObjectError> {
        let text = text.into();
        let length = text.chars().count();
        if length > max_length {
            return Err(ValueObjectError::MessageTooLong {
                length,
                max: max_length,
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
