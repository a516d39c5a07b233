//! Error taxonomy for bot operations.
//!
//! Component operations return [`BotError`]; command and event handlers
//! convert it into a fixed user-visible message at their own boundary so
//! no failure ever terminates the dispatch loop.

use thiserror::Error;

/// Errors produced by storage, gateway and command processing.
#[derive(Debug, Error)]
pub enum BotError {
    /// Durable store unreachable or a write failed.
    #[error("storage error: {0}")]
    Storage(#[from] mongodb::error::Error),

    /// Telegram API failure (rate limit, permission denied, message gone).
    #[error("telegram api error: {0}")]
    Gateway(#[from] teloxide::RequestError),

    /// Referenced user, challenge or warning does not exist.
    #[error("target not found")]
    NotFound,

    /// Malformed command arguments.
    #[error("invalid arguments: {0}")]
    Validation(String),

    /// Non-admin invoked an admin-only command.
    #[error("admin privileges required")]
    Permission,
}

impl BotError {
    /// The fixed message shown to the user for this error class.
    ///
    /// Full detail goes to the server-side logs only.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Permission => "❌ You need to be admin to use this command.",
            Self::NotFound => "❌ User not found.",
            Self::Validation(_) => "❌ Invalid arguments. Check /help for usage.",
            Self::Storage(_) | Self::Gateway(_) => "❌ An error occurred. Please try again later.",
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_fixed() {
        assert_eq!(
            BotError::Permission.user_message(),
            "❌ You need to be admin to use this command."
        );
        assert_eq!(BotError::NotFound.user_message(), "❌ User not found.");
        assert_eq!(
            BotError::Validation("bad".into()).user_message(),
            "❌ Invalid arguments. Check /help for usage."
        );
    }
}
