//! Utility functions.

pub mod target;

pub use target::extract_target;

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::debug;

use crate::bot::dispatcher::ThrottledBot;

/// Escape HTML special characters for Telegram's HTML parse mode.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Format a username for display.
///
/// If the user has a username, returns @username.
/// Otherwise, returns the first name.
pub fn format_username(username: Option<&str>, first_name: &str) -> String {
    match username {
        Some(u) => format!("@{}", u),
        None => first_name.to_string(),
    }
}

/// HTML mention link for a user.
pub fn mention(user_id: u64, name: &str) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user_id,
        html_escape(name)
    )
}

/// Delete a message after a delay on a spawned one-shot task.
///
/// Best effort: the message may already be gone, so failures are logged
/// and swallowed.
pub fn schedule_delete(bot: ThrottledBot, chat_id: ChatId, message_id: MessageId, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = bot.delete_message(chat_id, message_id).await {
            debug!(
                "Scheduled delete of message {} in {} failed: {}",
                message_id.0, chat_id, e
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_format_username_fallback() {
        assert_eq!(format_username(Some("alice"), "Alice"), "@alice");
        assert_eq!(format_username(None, "Alice"), "Alice");
    }

    #[test]
    fn test_mention_escapes_name() {
        let m = mention(42, "<Bob>");
        assert_eq!(m, "<a href=\"tg://user?id=42\">&lt;Bob&gt;</a>");
    }
}
