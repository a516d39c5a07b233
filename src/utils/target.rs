//! Target user extraction for moderation commands.

use teloxide::prelude::*;
use teloxide::types::{MessageEntityKind, UserId};

use crate::bot::dispatcher::ThrottledBot;

/// A user referenced by a moderation command.
#[derive(Debug, Clone)]
pub struct Target {
    pub user_id: UserId,
    pub first_name: String,
    /// How many command arguments the reference consumed (0 for a reply).
    pub args_used: usize,
}

/// Resolve the target of a command from reply, numeric id, text mention
/// or @username (via `getChat`).
pub async fn extract_target(bot: &ThrottledBot, msg: &Message) -> Option<Target> {
    // 1. Reply takes precedence
    if let Some(reply) = msg.reply_to_message()
        && let Some(user) = &reply.from
    {
        return Some(Target {
            user_id: user.id,
            first_name: user.first_name.clone(),
            args_used: 0,
        });
    }

    let text = msg.text()?;
    let arg = text.split_whitespace().nth(1)?;

    // 2. Numeric user id
    if let Ok(id) = arg.parse::<u64>() {
        return Some(Target {
            user_id: UserId(id),
            first_name: format!("User {}", id),
            args_used: 1,
        });
    }

    // 3. Text mention entity (users without a username)
    if let Some(entities) = msg.entities() {
        for entity in entities {
            if let MessageEntityKind::TextMention { user } = &entity.kind {
                return Some(Target {
                    user_id: user.id,
                    first_name: user.first_name.clone(),
                    args_used: 1,
                });
            }
        }
    }

    // 4. @username lookup
    if arg.starts_with('@')
        && let Ok(chat) = bot.get_chat(arg.to_string()).await
        && chat.is_private()
    {
        return Some(Target {
            user_id: UserId(chat.id.0 as u64),
            first_name: chat.first_name().unwrap_or("User").to_string(),
            args_used: 1,
        });
    }

    None
}

/// Extract the free-text remainder of a command after the target reference.
///
/// Returns `None` when no reason was given.
pub fn extract_reason(msg: &Message, args_used: usize) -> Option<String> {
    let reason = msg
        .text()
        .unwrap_or("")
        .split_whitespace()
        .skip(1 + args_used)
        .collect::<Vec<_>>()
        .join(" ");

    if reason.is_empty() { None } else { Some(reason) }
}
