//! Group rules commands.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::warn;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::utils::html_escape;

const DEFAULT_RULES: &str = "No rules set yet. Be respectful and stay on topic.";

/// Handle /rules - show the group rules (public).
pub async fn rules_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let config = match state.configs.get_or_default(msg.chat.id.0).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Config lookup failed for chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    let rules = config.rules_text.as_deref().unwrap_or(DEFAULT_RULES);

    bot.send_message(
        msg.chat.id,
        format!("📜 <b>Group rules</b>\n\n{}", html_escape(rules)),
    )
    .parse_mode(ParseMode::Html)
    .reply_parameters(ReplyParameters::new(msg.id))
    .await?;

    Ok(())
}

/// Handle /setrules - start a session whose next message becomes the rules.
pub async fn setrules_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }

    if !state.permissions.is_admin(chat_id, user.id).await.unwrap_or(false) {
        bot.send_message(chat_id, BotError::Permission.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    state.setup.begin_rules(chat_id.0, user.id.0);

    bot.send_message(
        chat_id,
        "📝 Send the new group rules as your next message.\n\n/cancel to abort.",
    )
    .await?;

    Ok(())
}
