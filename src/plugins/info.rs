//! Group information commands.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::warn;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::utils::html_escape;

/// Handle /info (public).
pub async fn info_command(bot: ThrottledBot, msg: Message, _state: AppState) -> anyhow::Result<()> {
    let chat = &msg.chat;

    if !chat.is_group() && !chat.is_supergroup() {
        bot.send_message(chat.id, "This command only works in groups.")
            .await?;
        return Ok(());
    }

    let member_count = bot.get_chat_member_count(chat.id).await.unwrap_or(0);

    let text = format!(
        "ℹ️ <b>{}</b>\n\n\
         Chat id: <code>{}</code>\n\
         Members: {}",
        html_escape(chat.title().unwrap_or("Group")),
        chat.id,
        member_count,
    );

    bot.send_message(chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle /stats - moderation totals (admin).
pub async fn stats_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from.as_ref() else {
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

    let warn_stats = match state.warnings.chat_stats(chat_id.0).await {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to load warn stats for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    let term_count = state
        .banned_terms
        .list(chat_id.0)
        .await
        .map(|t| t.len())
        .unwrap_or(0);

    let security_level = state
        .configs
        .get_or_default(chat_id.0)
        .await
        .map(|c| c.security_level)
        .unwrap_or(1);

    let text = format!(
        "📊 <b>Moderation stats</b>\n\n\
         Warnings issued: {}\n\
         Users warned: {}\n\
         Banned terms: {}\n\
         Security level: {}",
        warn_stats.total, warn_stats.warned_users, term_count, security_level,
    );

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle /members (public).
pub async fn members_command(
    bot: ThrottledBot,
    msg: Message,
    _state: AppState,
) -> anyhow::Result<()> {
    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }

    match bot.get_chat_member_count(msg.chat.id).await {
        Ok(count) => {
            bot.send_message(msg.chat.id, format!("👥 This group has {} members.", count))
                .await?;
        }
        Err(e) => {
            warn!("Failed to get member count for {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, BotError::Gateway(e).user_message())
                .await?;
        }
    }

    Ok(())
}
