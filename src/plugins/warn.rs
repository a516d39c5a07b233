//! Warning commands.
//!
//! /warn appends a warning and applies the escalation rule; reaching the
//! group's limit bans the user and clears their history.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters, UserId};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::moderation::evaluate_warning;
use crate::utils::target::{extract_reason, extract_target};
use crate::utils::{html_escape, mention};

/// Handle /warn <target> [reason].
pub async fn warn_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(admin) = msg.from.clone() else {
        return Ok(());
    };

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }

    if !state
        .permissions
        .can_restrict_members(chat_id, admin.id)
        .await
        .unwrap_or(false)
    {
        bot.send_message(chat_id, BotError::Permission.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let Some(target) = extract_target(&bot, &msg).await else {
        bot.send_message(chat_id, BotError::NotFound.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    // Admins cannot be warned
    if state
        .permissions
        .is_admin(chat_id, target.user_id)
        .await
        .unwrap_or(false)
    {
        bot.send_message(chat_id, "❌ I won't warn an admin.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let reason = extract_reason(&msg, target.args_used).unwrap_or_else(|| "No reason given".to_string());

    let config = match state.configs.get_or_default(chat_id.0).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Config lookup failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    let count = match state
        .warnings
        .add(target.user_id.0, chat_id.0, &reason, admin.id.0)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to record warning in chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    let verdict = evaluate_warning(count, config.max_warnings);

    if verdict.auto_ban {
        match bot.ban_chat_member(chat_id, target.user_id).await {
            Ok(_) => {
                // A ban resets the pair's history
                if let Err(e) = state.warnings.clear(target.user_id.0, chat_id.0).await {
                    warn!("Failed to clear warnings for {}: {}", target.user_id, e);
                }

                info!(
                    "User {} auto-banned in chat {} at {}/{} warnings",
                    target.user_id, chat_id, verdict.count, verdict.max_warnings
                );
                bot.send_message(
                    chat_id,
                    format!(
                        "🚫 {} has been banned: reached {}/{} warnings.",
                        mention(target.user_id.0, &target.first_name),
                        verdict.count,
                        verdict.max_warnings
                    ),
                )
                .parse_mode(ParseMode::Html)
                .await?;
            }
            Err(e) => {
                warn!("Failed to ban user {}: {}", target.user_id, e);
                bot.send_message(chat_id, BotError::Gateway(e).user_message())
                    .await?;
            }
        }
    } else {
        bot.send_message(
            chat_id,
            format!(
                "⚠️ {} has been warned ({}/{}).\n<b>Reason:</b> {}",
                mention(target.user_id.0, &target.first_name),
                verdict.count,
                verdict.max_warnings,
                html_escape(&reason)
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
    }

    Ok(())
}

/// Handle /warnings [target] - public; defaults to the caller.
pub async fn warnings_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    let (user_id, name) = match extract_target(&bot, &msg).await {
        Some(t) => (t.user_id, t.first_name),
        None => match msg.from.as_ref() {
            Some(u) => (u.id, u.first_name.clone()),
            None => return Ok(()),
        },
    };

    let warnings = match state.warnings.list(user_id.0, chat_id.0).await {
        Ok(w) => w,
        Err(e) => {
            warn!("Failed to list warnings in chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    if warnings.is_empty() {
        bot.send_message(
            chat_id,
            format!("✅ {} has no warnings.", mention(user_id.0, &name)),
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    let mut lines = vec![format!(
        "⚠️ <b>Warnings for {}</b> ({} total)\n",
        mention(user_id.0, &name),
        warnings.len()
    )];
    for (i, w) in warnings.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, html_escape(&w.reason)));
    }

    bot.send_message(chat_id, lines.join("\n"))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle /clearwarns <target>.
pub async fn clearwarns_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id).unwrap_or(UserId(0));

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }

    if !state
        .permissions
        .can_restrict_members(chat_id, admin_id)
        .await
        .unwrap_or(false)
    {
        bot.send_message(chat_id, BotError::Permission.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let Some(target) = extract_target(&bot, &msg).await else {
        bot.send_message(chat_id, BotError::NotFound.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    let cleared = match state.warnings.clear(target.user_id.0, chat_id.0).await {
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to clear warnings in chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    bot.send_message(
        chat_id,
        format!(
            "✅ Cleared {} warning(s) for {}.",
            cleared,
            mention(target.user_id.0, &target.first_name)
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}
