//! Per-message moderation checks.
//!
//! Runs after the command branches: antispam rate check first, then the
//! banned-term scan. Admins and bot owners are exempt from both.

use std::time::Duration;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatPermissions, Me, ParseMode};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::TermAction;
use crate::moderation::{PolicyAction, evaluate_warning, first_match};
use crate::utils::{html_escape, mention, schedule_delete};

/// How long the antispam notice stays before self-deleting.
const TRANSIENT_NOTICE_SECS: u64 = 5;

/// Mute duration applied by the Mute term action.
const TERM_MUTE_HOURS: i64 = 1;

/// Handler for plain group messages.
pub fn message_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(is_checkable).endpoint(check_message)
}

/// Plain group message with a human sender and some text or caption.
fn is_checkable(msg: Message) -> bool {
    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return false;
    }

    let Some(user) = &msg.from else {
        return false;
    };
    if user.is_bot {
        return false;
    }

    let Some(text) = msg.text().or(msg.caption()) else {
        return false;
    };

    !text.starts_with('/')
}

async fn check_message(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    me: Me,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    if state.is_owner(user.id.0) {
        return Ok(());
    }

    // Admin exemption is checked once for both layers
    if state
        .permissions
        .is_admin(chat_id, user.id)
        .await
        .unwrap_or(false)
    {
        return Ok(());
    }

    let config = match state.configs.get_or_default(chat_id.0).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Config lookup failed for chat {}: {}", chat_id, e);
            return Ok(());
        }
    };

    if config.antispam_enabled {
        let check = state.rate_limiter.record_and_check(user.id.0);
        if check.exceeded {
            debug!(
                "User {} flooding in chat {} ({} msgs in window)",
                user.id, chat_id, check.count
            );

            if bot_may_delete(&state, chat_id, &me).await {
                if let Err(e) = bot.delete_message(chat_id, msg.id).await {
                    warn!("Failed to delete flood message in {}: {}", chat_id, e);
                }
            } else {
                warn!("Missing delete right in chat {}; flood message kept", chat_id);
            }

            // Transient notice, cleaned up by a one-shot task
            match bot
                .send_message(
                    chat_id,
                    format!(
                        "⚠️ {}, you're sending messages too fast. Slow down.",
                        mention(user.id.0, &user.first_name)
                    ),
                )
                .parse_mode(ParseMode::Html)
                .await
            {
                Ok(notice) => schedule_delete(
                    bot.clone(),
                    chat_id,
                    notice.id,
                    Duration::from_secs(TRANSIENT_NOTICE_SECS),
                ),
                Err(e) => warn!("Failed to send flood notice in {}: {}", chat_id, e),
            }

            return Ok(());
        }
    }

    let text = msg.text().or(msg.caption()).unwrap_or("");
    let terms = match state.banned_terms.list(chat_id.0).await {
        Ok(t) => t,
        Err(e) => {
            warn!("Term list lookup failed for chat {}: {}", chat_id, e);
            return Ok(());
        }
    };

    let Some(hit) = first_match(&terms, text) else {
        return Ok(());
    };
    let hit = hit.clone();

    // The offending message is always removed; the action decides what
    // happens on top of that.
    if bot_may_delete(&state, chat_id, &me).await {
        if let Err(e) = bot.delete_message(chat_id, msg.id).await {
            warn!("Failed to delete message in {}: {}", chat_id, e);
        }
    } else {
        warn!("Missing delete right in chat {}; message kept", chat_id);
    }

    let applied = match hit.action {
        TermAction::Delete => PolicyAction::Deleted,
        TermAction::Warn => {
            warn_for_term(&bot, chat_id, &user, &hit.term, config.max_warnings, &state, &me)
                .await?;
            PolicyAction::Warned
        }
        TermAction::Mute => {
            mute_for_term(&bot, chat_id, &user, &hit.term).await?;
            PolicyAction::Muted
        }
    };

    info!(
        "Banned term '{}' by user {} in chat {}: {:?}",
        hit.term, user.id, chat_id, applied
    );

    Ok(())
}

/// The bot enforces with its own chat-member rights; without the delete
/// right the offending message has to stay.
async fn bot_may_delete(state: &AppState, chat_id: ChatId, me: &Me) -> bool {
    state
        .permissions
        .can_delete_messages(chat_id, me.id)
        .await
        .unwrap_or(false)
}

/// Record a bot-issued warning for a banned term; escalation applies
/// exactly as for /warn.
async fn warn_for_term(
    bot: &ThrottledBot,
    chat_id: ChatId,
    user: &teloxide::types::User,
    term: &str,
    max_warnings: u32,
    state: &AppState,
    me: &Me,
) -> anyhow::Result<()> {
    let reason = format!("Used banned term: {}", term);

    let count = match state
        .warnings
        .add(user.id.0, chat_id.0, &reason, me.id.0)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to record warning for {}: {}", user.id, e);
            return Ok(());
        }
    };

    let verdict = evaluate_warning(count, max_warnings);

    if verdict.auto_ban {
        match bot.ban_chat_member(chat_id, user.id).await {
            Ok(_) => {
                if let Err(e) = state.warnings.clear(user.id.0, chat_id.0).await {
                    warn!("Failed to clear warnings for {}: {}", user.id, e);
                }
                bot.send_message(
                    chat_id,
                    format!(
                        "🚫 {} has been banned: reached {}/{} warnings.",
                        mention(user.id.0, &user.first_name),
                        verdict.count,
                        verdict.max_warnings
                    ),
                )
                .parse_mode(ParseMode::Html)
                .await?;
            }
            Err(e) => warn!("Failed to auto-ban user {}: {}", user.id, e),
        }
    } else {
        bot.send_message(
            chat_id,
            format!(
                "⚠️ {} warned for banned content ({}/{}).\n<b>Reason:</b> {}",
                mention(user.id.0, &user.first_name),
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

async fn mute_for_term(
    bot: &ThrottledBot,
    chat_id: ChatId,
    user: &teloxide::types::User,
    term: &str,
) -> anyhow::Result<()> {
    let until = chrono::Utc::now() + chrono::Duration::hours(TERM_MUTE_HOURS);

    match bot
        .restrict_chat_member(chat_id, user.id, ChatPermissions::empty())
        .until_date(until)
        .await
    {
        Ok(_) => {
            bot.send_message(
                chat_id,
                format!(
                    "🔇 {} muted for 1 hour (banned term: {}).",
                    mention(user.id.0, &user.first_name),
                    html_escape(term)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => warn!("Failed to mute user {}: {}", user.id, e),
    }

    Ok(())
}
