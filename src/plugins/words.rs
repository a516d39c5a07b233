//! Banned-term management commands.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::TermAction;
use crate::error::BotError;
use crate::utils::html_escape;

async fn require_admin(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
) -> anyhow::Result<bool> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(false);
    };

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(false);
    }

    if !state.permissions.is_admin(msg.chat.id, user.id).await.unwrap_or(false) {
        bot.send_message(msg.chat.id, BotError::Permission.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(false);
    }

    Ok(true)
}

/// Handle /addword <term> [delete|warn|mute].
pub async fn addword_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let text = msg.text().unwrap_or("");
    let mut args = text.split_whitespace().skip(1);

    let Some(term) = args.next() else {
        bot.send_message(
            msg.chat.id,
            "Usage: /addword <term> [delete|warn|mute]",
        )
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
        return Ok(());
    };

    let action = match args.next() {
        Some(raw) => match TermAction::from_str(raw) {
            Some(a) => a,
            None => {
                let err = BotError::Validation(format!("unknown term action '{raw}'"));
                warn!("/addword rejected in chat {}: {}", msg.chat.id, err);
                bot.send_message(msg.chat.id, err.user_message())
                    .reply_parameters(ReplyParameters::new(msg.id))
                    .await?;
                return Ok(());
            }
        },
        None => TermAction::Delete,
    };

    let record = match state
        .banned_terms
        .add(msg.chat.id.0, term, action, admin_id)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Failed to add banned term in chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    info!(
        "Banned term '{}' ({}) added in chat {}",
        record.term,
        record.action.as_str(),
        msg.chat.id
    );
    bot.send_message(
        msg.chat.id,
        format!(
            "🚫 Term <code>{}</code> banned (action: {}).",
            html_escape(&record.term),
            record.action.as_str()
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Handle /delword <term>.
pub async fn delword_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let text = msg.text().unwrap_or("");
    let Some(term) = text.split_whitespace().nth(1) else {
        bot.send_message(msg.chat.id, "Usage: /delword <term>")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    let deleted = match state.banned_terms.remove(msg.chat.id.0, term).await {
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to remove banned term in chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    let reply = if deleted > 0 {
        format!("✅ Term <code>{}</code> unbanned.", html_escape(&term.to_lowercase()))
    } else {
        format!("Term <code>{}</code> was not banned.", html_escape(&term.to_lowercase()))
    };

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle /listwords.
pub async fn listwords_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !require_admin(&bot, &msg, &state).await? {
        return Ok(());
    }

    let terms = match state.banned_terms.list(msg.chat.id.0).await {
        Ok(t) => t,
        Err(e) => {
            warn!("Failed to list banned terms in chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    if terms.is_empty() {
        bot.send_message(msg.chat.id, "No banned terms configured.")
            .await?;
        return Ok(());
    }

    let mut lines = vec!["🚫 <b>Banned terms</b>\n".to_string()];
    for term in &terms {
        lines.push(format!(
            "• <code>{}</code> ({})",
            html_escape(&term.term),
            term.action.as_str()
        ));
    }

    bot.send_message(msg.chat.id, lines.join("\n"))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}
