//! Mute and unmute commands.

use teloxide::prelude::*;
use teloxide::types::{ChatPermissions, ParseMode, ReplyParameters, UserId};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::utils::mention;
use crate::utils::target::{Target, extract_target};

/// Handle /mute - permanent restriction until /unmute.
pub async fn mute_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(target) = gate(&bot, &msg, &state, true).await? else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    match bot
        .restrict_chat_member(chat_id, target.user_id, ChatPermissions::empty())
        .await
    {
        Ok(_) => {
            info!("User {} muted in chat {}", target.user_id, chat_id);
            bot.send_message(
                chat_id,
                format!(
                    "🔇 {} has been muted.",
                    mention(target.user_id.0, &target.first_name)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => {
            warn!("Failed to mute user {}: {}", target.user_id, e);
            bot.send_message(chat_id, BotError::Gateway(e).user_message())
                .await?;
        }
    }

    Ok(())
}

/// Handle /unmute - restore default member permissions.
pub async fn unmute_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(target) = gate(&bot, &msg, &state, false).await? else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let permissions = ChatPermissions::SEND_MESSAGES
        | ChatPermissions::SEND_MEDIA_MESSAGES
        | ChatPermissions::SEND_OTHER_MESSAGES
        | ChatPermissions::SEND_POLLS
        | ChatPermissions::ADD_WEB_PAGE_PREVIEWS;

    match bot
        .restrict_chat_member(chat_id, target.user_id, permissions)
        .await
    {
        Ok(_) => {
            info!("User {} unmuted in chat {}", target.user_id, chat_id);
            bot.send_message(
                chat_id,
                format!(
                    "🔊 {} can speak again.",
                    mention(target.user_id.0, &target.first_name)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => {
            warn!("Failed to unmute user {}: {}", target.user_id, e);
            bot.send_message(chat_id, BotError::Gateway(e).user_message())
                .await?;
        }
    }

    Ok(())
}

/// Shared permission and target checks. Returns the target, or `None`
/// after having replied with the failure reason.
async fn gate(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    protect_admins: bool,
) -> anyhow::Result<Option<Target>> {
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id).unwrap_or(UserId(0));

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(None);
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
        return Ok(None);
    }

    let Some(target) = extract_target(bot, msg).await else {
        bot.send_message(chat_id, BotError::NotFound.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(None);
    };

    if protect_admins
        && state
            .permissions
            .is_admin(chat_id, target.user_id)
            .await
            .unwrap_or(false)
    {
        bot.send_message(chat_id, "❌ I won't restrict an admin.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(None);
    }

    Ok(Some(target))
}
