//! Ban, unban and kick commands.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters, UserId};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::utils::mention;
use crate::utils::target::{Target, extract_target};

/// Handle /ban.
pub async fn ban_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    restriction(bot, msg, state, Mode::Ban).await
}

/// Handle /unban.
pub async fn unban_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    restriction(bot, msg, state, Mode::Unban).await
}

/// Handle /kick - a short ban so the user may rejoin.
pub async fn kick_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    restriction(bot, msg, state, Mode::Kick).await
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Ban,
    Unban,
    Kick,
}

async fn restriction(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    mode: Mode,
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

    // Admins cannot be restricted (unban has no such concern)
    if mode != Mode::Unban
        && state
            .permissions
            .is_admin(chat_id, target.user_id)
            .await
            .unwrap_or(false)
    {
        bot.send_message(chat_id, "❌ I won't restrict an admin.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    match mode {
        Mode::Ban => ban(&bot, chat_id, &target).await,
        Mode::Unban => unban(&bot, chat_id, &target).await,
        Mode::Kick => kick(&bot, chat_id, &target).await,
    }
}

async fn ban(bot: &ThrottledBot, chat_id: ChatId, target: &Target) -> anyhow::Result<()> {
    match bot.ban_chat_member(chat_id, target.user_id).await {
        Ok(_) => {
            info!("User {} banned in chat {}", target.user_id, chat_id);
            bot.send_message(
                chat_id,
                format!(
                    "🚫 {} has been banned.",
                    mention(target.user_id.0, &target.first_name)
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

    Ok(())
}

async fn unban(bot: &ThrottledBot, chat_id: ChatId, target: &Target) -> anyhow::Result<()> {
    match bot.unban_chat_member(chat_id, target.user_id).await {
        Ok(_) => {
            info!("User {} unbanned in chat {}", target.user_id, chat_id);
            bot.send_message(
                chat_id,
                format!(
                    "✅ {} has been unbanned and may rejoin.",
                    mention(target.user_id.0, &target.first_name)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => {
            warn!("Failed to unban user {}: {}", target.user_id, e);
            bot.send_message(chat_id, BotError::Gateway(e).user_message())
                .await?;
        }
    }

    Ok(())
}

/// Kick = 30-second ban; after it lapses the user is free to rejoin.
async fn kick(bot: &ThrottledBot, chat_id: ChatId, target: &Target) -> anyhow::Result<()> {
    let until = chrono::Utc::now() + chrono::Duration::seconds(30);

    match bot
        .ban_chat_member(chat_id, target.user_id)
        .until_date(until)
        .await
    {
        Ok(_) => {
            info!("User {} kicked from chat {}", target.user_id, chat_id);
            bot.send_message(
                chat_id,
                format!(
                    "👢 {} has been kicked.",
                    mention(target.user_id.0, &target.first_name)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => {
            warn!("Failed to kick user {}: {}", target.user_id, e);
            bot.send_message(chat_id, BotError::Gateway(e).user_message())
                .await?;
        }
    }

    Ok(())
}
