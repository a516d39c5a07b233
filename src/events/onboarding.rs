//! New member onboarding.
//!
//! Joins arrive two ways depending on group settings: as a service
//! message with `new_chat_members`, or as a `chat_member` update. Both
//! paths funnel into [`welcome_member`], which sends the welcome first
//! and then, when enabled, the CAPTCHA keypad.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{Chat, ChatMemberUpdated, ParseMode, User};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::plugins::captcha::build_keypad;
use crate::plugins::welcome::send_welcome;
use crate::utils::html_escape;

/// Handler for joins delivered as service messages.
pub fn service_message_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| {
        msg.new_chat_members().map(|m| !m.is_empty()).unwrap_or(false)
    })
    .endpoint(service_message_join)
}

/// Handler for joins delivered as chat_member updates.
pub fn member_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(is_join).endpoint(chat_member_join)
}

fn is_join(update: ChatMemberUpdated) -> bool {
    let was_in = update.old_chat_member.is_present();
    let is_in = update.new_chat_member.is_present();
    !was_in && is_in && !update.new_chat_member.user.is_bot
}

async fn service_message_join(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(members) = msg.new_chat_members() else {
        return Ok(());
    };

    for user in members {
        if user.is_bot {
            continue;
        }
        welcome_member(&bot, &msg.chat, user, &state).await?;
    }

    Ok(())
}

async fn chat_member_join(
    bot: ThrottledBot,
    update: ChatMemberUpdated,
    state: AppState,
) -> anyhow::Result<()> {
    welcome_member(&bot, &update.chat, &update.new_chat_member.user, &state).await
}

/// Greet one new member: welcome message first, then the CAPTCHA when
/// the group has it enabled.
async fn welcome_member(
    bot: &ThrottledBot,
    chat: &Chat,
    user: &User,
    state: &AppState,
) -> anyhow::Result<()> {
    debug!("New member {} joined chat {}", user.id, chat.id);

    let config = match state.configs.get_or_default(chat.id.0).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Config lookup failed for chat {}: {}", chat.id, e);
            return Ok(());
        }
    };

    if config.welcome_enabled {
        match send_welcome(bot, chat, user, &config).await {
            Ok(()) => info!("Sent welcome to {} in chat {}", user.first_name, chat.id),
            Err(e) => warn!("Failed to send welcome in chat {}: {}", chat.id, e),
        }
    }

    if config.captcha_enabled {
        send_captcha(bot, chat.id, user, state).await?;
    }

    Ok(())
}

/// Start a challenge for the user and post the keypad prompt.
pub async fn send_captcha(
    bot: &ThrottledBot,
    chat_id: ChatId,
    user: &User,
    state: &AppState,
) -> anyhow::Result<()> {
    let challenge = state.challenges.start(chat_id.0, user.id.0);

    let text = format!(
        "🔐 <a href=\"tg://user?id={}\">{}</a>, please verify you are human.\n\n\
         Solve: <b>{} = ?</b>\n\n\
         Use the keypad below and press Submit.",
        user.id,
        html_escape(&user.first_name),
        challenge.question
    );

    let keyboard = build_keypad(user.id.0, &challenge.current_input);

    let sent = bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;

    state
        .challenges
        .set_message_id(chat_id.0, user.id.0, sent.id);

    info!("Captcha started for user {} in chat {}", user.id, chat_id);

    Ok(())
}
