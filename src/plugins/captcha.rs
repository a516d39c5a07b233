//! CAPTCHA keypad and callback handling.
//!
//! The prompt carries a 3x3 digit grid plus 0 and a Submit key; presses
//! come back as `captcha:<user>:<digit|submit>` callback queries. Only
//! the challenged user may press the keys.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, ReplyParameters};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::moderation::SubmitOutcome;
use crate::utils::mention;

/// How long the success notice stays before self-deleting.
const SUCCESS_NOTICE_SECS: u64 = 5;

/// Build the numeric keypad for a challenge.
///
/// The Submit label mirrors the digits entered so far, so the user sees
/// their input without the message text changing.
pub fn build_keypad(user_id: u64, current_input: &str) -> InlineKeyboardMarkup {
    let digit = |d: u8| {
        InlineKeyboardButton::callback(d.to_string(), format!("captcha:{}:{}", user_id, d))
    };

    let submit_label = if current_input.is_empty() {
        "✅ Submit".to_string()
    } else {
        format!("✅ Submit ({})", current_input)
    };

    InlineKeyboardMarkup::new(vec![
        vec![digit(1), digit(2), digit(3)],
        vec![digit(4), digit(5), digit(6)],
        vec![digit(7), digit(8), digit(9)],
        vec![digit(0)],
        vec![InlineKeyboardButton::callback(
            submit_label,
            format!("captcha:{}:submit", user_id),
        )],
    ])
}

/// Handle /testcaptcha - admin dry-run of the join CAPTCHA.
pub async fn testcaptcha_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    if !state.permissions.is_admin(msg.chat.id, user.id).await.unwrap_or(false) {
        bot.send_message(msg.chat.id, BotError::Permission.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    crate::events::onboarding::send_captcha(&bot, msg.chat.id, &user, &state).await
}

/// Handle keypad presses.
pub async fn callback_handler(
    bot: ThrottledBot,
    query: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(data) = query.data.clone() else {
        return Ok(());
    };

    // captcha:<user>:<digit|submit>
    let mut parts = data.splitn(3, ':');
    let (Some(_), Some(uid), Some(key)) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(());
    };
    let Ok(target_user) = uid.parse::<u64>() else {
        return Ok(());
    };

    // Only the challenged member may press the keypad
    if query.from.id.0 != target_user {
        bot.answer_callback_query(query.id)
            .text("This challenge is not for you.")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    let Some(message) = query.message.as_ref() else {
        bot.answer_callback_query(query.id).await?;
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    if key == "submit" {
        return handle_submit(&bot, &query, &state, chat_id, message_id, target_user).await;
    }

    // Digit press
    let Some(digit) = key.chars().next().filter(|c| c.is_ascii_digit()) else {
        return Ok(());
    };

    match state.challenges.append_digit(chat_id.0, target_user, digit) {
        Some(challenge) => {
            let keyboard = build_keypad(target_user, &challenge.current_input);
            if let Err(e) = bot
                .edit_message_reply_markup(chat_id, message_id)
                .reply_markup(keyboard)
                .await
            {
                warn!("Failed to update keypad in chat {}: {}", chat_id, e);
            }
            bot.answer_callback_query(query.id).await?;
        }
        None => {
            bot.answer_callback_query(query.id)
                .text("No active challenge.")
                .show_alert(true)
                .await?;
        }
    }

    Ok(())
}

async fn handle_submit(
    bot: &ThrottledBot,
    query: &CallbackQuery,
    state: &AppState,
    chat_id: ChatId,
    message_id: teloxide::types::MessageId,
    user_id: u64,
) -> anyhow::Result<()> {
    match state.challenges.submit(chat_id.0, user_id) {
        SubmitOutcome::Verified(_) => {
            info!("User {} verified in chat {}", user_id, chat_id);

            let text = format!(
                "✅ {} verified. Welcome aboard!",
                mention(user_id, &query.from.first_name)
            );

            match bot
                .edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::Html)
                .await
            {
                Ok(_) => crate::utils::schedule_delete(
                    bot.clone(),
                    chat_id,
                    message_id,
                    Duration::from_secs(SUCCESS_NOTICE_SECS),
                ),
                Err(e) => warn!("Failed to edit captcha message in {}: {}", chat_id, e),
            }

            bot.answer_callback_query(query.id.clone())
                .text("Verified!")
                .await?;
        }
        SubmitOutcome::WrongAnswer => {
            bot.answer_callback_query(query.id.clone())
                .text("❌ Wrong answer. Keep going or ask an admin for help.")
                .show_alert(true)
                .await?;
        }
        SubmitOutcome::Expired(_) => {
            bot.answer_callback_query(query.id.clone())
                .text("⏰ Challenge expired. Ask an admin to let you retry.")
                .show_alert(true)
                .await?;
        }
        SubmitOutcome::NotFound => {
            bot.answer_callback_query(query.id.clone())
                .text("No active challenge.")
                .show_alert(true)
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_layout() {
        let kb = build_keypad(42, "");
        assert_eq!(kb.inline_keyboard.len(), 5);
        assert_eq!(kb.inline_keyboard[0].len(), 3);
        assert_eq!(kb.inline_keyboard[3].len(), 1);
        assert_eq!(kb.inline_keyboard[4].len(), 1);
    }

    #[test]
    fn test_submit_label_shows_input() {
        let kb = build_keypad(42, "17");
        let submit = &kb.inline_keyboard[4][0];
        assert_eq!(submit.text, "✅ Submit (17)");
    }

    #[test]
    fn test_submit_label_plain_when_empty() {
        let kb = build_keypad(42, "");
        assert_eq!(kb.inline_keyboard[4][0].text, "✅ Submit");
    }
}
