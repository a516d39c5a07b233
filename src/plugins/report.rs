//! /report - let members flag someone for the admins.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::error::BotError;
use crate::utils::mention;
use crate::utils::target::{extract_reason, extract_target};

/// Handle /report <target> [reason] (public).
pub async fn report_command(
    bot: ThrottledBot,
    msg: Message,
    _state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(reporter) = msg.from.clone() else {
        return Ok(());
    };

    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }

    let Some(target) = extract_target(&bot, &msg).await else {
        bot.send_message(chat_id, BotError::NotFound.user_message())
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    let reason = extract_reason(&msg, target.args_used);

    info!(
        "Report in chat {}: user {} reported {} (reason: {})",
        chat_id,
        reporter.id,
        target.user_id,
        reason.as_deref().unwrap_or("none")
    );

    bot.send_message(
        chat_id,
        format!(
            "📣 {} has been reported to the admins. Thank you.",
            mention(target.user_id.0, &target.first_name)
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_parameters(ReplyParameters::new(msg.id))
    .await?;

    Ok(())
}
