//! /start and /help.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::ThrottledBot;
use crate::plugins::Command;

/// Handle /start.
pub async fn start_command(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(
        msg.chat.id,
        "👋 Hi! I'm a group moderation bot.\n\n\
         I greet new members, can gate posting behind a small arithmetic \
         CAPTCHA, filter banned terms, slow down flooders and track \
         warnings that escalate to a ban.\n\n\
         Add me to a group as admin and use /help to see all commands.",
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Handle /help.
pub async fn help_command(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}
