//! Welcome message commands and rendering.

use teloxide::prelude::*;
use teloxide::types::{
    Chat, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode, ReplyParameters, User,
};
use tracing::warn;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::{GroupConfig, InlineButton, MediaKind};
use crate::error::BotError;
use crate::utils::{format_username, html_escape, mention};

/// Fallback greeting when no template is configured.
const DEFAULT_TEMPLATE: &str =
    "👋 Welcome, {mention}!\n\nYou've joined <b>{group}</b>. Please take a moment to read the rules.";

/// Render the welcome template for a user.
///
/// Supported placeholders: {name} {username} {group} {mention} {id}.
/// {username} falls back to the first name when the user has none.
pub fn format_welcome_text(template: Option<&str>, user: &User, chat_title: &str) -> String {
    let template = template.unwrap_or(DEFAULT_TEMPLATE);
    let username = format_username(user.username.as_deref(), &user.first_name);

    template
        .replace("{name}", &html_escape(&user.first_name))
        .replace("{username}", &html_escape(&username))
        .replace("{group}", &html_escape(chat_title))
        .replace("{mention}", &mention(user.id.0, &user.first_name))
        .replace("{id}", &user.id.to_string())
}

/// Build the welcome keyboard: configured URL buttons, or the default
/// Rules/Help pair when none are configured.
pub fn build_welcome_keyboard(buttons: &[Vec<InlineButton>]) -> InlineKeyboardMarkup {
    if buttons.is_empty() {
        return InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("📜 Rules", "welcome:rules"),
            InlineKeyboardButton::callback("❓ Help", "welcome:help"),
        ]]);
    }

    let rows = buttons
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|b| {
                    // URLs were validated when the buttons were saved
                    url::Url::parse(&b.url)
                        .ok()
                        .map(|u| InlineKeyboardButton::url(b.text.clone(), u))
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

/// Send the configured welcome for `user` into `chat`.
pub async fn send_welcome(
    bot: &ThrottledBot,
    chat: &Chat,
    user: &User,
    config: &GroupConfig,
) -> anyhow::Result<()> {
    let chat_title = chat.title().unwrap_or("the group");
    let text = format_welcome_text(config.welcome_template.as_deref(), user, chat_title);
    let keyboard = build_welcome_keyboard(&config.welcome_buttons);

    if let Some(media) = &config.welcome_media {
        let file = InputFile::file_id(media.file_id.clone());
        match media.kind {
            MediaKind::Photo => {
                bot.send_photo(chat.id, file)
                    .caption(text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?;
            }
            MediaKind::Video => {
                bot.send_video(chat.id, file)
                    .caption(text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?;
            }
            MediaKind::Animation => {
                bot.send_animation(chat.id, file)
                    .caption(text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?;
            }
        }
    } else {
        bot.send_message(chat.id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
    }

    Ok(())
}

/// Handle /setwelcome - start the interactive setup session.
pub async fn setwelcome_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from.clone() else {
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

    state.setup.begin_welcome(chat_id.0, user.id.0);

    bot.send_message(
        chat_id,
        "📝 Send the new welcome text.\n\n\
         Placeholders: <code>{name}</code> <code>{username}</code> \
         <code>{group}</code> <code>{mention}</code> <code>{id}</code>\n\n\
         /cancel to abort.",
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Handle /welcome - preview the welcome message, rendered for the caller.
pub async fn welcome_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    preview(&bot, &msg, &state).await
}

/// Handle /testwelcome - admin dry-run of the welcome message.
pub async fn testwelcome_command(
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

    preview(&bot, &msg, &state).await
}

async fn preview(bot: &ThrottledBot, msg: &Message, state: &AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    let config = match state.configs.get_or_default(msg.chat.id.0).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Config lookup failed for chat {}: {}", msg.chat.id, e);
            bot.send_message(msg.chat.id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    send_welcome(bot, &msg.chat, &user, &config).await
}

/// Handle the default welcome buttons (welcome:rules / welcome:help).
pub async fn callback_handler(
    bot: ThrottledBot,
    query: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };

    let answer = match data {
        "welcome:rules" => {
            let rules = match query.message.as_ref() {
                Some(message) => state
                    .configs
                    .get_or_default(message.chat().id.0)
                    .await
                    .ok()
                    .and_then(|c| c.rules_text),
                None => None,
            };

            rules.unwrap_or_else(|| "No rules set yet. Be respectful and stay on topic.".to_string())
        }
        "welcome:help" => "Use /help to see everything I can do.".to_string(),
        _ => return Ok(()),
    };

    // Alert text is capped by Telegram; cut on a char boundary.
    let answer: String = answer.chars().take(190).collect();

    bot.answer_callback_query(query.id)
        .text(answer)
        .show_alert(true)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    fn user(id: u64, first_name: &str, username: Option<&str>) -> User {
        User {
            id: UserId(id),
            is_bot: false,
            first_name: first_name.to_string(),
            last_name: None,
            username: username.map(String::from),
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[test]
    fn test_all_placeholders_substituted() {
        let u = user(42, "Alice", Some("alice"));
        let text = format_welcome_text(
            Some("{name} {username} {group} {id}"),
            &u,
            "Rustaceans",
        );
        assert_eq!(text, "Alice @alice Rustaceans 42");
    }

    #[test]
    fn test_username_falls_back_to_first_name() {
        let u = user(42, "Alice", None);
        let text = format_welcome_text(Some("hi {username}"), &u, "g");
        assert_eq!(text, "hi Alice");
    }

    #[test]
    fn test_substitution_escapes_html() {
        let u = user(42, "<Ali&ce>", None);
        let text = format_welcome_text(Some("{name}"), &u, "g");
        assert_eq!(text, "&lt;Ali&amp;ce&gt;");
    }

    #[test]
    fn test_mention_is_a_link() {
        let u = user(42, "Alice", None);
        let text = format_welcome_text(Some("{mention}"), &u, "g");
        assert_eq!(text, "<a href=\"tg://user?id=42\">Alice</a>");
    }

    #[test]
    fn test_default_template_used_when_none() {
        let u = user(42, "Alice", None);
        let text = format_welcome_text(None, &u, "Rustaceans");
        assert!(text.contains("Rustaceans"));
        assert!(text.contains("tg://user?id=42"));
    }

    #[test]
    fn test_default_keyboard_when_no_buttons() {
        let kb = build_welcome_keyboard(&[]);
        assert_eq!(kb.inline_keyboard.len(), 1);
        assert_eq!(kb.inline_keyboard[0].len(), 2);
    }

    #[test]
    fn test_configured_buttons_keep_layout() {
        let buttons = vec![
            vec![InlineButton::new("Rules", "https://example.com/rules")],
            vec![
                InlineButton::new("Chat", "https://t.me/group"),
                InlineButton::new("Site", "https://example.com"),
            ],
        ];
        let kb = build_welcome_keyboard(&buttons);
        assert_eq!(kb.inline_keyboard.len(), 2);
        assert_eq!(kb.inline_keyboard[1].len(), 2);
    }
}
