//! Multi-step setup sessions for /setwelcome and /setrules.
//!
//! A session is keyed by (chat, admin) and intercepts that admin's next
//! messages before the command parser, so /skip and /cancel act on the
//! session instead of falling through as unknown commands.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::{InlineButton, MediaKind, WelcomeMedia};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    WelcomeText,
    WelcomeMedia,
    WelcomeButtons,
    RulesText,
}

/// Partial state collected so far.
#[derive(Debug, Clone)]
pub struct SetupDraft {
    pub step: SetupStep,
    pub welcome_text: Option<String>,
    pub welcome_media: Option<WelcomeMedia>,
}

/// Active setup sessions, at most one per (chat, admin) pair.
#[derive(Clone, Default)]
pub struct SetupSessions {
    active: Arc<DashMap<(i64, u64), SetupDraft>>,
}

impl SetupSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a /setwelcome session, replacing any existing one.
    pub fn begin_welcome(&self, chat_id: i64, user_id: u64) {
        self.active.insert(
            (chat_id, user_id),
            SetupDraft {
                step: SetupStep::WelcomeText,
                welcome_text: None,
                welcome_media: None,
            },
        );
    }

    /// Begin a /setrules session, replacing any existing one.
    pub fn begin_rules(&self, chat_id: i64, user_id: u64) {
        self.active.insert(
            (chat_id, user_id),
            SetupDraft {
                step: SetupStep::RulesText,
                welcome_text: None,
                welcome_media: None,
            },
        );
    }

    pub fn get(&self, chat_id: i64, user_id: u64) -> Option<SetupDraft> {
        self.active.get(&(chat_id, user_id)).map(|d| d.clone())
    }

    pub fn update(&self, chat_id: i64, user_id: u64, draft: SetupDraft) {
        self.active.insert((chat_id, user_id), draft);
    }

    /// End the session. Returns whether one was active.
    pub fn end(&self, chat_id: i64, user_id: u64) -> bool {
        self.active.remove(&(chat_id, user_id)).is_some()
    }
}

/// Handler for messages belonging to an active session.
pub fn session_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message, state: AppState| {
        msg.from
            .as_ref()
            .map(|u| state.setup.get(msg.chat.id.0, u.id.0).is_some())
            .unwrap_or(false)
    })
    .endpoint(session_step)
}

/// Handle /cancel outside a session (inside one, the session handler
/// consumes it first).
pub async fn cancel_command(
    bot: ThrottledBot,
    msg: Message,
) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, "Nothing to cancel.")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

async fn session_step(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    let Some(mut draft) = state.setup.get(chat_id.0, user.id.0) else {
        return Ok(());
    };

    let text = msg.text().map(str::trim).unwrap_or("");

    if text.eq_ignore_ascii_case("/cancel") {
        state.setup.end(chat_id.0, user.id.0);
        bot.send_message(chat_id, "❌ Setup cancelled.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    match draft.step {
        SetupStep::WelcomeText => {
            if text.is_empty() {
                bot.send_message(chat_id, "Please send the welcome text as a message.")
                    .reply_parameters(ReplyParameters::new(msg.id))
                    .await?;
                return Ok(());
            }

            draft.welcome_text = Some(text.to_string());
            draft.step = SetupStep::WelcomeMedia;
            state.setup.update(chat_id.0, user.id.0, draft);

            bot.send_message(
                chat_id,
                "✅ Text saved.\n\nNow send a photo, video or GIF to attach, or /skip.",
            )
            .await?;
        }

        SetupStep::WelcomeMedia => {
            if text.eq_ignore_ascii_case("/skip") {
                draft.step = SetupStep::WelcomeButtons;
                state.setup.update(chat_id.0, user.id.0, draft);
                send_buttons_prompt(&bot, chat_id).await?;
                return Ok(());
            }

            let Some(media) = extract_media(&msg) else {
                bot.send_message(
                    chat_id,
                    "Send a photo, video or GIF, or /skip to continue without media.",
                )
                .await?;
                return Ok(());
            };

            draft.welcome_media = Some(media);
            draft.step = SetupStep::WelcomeButtons;
            state.setup.update(chat_id.0, user.id.0, draft);
            send_buttons_prompt(&bot, chat_id).await?;
        }

        SetupStep::WelcomeButtons => {
            let buttons = if text.eq_ignore_ascii_case("/skip") {
                Vec::new()
            } else {
                match parse_buttons(text) {
                    Ok(b) => b,
                    Err(e) => {
                        bot.send_message(chat_id, format!("❌ {}\n\nTry again or /skip.", e))
                            .await?;
                        return Ok(());
                    }
                }
            };

            state.setup.end(chat_id.0, user.id.0);
            finish_welcome(&bot, chat_id, &state, draft, buttons).await?;
        }

        SetupStep::RulesText => {
            if text.is_empty() {
                bot.send_message(chat_id, "Please send the rules as a text message.")
                    .await?;
                return Ok(());
            }

            state.setup.end(chat_id.0, user.id.0);

            let mut config = match state.configs.get_or_default(chat_id.0).await {
                Ok(c) => c,
                Err(e) => {
                    warn!("Config load failed for chat {}: {}", chat_id, e);
                    bot.send_message(chat_id, e.user_message())
                        .await?;
                    return Ok(());
                }
            };
            config.rules_text = Some(text.to_string());

            if let Err(e) = state.configs.save(&config).await {
                warn!("Config save failed for chat {}: {}", chat_id, e);
                bot.send_message(chat_id, e.user_message())
                    .await?;
                return Ok(());
            }

            info!("Rules updated for chat {}", chat_id);
            bot.send_message(chat_id, "✅ Group rules saved. Members can read them with /rules.")
                .await?;
        }
    }

    Ok(())
}

async fn send_buttons_prompt(bot: &ThrottledBot, chat_id: ChatId) -> anyhow::Result<()> {
    bot.send_message(
        chat_id,
        "Now send the buttons, one row per line:\n\n\
         <code>Rules - https://example.com/rules</code>\n\
         <code>Chat - https://t.me/group | Site - https://example.com</code>\n\n\
         Or /skip for the default buttons.",
    )
    .parse_mode(teloxide::types::ParseMode::Html)
    .await?;
    Ok(())
}

async fn finish_welcome(
    bot: &ThrottledBot,
    chat_id: ChatId,
    state: &AppState,
    draft: SetupDraft,
    buttons: Vec<Vec<InlineButton>>,
) -> anyhow::Result<()> {
    let mut config = match state.configs.get_or_default(chat_id.0).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Config load failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message())
                .await?;
            return Ok(());
        }
    };

    config.welcome_template = draft.welcome_text;
    config.welcome_media = draft.welcome_media;
    config.welcome_buttons = buttons;
    config.welcome_enabled = true;

    if let Err(e) = state.configs.save(&config).await {
        warn!("Config save failed for chat {}: {}", chat_id, e);
        bot.send_message(chat_id, e.user_message())
            .await?;
        return Ok(());
    }

    info!("Welcome message updated for chat {}", chat_id);
    bot.send_message(
        chat_id,
        "✅ Welcome message saved. Preview it with /welcome.",
    )
    .await?;

    Ok(())
}

/// Media attached to a setup message, largest photo size preferred.
fn extract_media(msg: &Message) -> Option<WelcomeMedia> {
    if let Some(photos) = msg.photo()
        && let Some(best) = photos.last()
    {
        return Some(WelcomeMedia {
            kind: MediaKind::Photo,
            file_id: best.file.id.clone(),
        });
    }

    if let Some(animation) = msg.animation() {
        return Some(WelcomeMedia {
            kind: MediaKind::Animation,
            file_id: animation.file.id.clone(),
        });
    }

    if let Some(video) = msg.video() {
        return Some(WelcomeMedia {
            kind: MediaKind::Video,
            file_id: video.file.id.clone(),
        });
    }

    None
}

/// Parse a button definition: one row per line, buttons within a row
/// separated by ` | `, each button `Text - url`.
pub fn parse_buttons(text: &str) -> Result<Vec<Vec<InlineButton>>, String> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut row = Vec::new();
        for part in line.split(" | ") {
            let Some((label, url)) = part.split_once(" - ") else {
                return Err(format!(
                    "Invalid button \"{}\": expected \"Text - url\".",
                    part.trim()
                ));
            };

            let label = label.trim();
            let url = url.trim();

            if label.is_empty() {
                return Err("Button text cannot be empty.".to_string());
            }
            if url::Url::parse(url).is_err() {
                return Err(format!("Invalid URL \"{}\".", url));
            }

            row.push(InlineButton::new(label, url));
        }

        rows.push(row);
    }

    if rows.is_empty() {
        return Err("No buttons found.".to_string());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_button() {
        let rows = parse_buttons("Rules - https://example.com/rules").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0][0].text, "Rules");
        assert_eq!(rows[0][0].url, "https://example.com/rules");
    }

    #[test]
    fn test_parse_rows_and_columns() {
        let rows = parse_buttons(
            "Rules - https://example.com/rules\n\
             Chat - https://t.me/group | Site - https://example.com",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[1][1].text, "Site");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let rows = parse_buttons("\nRules - https://example.com\n\n").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(parse_buttons("just text").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_url() {
        assert!(parse_buttons("Rules - not a url").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(parse_buttons("").is_err());
    }

    #[test]
    fn test_sessions_replace_and_end() {
        let sessions = SetupSessions::new();
        sessions.begin_welcome(-1, 7);
        assert_eq!(sessions.get(-1, 7).unwrap().step, SetupStep::WelcomeText);

        sessions.begin_rules(-1, 7);
        assert_eq!(sessions.get(-1, 7).unwrap().step, SetupStep::RulesText);

        assert!(sessions.end(-1, 7));
        assert!(!sessions.end(-1, 7));
        assert!(sessions.get(-1, 7).is_none());
    }
}
