//! Command handlers.
//!
//! Add new commands by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the variant and branch to `command_handler()`

pub mod bans;
pub mod captcha;
pub mod info;
pub mod mute;
pub mod report;
pub mod rules;
pub mod settings;
pub mod setup;
pub mod start;
pub mod warn;
pub mod welcome;
pub mod words;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show this help")]
    Help,

    // Welcome commands
    #[command(description = "Set up the welcome message (admin)")]
    Setwelcome,

    #[command(description = "Preview the welcome message")]
    Welcome,

    #[command(description = "Dry-run the welcome for yourself (admin)")]
    Testwelcome,

    // Rules commands
    #[command(description = "Set the group rules (admin)")]
    Setrules,

    #[command(description = "Show the group rules")]
    Rules,

    // Settings commands
    #[command(description = "Show group settings (admin)")]
    Settings,

    #[command(description = "Show security overview (admin)")]
    Security,

    #[command(description = "Toggle antispam (admin)")]
    Antispam,

    #[command(description = "Toggle join CAPTCHA (admin)")]
    Captcha,

    #[command(description = "Dry-run the CAPTCHA for yourself (admin)")]
    Testcaptcha,

    // Banned terms
    #[command(description = "Ban a term: /addword <term> [delete|warn|mute]")]
    Addword,

    #[command(description = "Unban a term: /delword <term>")]
    Delword,

    #[command(description = "List banned terms (admin)")]
    Listwords,

    // Warnings
    #[command(description = "Warn a user (admin)")]
    Warn,

    #[command(description = "Show a user's warnings")]
    Warnings,

    #[command(description = "Clear a user's warnings (admin)")]
    Clearwarns,

    // Restrictions
    #[command(description = "Ban a user (admin)")]
    Ban,

    #[command(description = "Unban a user (admin)")]
    Unban,

    #[command(description = "Kick a user (admin)")]
    Kick,

    #[command(description = "Mute a user (admin)")]
    Mute,

    #[command(description = "Unmute a user (admin)")]
    Unmute,

    // Misc
    #[command(description = "Report a user to the admins")]
    Report,

    #[command(description = "Show group info")]
    Info,

    #[command(description = "Show moderation stats (admin)")]
    Stats,

    #[command(description = "Show the member count")]
    Members,

    #[command(description = "Cancel the current setup session")]
    Cancel,
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start::start_command))
        .branch(case![Command::Help].endpoint(start::help_command))
        // Welcome
        .branch(case![Command::Setwelcome].endpoint(welcome::setwelcome_command))
        .branch(case![Command::Welcome].endpoint(welcome::welcome_command))
        .branch(case![Command::Testwelcome].endpoint(welcome::testwelcome_command))
        // Rules
        .branch(case![Command::Setrules].endpoint(rules::setrules_command))
        .branch(case![Command::Rules].endpoint(rules::rules_command))
        // Settings
        .branch(case![Command::Settings].endpoint(settings::settings_command))
        .branch(case![Command::Security].endpoint(settings::security_command))
        .branch(case![Command::Antispam].endpoint(settings::antispam_command))
        .branch(case![Command::Captcha].endpoint(settings::captcha_command))
        .branch(case![Command::Testcaptcha].endpoint(captcha::testcaptcha_command))
        // Banned terms
        .branch(case![Command::Addword].endpoint(words::addword_command))
        .branch(case![Command::Delword].endpoint(words::delword_command))
        .branch(case![Command::Listwords].endpoint(words::listwords_command))
        // Warnings
        .branch(case![Command::Warn].endpoint(warn::warn_command))
        .branch(case![Command::Warnings].endpoint(warn::warnings_command))
        .branch(case![Command::Clearwarns].endpoint(warn::clearwarns_command))
        // Restrictions
        .branch(case![Command::Ban].endpoint(bans::ban_command))
        .branch(case![Command::Unban].endpoint(bans::unban_command))
        .branch(case![Command::Kick].endpoint(bans::kick_command))
        .branch(case![Command::Mute].endpoint(mute::mute_command))
        .branch(case![Command::Unmute].endpoint(mute::unmute_command))
        // Misc
        .branch(case![Command::Report].endpoint(report::report_command))
        .branch(case![Command::Info].endpoint(info::info_command))
        .branch(case![Command::Stats].endpoint(info::stats_command))
        .branch(case![Command::Members].endpoint(info::members_command))
        .branch(case![Command::Cancel].endpoint(setup::cancel_command))
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query()
        .branch(
            dptree::filter(|q: CallbackQuery| {
                q.data.as_deref().map(|d| d.starts_with("captcha:")).unwrap_or(false)
            })
            .endpoint(captcha::callback_handler),
        )
        .branch(
            dptree::filter(|q: CallbackQuery| {
                q.data.as_deref().map(|d| d.starts_with("welcome:")).unwrap_or(false)
            })
            .endpoint(welcome::callback_handler),
        )
}
