//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command handlers and event handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::database::{BannedTermRepo, Database, GroupConfigRepo, WarningRepo};
use crate::events;
use crate::moderation::{ChallengeRegistry, RateLimiter};
use crate::permissions::Permissions;
use crate::plugins;
use crate::plugins::setup::SetupSessions;

/// Bot type with Throttle adaptor for automatic API rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
///
/// All components are constructed once at startup; handlers receive this
/// by clone (every field is a cheap handle).
#[derive(Clone)]
pub struct AppState {
    /// Permission checker with admin caching.
    pub permissions: Permissions,

    /// Per-group settings.
    pub configs: Arc<GroupConfigRepo>,

    /// Append-only warning history.
    pub warnings: Arc<WarningRepo>,

    /// Banned-term lists.
    pub banned_terms: Arc<BannedTermRepo>,

    /// Active CAPTCHA challenges.
    pub challenges: ChallengeRegistry,

    /// Per-user message-rate windows.
    pub rate_limiter: RateLimiter,

    /// Active /setwelcome and /setrules sessions.
    pub setup: SetupSessions,

    /// Owner user IDs (bypass all permission checks).
    pub owner_ids: Vec<u64>,
}

impl AppState {
    pub fn new(bot: ThrottledBot, db: Arc<Database>, owner_ids: Vec<u64>) -> Self {
        // Permissions needs the inner Bot for API calls
        let permissions = Permissions::with_owners(bot.inner().clone(), owner_ids.clone());

        Self {
            permissions,
            configs: Arc::new(GroupConfigRepo::new(&db)),
            warnings: Arc::new(WarningRepo::new(&db)),
            banned_terms: Arc::new(BannedTermRepo::new(&db)),
            challenges: ChallengeRegistry::new(),
            rate_limiter: RateLimiter::new(),
            setup: SetupSessions::new(),
            owner_ids,
        }
    }

    /// Check if a user is a bot owner.
    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
///
/// Branch order matters: an active setup session must see its reply
/// before the command parser does (so /cancel and /skip stay inside the
/// session), and joins announced via service messages are handled before
/// the moderation checks run.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    let message_handler = Update::filter_message()
        .branch(plugins::setup::session_handler())
        .branch(events::onboarding::service_message_handler())
        .branch(plugins::command_handler())
        .branch(events::moderation::message_handler());

    // Joins delivered as chat_member updates
    let member_handler = Update::filter_chat_member().branch(events::onboarding::member_handler());

    let callback_handler = plugins::callback_handler();

    dptree::entry()
        .branch(message_handler)
        .branch(member_handler)
        .branch(callback_handler)
}
