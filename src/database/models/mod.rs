//! Database models.

mod banned_term;
mod common;
mod group_config;
mod warning;

pub use banned_term::{BannedTerm, TermAction};
pub use common::{InlineButton, MediaKind, WelcomeMedia};
pub use group_config::GroupConfig;
pub use warning::Warning;
