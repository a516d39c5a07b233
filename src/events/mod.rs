//! Non-command update handlers.

pub mod moderation;
pub mod onboarding;
