//! In-memory moderation state machines.
//!
//! These components hold process-local state with no durability across
//! restarts: active CAPTCHA challenges, message-rate windows and the
//! warning-escalation rule. They are constructed once at startup and
//! shared through [`crate::bot::dispatcher::AppState`]; all maps are
//! safe for concurrent handler access.

mod challenge;
mod escalation;
mod policy;
mod rate_limit;

pub use challenge::{Challenge, ChallengeRegistry, SubmitOutcome};
pub use escalation::{WarnVerdict, evaluate_warning};
pub use policy::{PolicyAction, first_match};
pub use rate_limit::{RateCheck, RateLimiter};
