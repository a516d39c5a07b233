//! Arithmetic CAPTCHA challenges for new members.
//!
//! A challenge is cheap to generate and easy for humans; it gates only
//! trivial join-bots. Answers accumulate digit by digit from the inline
//! keypad, so string equality against the expected answer is exact.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use teloxide::types::MessageId;
use tracing::debug;

/// How long a member has to solve the challenge.
const CHALLENGE_TTL_MINUTES: i64 = 5;

/// An active verification challenge for one (chat, user) pair.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub chat_id: i64,
    pub user_id: u64,
    /// Rendered question, e.g. "3 * 7".
    pub question: String,
    pub expected_answer: String,
    /// Digits entered so far.
    pub current_input: String,
    pub expires_at: DateTime<Utc>,
    /// The keypad prompt message, for later edit/delete.
    pub message_id: Option<MessageId>,
}

/// Result of a submit press.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Input matched; the challenge has been removed.
    Verified(Challenge),
    /// Input did not match; the challenge survives with input unchanged.
    WrongAnswer,
    /// Deadline passed; the challenge has been removed.
    Expired(Challenge),
    /// No active challenge for this (chat, user) pair.
    NotFound,
}

/// In-memory tracker of active challenges, keyed by (chat, user).
///
/// At most one challenge per key: starting a new one replaces any
/// existing entry. Expiry is checked lazily at submit time; an
/// abandoned challenge lingers until the next interaction or a process
/// restart (bounded by how rarely members join).
#[derive(Clone, Default)]
pub struct ChallengeRegistry {
    active: Arc<DashMap<(i64, u64), Challenge>>,
}

impl ChallengeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and store a fresh challenge, replacing any existing one.
    pub fn start(&self, chat_id: i64, user_id: u64) -> Challenge {
        let mut rng = rand::thread_rng();
        let a: i64 = rng.gen_range(1..=10);
        let b: i64 = rng.gen_range(1..=10);

        let (op, answer) = match rng.gen_range(0..3) {
            0 => ('+', a + b),
            1 => ('-', a - b),
            _ => ('*', a * b),
        };

        let challenge = Challenge {
            chat_id,
            user_id,
            question: format!("{} {} {}", a, op, b),
            expected_answer: answer.to_string(),
            current_input: String::new(),
            expires_at: Utc::now() + Duration::minutes(CHALLENGE_TTL_MINUTES),
            message_id: None,
        };

        debug!(
            "Challenge started for user {} in chat {}: {} = {}",
            user_id, chat_id, challenge.question, answer
        );

        self.active.insert((chat_id, user_id), challenge.clone());
        challenge
    }

    /// Attach the sent prompt message to an active challenge.
    pub fn set_message_id(&self, chat_id: i64, user_id: u64, message_id: MessageId) {
        if let Some(mut challenge) = self.active.get_mut(&(chat_id, user_id)) {
            challenge.message_id = Some(message_id);
        }
    }

    /// Append one digit to the accumulated input.
    ///
    /// Returns the updated snapshot, or `None` if no challenge is
    /// active. Expiry is deliberately not checked here; only submit
    /// decides the challenge's fate.
    pub fn append_digit(&self, chat_id: i64, user_id: u64, digit: char) -> Option<Challenge> {
        let mut entry = self.active.get_mut(&(chat_id, user_id))?;
        entry.current_input.push(digit);
        Some(entry.clone())
    }

    /// Check the accumulated input against the expected answer.
    pub fn submit(&self, chat_id: i64, user_id: u64) -> SubmitOutcome {
        self.submit_at(chat_id, user_id, Utc::now())
    }

    fn submit_at(&self, chat_id: i64, user_id: u64, now: DateTime<Utc>) -> SubmitOutcome {
        let key = (chat_id, user_id);

        let Some(entry) = self.active.get(&key) else {
            return SubmitOutcome::NotFound;
        };
        let challenge = entry.clone();
        drop(entry);

        if now > challenge.expires_at {
            self.remove_matching(key, &challenge);
            return SubmitOutcome::Expired(challenge);
        }

        if challenge.current_input == challenge.expected_answer {
            self.remove_matching(key, &challenge);
            SubmitOutcome::Verified(challenge)
        } else {
            SubmitOutcome::WrongAnswer
        }
    }

    /// Remove the entry only if it is still the snapshotted challenge; a
    /// restart that raced in between keeps its fresh entry.
    fn remove_matching(&self, key: (i64, u64), snapshot: &Challenge) {
        self.active.remove_if(&key, |_, c| {
            c.expires_at == snapshot.expires_at && c.expected_answer == snapshot.expected_answer
        });
    }

    /// Snapshot of the active challenge, if any.
    pub fn get(&self, chat_id: i64, user_id: u64) -> Option<Challenge> {
        self.active.get(&(chat_id, user_id)).map(|c| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter(registry: &ChallengeRegistry, chat: i64, user: u64, answer: &str) {
        for d in answer.chars() {
            registry.append_digit(chat, user, d);
        }
    }

    #[test]
    fn test_start_generates_consistent_answer() {
        let registry = ChallengeRegistry::new();
        for _ in 0..50 {
            let c = registry.start(-1, 7);
            let parts: Vec<&str> = c.question.split_whitespace().collect();
            let a: i64 = parts[0].parse().unwrap();
            let b: i64 = parts[2].parse().unwrap();
            let expected = match parts[1] {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                other => panic!("unexpected operator {}", other),
            };
            assert_eq!(c.expected_answer, expected.to_string());
            assert!((1..=10).contains(&a));
            assert!((1..=10).contains(&b));
        }
    }

    #[test]
    fn test_correct_submit_verifies_exactly_once() {
        let registry = ChallengeRegistry::new();
        let c = registry.start(-1, 7);

        enter(&registry, -1, 7, &c.expected_answer);
        assert!(matches!(registry.submit(-1, 7), SubmitOutcome::Verified(_)));

        // The challenge is gone; a second submit finds nothing.
        assert!(matches!(registry.submit(-1, 7), SubmitOutcome::NotFound));
    }

    #[test]
    fn test_wrong_answer_retains_challenge_and_input() {
        let registry = ChallengeRegistry::new();
        registry.start(-1, 7);

        registry.append_digit(-1, 7, '9');
        registry.append_digit(-1, 7, '9');
        registry.append_digit(-1, 7, '9');

        assert!(matches!(registry.submit(-1, 7), SubmitOutcome::WrongAnswer));

        let c = registry.get(-1, 7).expect("challenge must survive");
        assert_eq!(c.current_input, "999");
    }

    #[test]
    fn test_expired_submit_removes_challenge() {
        let registry = ChallengeRegistry::new();
        let c = registry.start(-1, 7);
        enter(&registry, -1, 7, &c.expected_answer);

        let late = c.expires_at + Duration::seconds(1);
        assert!(matches!(
            registry.submit_at(-1, 7, late),
            SubmitOutcome::Expired(_)
        ));

        // Removed even though the input was correct.
        assert!(matches!(registry.submit(-1, 7), SubmitOutcome::NotFound));
    }

    #[test]
    fn test_digit_entry_ignores_expiry() {
        // Matches observed behavior: only submit checks the deadline.
        let registry = ChallengeRegistry::new();
        registry.start(-1, 7);

        assert!(registry.append_digit(-1, 7, '1').is_some());
    }

    #[test]
    fn test_restart_replaces_existing_challenge() {
        let registry = ChallengeRegistry::new();
        registry.start(-1, 7);
        registry.append_digit(-1, 7, '5');

        let fresh = registry.start(-1, 7);
        assert!(fresh.current_input.is_empty());

        let stored = registry.get(-1, 7).unwrap();
        assert_eq!(stored.current_input, "");
        assert_eq!(stored.expected_answer, fresh.expected_answer);
    }

    #[test]
    fn test_removal_spares_a_replacement() {
        let registry = ChallengeRegistry::new();
        let fresh = registry.start(-1, 7);

        // Snapshot of an older challenge for the same pair.
        let mut stale = fresh.clone();
        stale.expires_at = stale.expires_at - Duration::minutes(1);

        registry.remove_matching((-1, 7), &stale);
        assert!(registry.get(-1, 7).is_some());

        registry.remove_matching((-1, 7), &fresh);
        assert!(registry.get(-1, 7).is_none());
    }

    #[test]
    fn test_challenges_are_keyed_per_chat_and_user() {
        let registry = ChallengeRegistry::new();
        registry.start(-1, 7);
        registry.start(-2, 7);

        registry.append_digit(-1, 7, '4');
        assert_eq!(registry.get(-2, 7).unwrap().current_input, "");
    }
}
