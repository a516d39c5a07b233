//! Banned term model.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Action applied when a banned term matches a message.
///
/// The offending message is always deleted first; Warn and Mute act on
/// top of the deletion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TermAction {
    #[default]
    Delete,
    Warn,
    Mute,
}

impl TermAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "delete" => Some(Self::Delete),
            "warn" => Some(Self::Warn),
            "mute" => Some(Self::Mute),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Warn => "warn",
            Self::Mute => "mute",
        }
    }
}

/// A banned term configured for a group, stored in `banned_terms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedTerm {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID
    pub chat_id: i64,

    /// The term, stored lowercase
    pub term: String,

    #[serde(default)]
    pub action: TermAction,

    /// Admin who added the term
    pub created_by: u64,

    /// Unix timestamp; scan order is creation order
    pub created_at: i64,
}

impl BannedTerm {
    pub fn new(chat_id: i64, term: &str, action: TermAction, created_by: u64) -> Self {
        Self {
            id: None,
            chat_id,
            term: term.to_lowercase(),
            action,
            created_by,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Case-insensitive substring match against message text or caption.
    ///
    /// Expects `text` to be lowercased already; the hot path lowercases
    /// once per message, not once per term.
    pub fn matches(&self, lowercased_text: &str) -> bool {
        lowercased_text.contains(&self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_is_stored_lowercase() {
        let term = BannedTerm::new(-1, "SpAm", TermAction::Delete, 1);
        assert_eq!(term.term, "spam");
    }

    #[test]
    fn test_substring_match() {
        let term = BannedTerm::new(-1, "spam", TermAction::Warn, 1);
        assert!(term.matches("this is spammy"));
        assert!(term.matches("spam"));
        assert!(!term.matches("ham"));
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!(TermAction::from_str("WARN"), Some(TermAction::Warn));
        assert_eq!(TermAction::from_str("delete"), Some(TermAction::Delete));
        assert_eq!(TermAction::from_str("mute"), Some(TermAction::Mute));
        assert_eq!(TermAction::from_str("ban"), None);
    }
}
