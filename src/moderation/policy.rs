//! Banned-term content policy.
//!
//! The scan is first-match-wins over the group's term list in insertion
//! order; only one term's action applies per message even when several
//! terms match.

use crate::database::models::BannedTerm;

/// The action the message handler ended up taking, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    /// No banned term matched.
    None,
    /// Message deleted, nothing further.
    Deleted,
    /// Message deleted and a warning recorded.
    Warned,
    /// Message deleted and the sender muted for one hour.
    Muted,
}

/// Find the first banned term contained in `text`.
///
/// Matching is case-insensitive substring against message text or
/// caption; `terms` must already be in the group's configured order.
pub fn first_match<'a>(terms: &'a [BannedTerm], text: &str) -> Option<&'a BannedTerm> {
    let lowered = text.to_lowercase();
    terms.iter().find(|t| t.matches(&lowered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TermAction;

    fn term(word: &str, action: TermAction) -> BannedTerm {
        BannedTerm::new(-1, word, action, 1)
    }

    #[test]
    fn test_no_match() {
        let terms = vec![term("spam", TermAction::Delete)];
        assert!(first_match(&terms, "a perfectly fine message").is_none());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let terms = vec![term("spam", TermAction::Delete)];
        let hit = first_match(&terms, "Buy SPAMMY pills").unwrap();
        assert_eq!(hit.term, "spam");
    }

    #[test]
    fn test_first_configured_term_wins() {
        // "scam" is the more severe term but "spam" was configured first
        // and appears in the message, so its action applies.
        let terms = vec![term("spam", TermAction::Delete), term("scam", TermAction::Mute)];

        let hit = first_match(&terms, "this scam is also spam").unwrap();
        assert_eq!(hit.term, "spam");
        assert_eq!(hit.action, TermAction::Delete);
    }

    #[test]
    fn test_caption_text_is_plain_text_here() {
        // Callers pass text or caption through the same path.
        let terms = vec![term("crypto", TermAction::Warn)];
        let hit = first_match(&terms, "Free CRYPTO giveaway!").unwrap();
        assert_eq!(hit.action, TermAction::Warn);
    }
}
