//! Warning escalation rule.
//!
//! Evaluated per (chat, user) pair only; there is no cross-group
//! accumulation. When an auto-ban fires, the caller clears the pair's
//! warnings so a later unban starts from a clean slate.

/// Verdict after recording a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarnVerdict {
    /// Total warnings after this one.
    pub count: u64,
    /// The group's configured limit.
    pub max_warnings: u32,
    /// Whether the limit was reached and a ban must follow.
    pub auto_ban: bool,
}

/// Compare the fresh warning count against the group limit.
pub fn evaluate_warning(count: u64, max_warnings: u32) -> WarnVerdict {
    WarnVerdict {
        count,
        max_warnings,
        auto_ban: count >= max_warnings as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_limit_never_bans() {
        for count in 1..3 {
            assert!(!evaluate_warning(count, 3).auto_ban);
        }
    }

    #[test]
    fn test_limit_reached_bans() {
        let verdict = evaluate_warning(3, 3);
        assert!(verdict.auto_ban);
        assert_eq!(verdict.count, 3);
        assert_eq!(verdict.max_warnings, 3);
    }

    #[test]
    fn test_over_limit_still_bans() {
        // Can happen when the limit was lowered after warnings accrued.
        assert!(evaluate_warning(5, 3).auto_ban);
    }

    #[test]
    fn test_limit_of_one() {
        assert!(evaluate_warning(1, 1).auto_ban);
    }
}
