//! Core type definitions for Focusgate
//!
//! These types are shared by the evaluator, the storage codec and the
//! browser/CLI front ends.

use crate::time::{DailyWindow, TimeParseError};

// =============================================================================
// Block Rule
// =============================================================================

/// One blocking restriction: URL patterns plus a daily window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRule {
    /// Opaque id, unique within a rule set
    pub id: String,
    /// Matched against the hostname or the full URL (any pattern matches)
    pub patterns: Vec<String>,
    /// Window start as stored, `HH:MM`
    pub start_time: String,
    /// Window end as stored, `HH:MM`
    pub end_time: String,
    /// Inactive rules are never evaluated
    pub is_active: bool,
    /// Number of navigations this rule has blocked
    pub time_spent: u64,
}

impl BlockRule {
    /// Create an active rule with a zeroed usage counter.
    pub fn new(
        id: impl Into<String>,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            is_active: true,
            time_spent: 0,
        }
    }

    /// Builder-style toggle, mostly for tests and fixtures.
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Parse the stored window.
    pub fn window(&self) -> Result<DailyWindow, TimeParseError> {
        DailyWindow::parse(&self.start_time, &self.end_time)
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Outcome of evaluating a navigation against a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDecision {
    /// No active rule matched
    NotBlocked,
    /// Blocked by the rule with this id
    Blocked(String),
}

impl BlockDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// Id of the matching rule, if any.
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Self::Blocked(id) => Some(id),
            Self::NotBlocked => None,
        }
    }

    /// Follow-up actions the caller must apply, `None` when not blocked.
    pub fn action(&self, redirect_page: &str) -> Option<BlockAction> {
        self.rule_id().map(|id| BlockAction {
            redirect_url: redirect_page.to_string(),
            rule_id: id.to_string(),
        })
    }
}

/// Default page a blocked tab is sent to, relative to the extension root.
pub const DEFAULT_REDIRECT_PAGE: &str = "blocked.html";

/// What the caller does after a `Blocked` decision.
///
/// The evaluator performs neither step. Redirecting and persisting the
/// incremented counter are independent and not transactional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAction {
    /// Where to send the tab
    pub redirect_url: String,
    /// Rule whose usage counter should be incremented
    pub rule_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rule_defaults() {
        let rule = BlockRule::new("1", ["facebook.com"], "09:00", "17:00");
        assert!(rule.is_active);
        assert_eq!(rule.time_spent, 0);
        assert_eq!(rule.patterns, vec!["facebook.com".to_string()]);
        assert!(rule.window().is_ok());
    }

    #[test]
    fn test_decision_accessors() {
        let blocked = BlockDecision::Blocked("r1".to_string());
        assert!(blocked.is_blocked());
        assert_eq!(blocked.rule_id(), Some("r1"));
        assert!(!BlockDecision::NotBlocked.is_blocked());
        assert_eq!(BlockDecision::NotBlocked.rule_id(), None);
    }

    #[test]
    fn test_decision_action() {
        let action = BlockDecision::Blocked("r1".to_string())
            .action(DEFAULT_REDIRECT_PAGE)
            .unwrap();
        assert_eq!(action.redirect_url, "blocked.html");
        assert_eq!(action.rule_id, "r1");
        assert_eq!(BlockDecision::NotBlocked.action(DEFAULT_REDIRECT_PAGE), None);
    }
}
