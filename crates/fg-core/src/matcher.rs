//! Core Rule Evaluator
//!
//! Every navigation goes through here. The evaluator is a pure function of
//! `(url, rules, now)`: it reads no clock, keeps no state between calls and
//! never mutates a rule.

use chrono::Timelike;
use log::{debug, trace, warn};

use crate::time::{DailyWindow, TimeOfDay, TimeParseError};
use crate::types::{BlockDecision, BlockRule};
use crate::url::{contains_ignore_ascii_case, parse_url, ParsedUrl};

/// Error type for rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid url: {0:?}")]
    InvalidUrl(String),
    #[error("rule {rule_id:?} has an invalid time window: {source}")]
    InvalidRuleConfiguration {
        rule_id: String,
        #[source]
        source: TimeParseError,
    },
}

// =============================================================================
// Evaluation
// =============================================================================

/// Decide whether navigating to `url` at `now` is blocked.
///
/// Rules are examined in order and the first active rule whose patterns and
/// window both match wins. Rules with a malformed window are skipped. Only
/// an unparseable URL fails the call.
pub fn is_blocked<T: Timelike>(
    url: &str,
    rules: &[BlockRule],
    now: &T,
) -> Result<BlockDecision, EvalError> {
    let parsed = parse_url(url).ok_or_else(|| EvalError::InvalidUrl(url.to_string()))?;
    let now = TimeOfDay::from_timelike(now);

    for rule in rules {
        match rule_matches(rule, &parsed, now) {
            Ok(true) => {
                debug!("{} blocked by rule {} at {}", parsed.host, rule.id, now);
                return Ok(BlockDecision::Blocked(rule.id.clone()));
            }
            Ok(false) => {}
            Err(e) => warn!("skipping rule: {}", e),
        }
    }

    Ok(BlockDecision::NotBlocked)
}

/// Permissive wrapper around [`is_blocked`]: an invalid URL lets the
/// navigation through.
pub fn evaluate<T: Timelike>(url: &str, rules: &[BlockRule], now: &T) -> BlockDecision {
    match is_blocked(url, rules, now) {
        Ok(decision) => decision,
        Err(e) => {
            debug!("allowing navigation: {}", e);
            BlockDecision::NotBlocked
        }
    }
}

/// Check a single rule. `Err` means the rule is misconfigured and must be skipped.
fn rule_matches(rule: &BlockRule, url: &ParsedUrl<'_>, now: TimeOfDay) -> Result<bool, EvalError> {
    if !rule.is_active {
        trace!("rule {} inactive", rule.id);
        return Ok(false);
    }

    if !patterns_match(&rule.patterns, url) {
        return Ok(false);
    }

    let window = rule_window(rule)?;
    let inside = window.contains(now);
    trace!("rule {} window {} contains {}: {}", rule.id, window, now, inside);
    Ok(inside)
}

/// Parse a rule's window, tagging failures with the rule id.
pub fn rule_window(rule: &BlockRule) -> Result<DailyWindow, EvalError> {
    rule.window().map_err(|source| EvalError::InvalidRuleConfiguration {
        rule_id: rule.id.clone(),
        source,
    })
}

/// True if any pattern is contained in the hostname or the full URL.
pub fn patterns_match(patterns: &[String], url: &ParsedUrl<'_>) -> bool {
    patterns.iter().any(|pattern| pattern_matches(pattern, url))
}

#[inline]
fn pattern_matches(pattern: &str, url: &ParsedUrl<'_>) -> bool {
    contains_ignore_ascii_case(url.host, pattern) || contains_ignore_ascii_case(url.url, pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn facebook_rule() -> BlockRule {
        BlockRule::new("fb", ["facebook.com"], "09:00", "17:00")
    }

    #[test]
    fn test_scenario_blocked_inside_window() {
        let rules = [facebook_rule()];
        let decision = is_blocked("https://www.facebook.com/feed", &rules, &at(12, 0)).unwrap();
        assert_eq!(decision, BlockDecision::Blocked("fb".to_string()));
    }

    #[test]
    fn test_scenario_not_blocked_outside_window() {
        let rules = [facebook_rule()];
        let decision = is_blocked("https://www.facebook.com/feed", &rules, &at(20, 0)).unwrap();
        assert_eq!(decision, BlockDecision::NotBlocked);
    }

    #[test]
    fn test_scenario_inactive_rule() {
        let rules = [facebook_rule().active(false)];
        let decision = is_blocked("https://www.facebook.com/feed", &rules, &at(12, 0)).unwrap();
        assert_eq!(decision, BlockDecision::NotBlocked);
    }

    #[test]
    fn test_scenario_pattern_mismatch() {
        let rules = [BlockRule::new("r", ["reddit.com"], "09:00", "17:00")];
        let decision = is_blocked("https://www.facebook.com", &rules, &at(12, 0)).unwrap();
        assert_eq!(decision, BlockDecision::NotBlocked);
    }

    #[test]
    fn test_scenario_midnight_crossing_never_blocks() {
        let rules = [BlockRule::new("night", ["facebook.com"], "22:00", "06:00")];
        for (h, m) in [(23, 0), (22, 0), (2, 0), (5, 59)] {
            let decision = is_blocked("https://www.facebook.com", &rules, &at(h, m)).unwrap();
            assert_eq!(decision, BlockDecision::NotBlocked);
        }
    }

    #[test]
    fn test_half_open_boundaries() {
        let rules = [facebook_rule()];
        let url = "https://facebook.com";
        assert!(is_blocked(url, &rules, &at(9, 0)).unwrap().is_blocked());
        assert!(is_blocked(url, &rules, &at(16, 59)).unwrap().is_blocked());
        assert!(!is_blocked(url, &rules, &at(17, 0)).unwrap().is_blocked());
        assert!(!is_blocked(url, &rules, &at(8, 59)).unwrap().is_blocked());
    }

    #[test]
    fn test_seconds_do_not_extend_window() {
        let rules = [facebook_rule()];
        let now = NaiveTime::from_hms_opt(16, 59, 59).unwrap();
        assert!(is_blocked("https://facebook.com", &rules, &now).unwrap().is_blocked());
    }

    #[test]
    fn test_accepts_datetime() {
        let rules = [facebook_rule()];
        let now = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 30, 0).unwrap();
        assert!(is_blocked("https://facebook.com", &rules, &now).unwrap().is_blocked());
    }

    #[test]
    fn test_first_match_wins() {
        let rules = [
            BlockRule::new("first", ["facebook"], "09:00", "17:00"),
            BlockRule::new("second", ["facebook.com"], "00:00", "23:59"),
        ];
        let decision = is_blocked("https://www.facebook.com", &rules, &at(12, 0)).unwrap();
        assert_eq!(decision.rule_id(), Some("first"));
    }

    #[test]
    fn test_inactive_rule_is_passed_over() {
        let rules = [
            BlockRule::new("off", ["facebook.com"], "00:00", "23:59").active(false),
            BlockRule::new("on", ["facebook.com"], "00:00", "23:59"),
        ];
        let decision = is_blocked("https://facebook.com", &rules, &at(12, 0)).unwrap();
        assert_eq!(decision.rule_id(), Some("on"));
    }

    #[test]
    fn test_any_pattern_matches() {
        let rules = [BlockRule::new("social", ["twitter.com", "x.com", "reddit.com"], "09:00", "17:00")];
        assert!(is_blocked("https://old.reddit.com/r/rust", &rules, &at(10, 0)).unwrap().is_blocked());
        assert!(!is_blocked("https://news.ycombinator.com", &rules, &at(10, 0)).unwrap().is_blocked());
    }

    #[test]
    fn test_pattern_matches_full_url() {
        let rules = [BlockRule::new("shorts", ["youtube.com/shorts"], "09:00", "17:00")];
        assert!(is_blocked("https://www.youtube.com/shorts/abc", &rules, &at(10, 0)).unwrap().is_blocked());
        assert!(!is_blocked("https://www.youtube.com/watch?v=abc", &rules, &at(10, 0)).unwrap().is_blocked());
    }

    #[test]
    fn test_pattern_case_insensitive() {
        let rules = [BlockRule::new("fb", ["Facebook.COM"], "09:00", "17:00")];
        assert!(is_blocked("https://WWW.facebook.com", &rules, &at(10, 0)).unwrap().is_blocked());
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let rules = [BlockRule::new("blank", [""], "00:00", "23:59")];
        assert!(!is_blocked("https://example.com", &rules, &at(10, 0)).unwrap().is_blocked());

        let no_patterns = [BlockRule::new("none", Vec::<String>::new(), "00:00", "23:59")];
        assert!(!is_blocked("https://example.com", &no_patterns, &at(10, 0)).unwrap().is_blocked());
    }

    #[test]
    fn test_empty_rules() {
        let decision = is_blocked("https://example.com", &[], &at(10, 0)).unwrap();
        assert_eq!(decision, BlockDecision::NotBlocked);
    }

    #[test]
    fn test_malformed_rule_is_skipped() {
        let rules = [
            BlockRule::new("broken", ["facebook.com"], "9am", "17:00"),
            BlockRule::new("ok", ["facebook.com"], "09:00", "17:00"),
        ];
        let decision = is_blocked("https://facebook.com", &rules, &at(10, 0)).unwrap();
        assert_eq!(decision.rule_id(), Some("ok"));
    }

    #[test]
    fn test_malformed_rule_alone_does_not_block() {
        let rules = [BlockRule::new("broken", ["facebook.com"], "09:00", "25:00")];
        let decision = is_blocked("https://facebook.com", &rules, &at(10, 0)).unwrap();
        assert_eq!(decision, BlockDecision::NotBlocked);
    }

    #[test]
    fn test_rule_window_error_names_rule() {
        let rule = BlockRule::new("broken", ["x"], "nope", "17:00");
        match rule_window(&rule) {
            Err(EvalError::InvalidRuleConfiguration { rule_id, .. }) => assert_eq!(rule_id, "broken"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_url() {
        let rules = [facebook_rule()];
        assert_eq!(
            is_blocked("facebook.com", &rules, &at(12, 0)),
            Err(EvalError::InvalidUrl("facebook.com".to_string()))
        );
        assert!(matches!(is_blocked("", &rules, &at(12, 0)), Err(EvalError::InvalidUrl(_))));
    }

    #[test]
    fn test_evaluate_allows_invalid_url() {
        let rules = [facebook_rule()];
        assert_eq!(evaluate("not a url facebook.com", &rules, &at(12, 0)), BlockDecision::NotBlocked);
        assert!(evaluate("https://facebook.com", &rules, &at(12, 0)).is_blocked());
    }

    #[test]
    fn test_idempotent() {
        let rules = [facebook_rule(), BlockRule::new("r", ["reddit.com"], "00:00", "23:59")];
        for url in ["https://facebook.com", "https://reddit.com", "https://example.com", "bogus"] {
            let first = is_blocked(url, &rules, &at(12, 0));
            let second = is_blocked(url, &rules, &at(12, 0));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_does_not_touch_rules() {
        let rules = vec![facebook_rule()];
        let before = rules.clone();
        let _ = is_blocked("https://facebook.com", &rules, &at(12, 0));
        assert_eq!(rules, before);
        assert_eq!(rules[0].time_spent, 0);
    }
}
