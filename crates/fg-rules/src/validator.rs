//! Rule validation
//!
//! The evaluator silently skips broken rules. This pass finds them up front
//! so the options page and the CLI can tell the user.

use std::collections::HashSet;
use std::fmt;

use fg_core::{BlockRule, DailyWindow, TimeOfDay, TimeParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The rule can still block, but not the way the user probably expects
    Warning,
    /// The rule can never block
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    InvalidStartTime(TimeParseError),
    InvalidEndTime(TimeParseError),
    NoPatterns,
    BlankPattern,
    DuplicateId,
    /// `start >= end`; includes windows meant to cross midnight
    EmptyWindow(DailyWindow),
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::BlankPattern => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub rule_id: String,
    pub kind: IssueKind,
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}: ", self.rule_id)?;
        match &self.kind {
            IssueKind::InvalidStartTime(e) => write!(f, "invalid start time ({})", e),
            IssueKind::InvalidEndTime(e) => write!(f, "invalid end time ({})", e),
            IssueKind::NoPatterns => f.write_str("no patterns"),
            IssueKind::BlankPattern => f.write_str("blank pattern is ignored"),
            IssueKind::DuplicateId => f.write_str("duplicate id"),
            IssueKind::EmptyWindow(w) if w.crosses_midnight() => {
                write!(f, "window {} crosses midnight and never blocks; split it in two", w)
            }
            IssueKind::EmptyWindow(w) => write!(f, "window {} is empty and never blocks", w),
        }
    }
}

/// All issues found in a rule list, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<RuleIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.kind.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &RuleIssue> {
        self.issues.iter().filter(|i| i.kind.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RuleIssue> {
        self.issues.iter().filter(|i| i.kind.severity() == Severity::Warning)
    }
}

/// Check every rule. Inactive rules are checked too: they may be toggled on later.
pub fn validate_rules(rules: &[BlockRule]) -> ValidationReport {
    let mut issues = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for rule in rules {
        let mut push = |kind| {
            issues.push(RuleIssue {
                rule_id: rule.id.clone(),
                kind,
            })
        };

        if !seen_ids.insert(rule.id.as_str()) {
            push(IssueKind::DuplicateId);
        }

        let non_blank = rule.patterns.iter().filter(|p| !p.trim().is_empty()).count();
        if non_blank == 0 {
            push(IssueKind::NoPatterns);
        } else if non_blank < rule.patterns.len() {
            push(IssueKind::BlankPattern);
        }

        let start = rule.start_time.parse::<TimeOfDay>();
        let end = rule.end_time.parse::<TimeOfDay>();
        match (start, end) {
            (Ok(start), Ok(end)) => {
                let window = DailyWindow::new(start, end);
                if window.is_empty() {
                    push(IssueKind::EmptyWindow(window));
                }
            }
            (start, end) => {
                if let Err(e) = start {
                    push(IssueKind::InvalidStartTime(e));
                }
                if let Err(e) = end {
                    push(IssueKind::InvalidEndTime(e));
                }
            }
        }
    }

    ValidationReport { issues }
}
