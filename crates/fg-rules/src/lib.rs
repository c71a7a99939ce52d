//! Focusgate rule storage
//!
//! This crate converts between the JSON rule lists the extension keeps in
//! browser storage and `fg_core::BlockRule`, validates them, and applies
//! the follow-up actions (usage counter, toggle, edit, delete) that the
//! evaluator leaves to its caller.

pub mod builder;
pub mod error;
pub mod parser;
pub mod record;
pub mod ruleset;
pub mod validator;

pub use builder::{encode_rules, encode_rules_into, encode_rules_value};
pub use error::RulesError;
pub use parser::{decode_enabled, decode_rules, decode_rules_value, FOCUS_MODE_FLAG};
pub use record::{RuleRecord, StorageKey};
pub use ruleset::RuleSet;
pub use validator::{validate_rules, IssueKind, RuleIssue, Severity, ValidationReport};
