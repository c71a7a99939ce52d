//! Storage record shape
//!
//! The extension keeps its rules in the browser's key-value storage as an
//! array of plain JSON objects. Two lists exist: the site blocker writes
//! `blockedSites` records (no toggle, no counter) and focus mode writes
//! `focusRules` records. Both use a single `url` pattern; newer records may
//! carry a `patterns` array instead.

use std::fmt;
use std::str::FromStr;

use fg_core::BlockRule;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Storage Key
// =============================================================================

/// Key under which a rule list lives in extension storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKey {
    /// Site blocker list
    BlockedSites,
    /// Focus mode list
    #[default]
    FocusRules,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockedSites => "blockedSites",
            Self::FocusRules => "focusRules",
        }
    }
}

impl FromStr for StorageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blockedSites" | "blocked-sites" => Ok(Self::BlockedSites),
            "focusRules" | "focus-rules" => Ok(Self::FocusRules),
            other => Err(format!("unknown storage key '{}' (expected blockedSites or focusRules)", other)),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rule Record
// =============================================================================

/// One stored rule, as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, alias = "urls", skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub time_spent: u64,
}

fn default_active() -> bool {
    true
}

/// Ids are generated from `Date.now()`, so older records may hold a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Int(n) => n.to_string(),
    })
}

impl From<RuleRecord> for BlockRule {
    fn from(record: RuleRecord) -> Self {
        let mut patterns = Vec::new();
        patterns.extend(record.url);
        patterns.extend(record.patterns.unwrap_or_default());

        BlockRule {
            id: record.id,
            patterns,
            start_time: record.start_time,
            end_time: record.end_time,
            is_active: record.is_active,
            time_spent: record.time_spent,
        }
    }
}

impl From<&BlockRule> for RuleRecord {
    fn from(rule: &BlockRule) -> Self {
        let (url, patterns) = match rule.patterns.as_slice() {
            [single] => (Some(single.clone()), None),
            many => (None, Some(many.to_vec())),
        };

        RuleRecord {
            id: rule.id.clone(),
            url,
            patterns,
            start_time: rule.start_time.clone(),
            end_time: rule.end_time.clone(),
            is_active: rule.is_active,
            time_spent: rule.time_spent,
        }
    }
}
