//! Error type for the storage codec and rule set operations.

use fg_core::TimeParseError;

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("malformed rule data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of rules under '{0}'")]
    NotAList(String),
    #[error("no rule with id '{0}'")]
    UnknownRule(String),
    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),
    #[error("invalid time '{value}': {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: TimeParseError,
    },
    #[error("a rule needs at least one non-blank pattern")]
    NoPatterns,
    #[error("no free rule id at or above {0}")]
    IdsExhausted(u64),
}
