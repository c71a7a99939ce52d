//! Decode rule lists read from extension storage.

use fg_core::BlockRule;
use log::debug;
use serde_json::Value;

use crate::error::RulesError;
use crate::record::{RuleRecord, StorageKey};

/// Focus mode master switch, stored next to `focusRules`.
pub const FOCUS_MODE_FLAG: &str = "isFocusModeOn";

/// Decode rules from JSON.
///
/// Accepts either a bare array of records or the object returned by a
/// storage `get` (`{ "focusRules": [...] }`). A storage object without the
/// key yields an empty list, matching a first run with nothing saved.
pub fn decode_rules(json: &str, key: StorageKey) -> Result<Vec<BlockRule>, RulesError> {
    let value: Value = serde_json::from_str(json)?;
    decode_rules_value(value, key)
}

/// Same as [`decode_rules`] for an already parsed value.
pub fn decode_rules_value(value: Value, key: StorageKey) -> Result<Vec<BlockRule>, RulesError> {
    let list = match value {
        Value::Array(list) => Value::Array(list),
        Value::Object(mut map) => match map.remove(key.as_str()) {
            Some(Value::Null) | None => {
                debug!("no '{}' entry in storage object", key);
                return Ok(Vec::new());
            }
            Some(list @ Value::Array(_)) => list,
            Some(_) => return Err(RulesError::NotAList(key.as_str().to_string())),
        },
        _ => return Err(RulesError::NotAList(key.as_str().to_string())),
    };

    let records: Vec<RuleRecord> = serde_json::from_value(list)?;
    debug!("decoded {} rules from '{}'", records.len(), key);
    Ok(records.into_iter().map(BlockRule::from).collect())
}

/// Whether the rules stored under `key` are switched on.
///
/// Web blocker rules have no switch. Focus rules only block while
/// `isFocusModeOn` is true; a storage object without the flag means focus
/// mode was never started. A bare array carries no flag and is taken as on.
pub fn decode_enabled(value: &Value, key: StorageKey) -> bool {
    match (key, value) {
        (StorageKey::BlockedSites, _) => true,
        (StorageKey::FocusRules, Value::Object(map)) => {
            let on = map.get(FOCUS_MODE_FLAG).and_then(Value::as_bool).unwrap_or(false);
            debug!("focus mode is {}", if on { "on" } else { "off" });
            on
        }
        (StorageKey::FocusRules, _) => true,
    }
}
