//! Encode rule lists for extension storage.

use fg_core::BlockRule;
use serde_json::{Map, Value};

use crate::error::RulesError;
use crate::record::{RuleRecord, StorageKey};

fn encode_records(rules: &[BlockRule]) -> Result<Value, RulesError> {
    let records: Vec<RuleRecord> = rules.iter().map(RuleRecord::from).collect();
    Ok(serde_json::to_value(records)?)
}

/// Build the storage object `{ "<key>": [records...] }` to pass to a storage `set`.
pub fn encode_rules_value(rules: &[BlockRule], key: StorageKey) -> Result<Value, RulesError> {
    encode_rules_into(Value::Object(Map::new()), rules, key)
}

/// Write `rules` back into a document previously read from storage.
///
/// A bare array is replaced as a whole. In a storage object only the entry
/// under `key` changes; every other entry is kept as it was.
pub fn encode_rules_into(document: Value, rules: &[BlockRule], key: StorageKey) -> Result<Value, RulesError> {
    let records = encode_records(rules)?;
    match document {
        Value::Array(_) => Ok(records),
        Value::Object(mut map) => {
            map.insert(key.as_str().to_string(), records);
            Ok(Value::Object(map))
        }
        _ => Err(RulesError::NotAList(key.as_str().to_string())),
    }
}

/// Serialize the storage object as pretty JSON.
pub fn encode_rules(rules: &[BlockRule], key: StorageKey) -> Result<String, RulesError> {
    let value = encode_rules_value(rules, key)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
