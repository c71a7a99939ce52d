use std::fs;
use std::path::Path;

use fg_core::BlockRule;
use fg_rules::{RuleSet, StorageKey};
use serde_json::Value;

/// Whole JSON document of a rules file: a storage export or a bare array.
pub fn read_document(path: &Path) -> Result<Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to load rules from '{}': {}", path.display(), e))
}

/// Decoded rules under `key`, without the unique-id check of a [`RuleSet`].
pub fn read_rule_list(path: &Path, key: StorageKey) -> Result<Vec<BlockRule>, String> {
    fg_rules::decode_rules_value(read_document(path)?, key)
        .map_err(|e| format!("Failed to load rules from '{}': {}", path.display(), e))
}

pub fn read_rules(path: &Path, key: StorageKey) -> Result<RuleSet, String> {
    rules_from_document(path, read_document(path)?, key)
}

pub fn rules_from_document(path: &Path, document: Value, key: StorageKey) -> Result<RuleSet, String> {
    RuleSet::from_value(document, key)
        .map_err(|e| format!("Failed to load rules from '{}': {}", path.display(), e))
}

/// Write `rules` back into `document` (as read from `path`) and save it.
/// Entries other than `key` are left untouched.
pub fn write_rules(path: &Path, document: Value, rules: &RuleSet, key: StorageKey) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    let document = fg_rules::encode_rules_into(document, rules.rules(), key)
        .map_err(|e| format!("Failed to encode rules: {}", e))?;
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| format!("Failed to encode rules: {}", e))?;
    fs::write(path, json)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}
