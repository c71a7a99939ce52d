//! Owned rule list plus the follow-up actions a caller applies to it.
//!
//! The evaluator never mutates rules. Whoever handles navigation events
//! keeps a `RuleSet`, asks it for a decision, then redirects the tab and
//! calls [`RuleSet::record_block`] before persisting.

use std::collections::HashSet;

use chrono::Timelike;
use fg_core::{evaluate, is_blocked, BlockDecision, BlockRule, EvalError, TimeOfDay};
use log::debug;
use serde_json::Value;

use crate::error::RulesError;
use crate::record::StorageKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<BlockRule>,
    /// Master switch; `isFocusModeOn` for focus rules. While off nothing blocks.
    enabled: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            enabled: true,
        }
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a decoded list. Ids must be unique.
    pub fn from_rules(rules: Vec<BlockRule>) -> Result<Self, RulesError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(RulesError::DuplicateId(rule.id.clone()));
            }
        }
        Ok(Self { rules, enabled: true })
    }

    /// Decode straight from storage JSON.
    pub fn from_json(json: &str, key: StorageKey) -> Result<Self, RulesError> {
        Self::from_value(serde_json::from_str(json)?, key)
    }

    /// Decode a parsed storage document, picking up the focus mode switch.
    pub fn from_value(value: Value, key: StorageKey) -> Result<Self, RulesError> {
        let enabled = crate::parser::decode_enabled(&value, key);
        let mut set = Self::from_rules(crate::parser::decode_rules_value(value, key)?)?;
        set.enabled = enabled;
        Ok(set)
    }

    /// Storage object under `key`. Focus rules carry the switch next to them.
    pub fn to_value(&self, key: StorageKey) -> Result<Value, RulesError> {
        let mut value = crate::builder::encode_rules_value(&self.rules, key)?;
        if let (StorageKey::FocusRules, Value::Object(map)) = (key, &mut value) {
            map.insert(crate::parser::FOCUS_MODE_FLAG.to_string(), Value::Bool(self.enabled));
        }
        Ok(value)
    }

    /// Encode for storage under `key`.
    pub fn to_json(&self, key: StorageKey) -> Result<String, RulesError> {
        Ok(serde_json::to_string_pretty(&self.to_value(key)?)?)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn focus mode on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        debug!("rule set {}", if enabled { "enabled" } else { "disabled" });
        self.enabled = enabled;
    }

    pub fn rules(&self) -> &[BlockRule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<BlockRule> {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BlockRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut BlockRule, RulesError> {
        self.rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RulesError::UnknownRule(id.to_string()))
    }

    /// Append a new active rule and return its id.
    ///
    /// Ids come from the caller's millisecond clock (`Date.now()` in the
    /// extension); on collision the value is bumped until it is free.
    pub fn add<P, S>(&mut self, patterns: P, start: &str, end: &str, now_millis: u64) -> Result<String, RulesError>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| Into::<String>::into(p).trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if patterns.is_empty() {
            return Err(RulesError::NoPatterns);
        }

        let (start, end) = (parse_time(start)?, parse_time(end)?);

        let mut candidate = now_millis;
        while self.get(&candidate.to_string()).is_some() {
            candidate = candidate.checked_add(1).ok_or(RulesError::IdsExhausted(now_millis))?;
        }
        let id = candidate.to_string();

        self.rules
            .push(BlockRule::new(id.clone(), patterns, start.to_string(), end.to_string()));
        debug!("added rule {}", id);
        Ok(id)
    }

    /// Delete a rule, returning it.
    pub fn remove(&mut self, id: &str) -> Result<BlockRule, RulesError> {
        let pos = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RulesError::UnknownRule(id.to_string()))?;
        Ok(self.rules.remove(pos))
    }

    /// Flip `is_active`, returning the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool, RulesError> {
        let rule = self.get_mut(id)?;
        rule.is_active = !rule.is_active;
        Ok(rule.is_active)
    }

    /// Replace a rule's window. Both times must parse; they are stored normalized (`09:05`).
    pub fn set_window(&mut self, id: &str, start: &str, end: &str) -> Result<(), RulesError> {
        let (start, end) = (parse_time(start)?, parse_time(end)?);
        let rule = self.get_mut(id)?;
        rule.start_time = start.to_string();
        rule.end_time = end.to_string();
        Ok(())
    }

    /// Increment the usage counter of a rule that just blocked a navigation.
    pub fn record_block(&mut self, id: &str) -> Result<u64, RulesError> {
        let rule = self.get_mut(id)?;
        rule.time_spent = rule.time_spent.saturating_add(1);
        Ok(rule.time_spent)
    }

    /// Evaluate a navigation against the owned rules. Nothing blocks while the set is disabled.
    pub fn check<T: Timelike>(&self, url: &str, now: &T) -> Result<BlockDecision, EvalError> {
        if !self.enabled {
            return Ok(BlockDecision::NotBlocked);
        }
        is_blocked(url, &self.rules, now)
    }

    /// Like [`RuleSet::check`], but an invalid URL is allowed through.
    pub fn decide<T: Timelike>(&self, url: &str, now: &T) -> BlockDecision {
        if !self.enabled {
            return BlockDecision::NotBlocked;
        }
        evaluate(url, &self.rules, now)
    }
}

fn parse_time(value: &str) -> Result<TimeOfDay, RulesError> {
    value.parse().map_err(|source| RulesError::InvalidTime {
        value: value.to_string(),
        source,
    })
}
