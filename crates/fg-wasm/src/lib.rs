//! WebAssembly bindings for Focusgate
//!
//! The extension's background script creates one `NavigationGuard`, feeds it
//! the rule list read from storage, and asks it about every navigation and
//! active-tab URL change. The guard owns the rules; there is no global state.

use chrono::NaiveTime;
use wasm_bindgen::prelude::*;

use fg_core::{BlockDecision, BlockRule, DEFAULT_REDIRECT_PAGE};
use fg_rules::{validate_rules, RuleSet, StorageKey, ValidationReport};

/// Decision handed back to the background script.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NavigationCheck {
    blocked: bool,
    rule_id: Option<String>,
    redirect_url: Option<String>,
}

impl NavigationCheck {
    fn from_decision(decision: &BlockDecision, redirect_page: &str) -> Self {
        match decision.action(redirect_page) {
            Some(action) => Self {
                blocked: true,
                rule_id: Some(action.rule_id),
                redirect_url: Some(action.redirect_url),
            },
            None => Self {
                blocked: false,
                rule_id: None,
                redirect_url: None,
            },
        }
    }

    fn to_js(&self) -> JsValue {
        let result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&result, &"blocked".into(), &JsValue::from(self.blocked));
        if let Some(rule_id) = &self.rule_id {
            let _ = js_sys::Reflect::set(&result, &"ruleId".into(), &JsValue::from_str(rule_id));
        }
        if let Some(redirect_url) = &self.redirect_url {
            let _ = js_sys::Reflect::set(&result, &"redirectUrl".into(), &JsValue::from_str(redirect_url));
        }
        result.into()
    }
}

#[wasm_bindgen]
pub struct NavigationGuard {
    rules: RuleSet,
    key: StorageKey,
    redirect_page: String,
}

#[wasm_bindgen]
impl NavigationGuard {
    /// `rules_json` is either the storage object or a bare array.
    /// `storage_key` defaults to `focusRules`, `redirect_page` to `blocked.html`.
    /// Focus rules start switched on only if the storage object has `isFocusModeOn: true`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        rules_json: &str,
        storage_key: Option<String>,
        redirect_page: Option<String>,
    ) -> Result<NavigationGuard, JsValue> {
        let key = parse_key(storage_key).map_err(|e| JsValue::from_str(&e))?;
        Self::load(rules_json, key, redirect_page).map_err(|e| JsValue::from_str(&e))
    }

    /// Replace the owned rules, e.g. after the options page saved a change.
    /// On error the previous rules stay in place.
    pub fn set_rules(&mut self, rules_json: &str) -> Result<(), JsValue> {
        self.replace_rules(rules_json).map_err(|e| JsValue::from_str(&e))
    }

    /// Start or stop focus mode.
    pub fn set_focus_mode(&mut self, on: bool) {
        self.rules.set_enabled(on);
    }

    pub fn focus_mode_on(&self) -> bool {
        self.rules.is_enabled()
    }

    /// Check a navigation at the given local wall-clock time.
    ///
    /// Returns `{ blocked, ruleId?, redirectUrl? }`. An unparseable URL is
    /// reported as not blocked.
    pub fn check_navigation(&self, url: &str, hour: u32, minute: u32) -> Result<JsValue, JsValue> {
        self.check_clock(url, hour, minute)
            .map(|check| check.to_js())
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Increment a rule's usage counter. Returns false for an unknown id.
    pub fn record_block(&mut self, rule_id: &str) -> bool {
        self.rules.record_block(rule_id).is_ok()
    }

    /// Storage object to persist after `record_block`.
    pub fn rules_json(&self) -> Result<String, JsValue> {
        self.encode().map_err(|e| JsValue::from_str(&e))
    }

    pub fn storage_key(&self) -> String {
        self.key.as_str().to_string()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl NavigationGuard {
    fn load(rules_json: &str, key: StorageKey, redirect_page: Option<String>) -> Result<Self, String> {
        Ok(Self {
            rules: load_rules(rules_json, key)?,
            key,
            redirect_page: redirect_page.unwrap_or_else(|| DEFAULT_REDIRECT_PAGE.to_string()),
        })
    }

    /// The switch is left alone: it changes through `set_focus_mode` only.
    fn replace_rules(&mut self, rules_json: &str) -> Result<(), String> {
        let mut rules = load_rules(rules_json, self.key)?;
        rules.set_enabled(self.rules.is_enabled());
        self.rules = rules;
        Ok(())
    }

    fn check_clock(&self, url: &str, hour: u32, minute: u32) -> Result<NavigationCheck, String> {
        let now = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| format!("Invalid time {}:{}", hour, minute))?;
        Ok(self.check_at(url, &now))
    }

    fn check_at(&self, url: &str, now: &NaiveTime) -> NavigationCheck {
        let decision = self.rules.decide(url, now);
        NavigationCheck::from_decision(&decision, &self.redirect_page)
    }

    fn encode(&self) -> Result<String, String> {
        self.rules
            .to_json(self.key)
            .map_err(|e| format!("Failed to encode rules: {}", e))
    }
}

/// Validate a rule list for the options page.
///
/// Returns an array of `{ ruleId, severity, message }`.
#[wasm_bindgen]
pub fn validate_rules_json(rules_json: &str, storage_key: Option<String>) -> Result<JsValue, JsValue> {
    let key = parse_key(storage_key).map_err(|e| JsValue::from_str(&e))?;
    let rules = fg_rules::decode_rules(rules_json, key)
        .map_err(|e| JsValue::from_str(&format!("Failed to decode rules: {}", e)))?;
    let report = validate_rules(&rules);

    let issues = js_sys::Array::new();
    for issue in &report.issues {
        let entry = js_sys::Object::new();
        let severity = match issue.kind.severity() {
            fg_rules::Severity::Error => "error",
            fg_rules::Severity::Warning => "warning",
        };
        let _ = js_sys::Reflect::set(&entry, &"ruleId".into(), &JsValue::from_str(&issue.rule_id));
        let _ = js_sys::Reflect::set(&entry, &"severity".into(), &JsValue::from_str(severity));
        let _ = js_sys::Reflect::set(&entry, &"message".into(), &JsValue::from_str(&issue.to_string()));
        issues.push(&entry);
    }

    Ok(issues.into())
}

#[wasm_bindgen]
pub fn extract_host_js(url: &str) -> Option<String> {
    fg_core::url::extract_host(url).map(|h| h.to_string())
}

fn parse_key(storage_key: Option<String>) -> Result<StorageKey, String> {
    match storage_key {
        Some(key) => key.parse::<StorageKey>(),
        None => Ok(StorageKey::default()),
    }
}

fn load_rules(rules_json: &str, key: StorageKey) -> Result<RuleSet, String> {
    let rules = RuleSet::from_json(rules_json, key).map_err(|e| format!("Failed to load rules: {}", e))?;
    report_issues(rules.rules());
    Ok(rules)
}

/// Broken rules are skipped at match time; surface them in the console once, on load.
fn report_issues(rules: &[BlockRule]) {
    let report: ValidationReport = validate_rules(rules);
    if report.is_clean() {
        return;
    }
    #[cfg(target_arch = "wasm32")]
    for issue in &report.issues {
        web_sys::console::warn_1(&JsValue::from_str(&issue.to_string()));
    }
}
