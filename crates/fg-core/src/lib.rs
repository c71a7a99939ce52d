//! Focusgate Core Library
//!
//! This crate provides the rule evaluator behind Focusgate's site blocker
//! and focus mode. Given a navigation URL, the user's blocking rules and
//! the current wall-clock time, it decides whether the tab should be sent
//! to the blocking page.
//!
//! # Architecture
//!
//! The evaluator is a pure function. The caller owns the rule set, supplies
//! the time, and performs the redirect and counter update itself. Nothing
//! here does I/O or keeps state between calls.
//!
//! # Modules
//!
//! - `url`: Allocation-free scheme/host extraction
//! - `time`: `HH:MM` parsing and half-open daily windows
//! - `matcher`: First-match-wins rule evaluation
//! - `types`: Shared type definitions

pub mod matcher;
pub mod time;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use matcher::{evaluate, is_blocked, EvalError};
pub use time::{DailyWindow, TimeOfDay, TimeParseError};
pub use types::{BlockAction, BlockDecision, BlockRule, DEFAULT_REDIRECT_PAGE};
