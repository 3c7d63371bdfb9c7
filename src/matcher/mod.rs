// src/matcher/mod.rs

//! Path matching and live match bookkeeping.
//!
//! - [`rule`] compiles a single glob / `regex:` / predicate rule.
//! - [`path_rules`] evaluates ordered include and exclude lists.
//! - [`match_set`] holds the live matched/excluded sets.
//! - [`file_matcher`] composes both into the unit callers attach to a watch.

pub mod file_matcher;
pub mod match_set;
pub mod path_rules;
pub mod rule;

pub use file_matcher::{FileMatcher, FileMatcherBuilder};
pub use match_set::MatchSet;
pub use path_rules::PathRules;
pub use rule::Rule;
