// src/matcher/rule.rs

use std::fmt;
use std::sync::Arc;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::errors::{FolderWatchError, Result};

const REGEX_PREFIX: &str = "regex:";
const GLOB_PREFIX: &str = "glob:";

type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

/// A single compiled include/exclude rule.
///
/// - `Glob` rules see the path relative to the matcher root (`scss/a.scss`).
/// - `Regex` rules see the full absolute path and are not anchored for you.
/// - `Predicate` rules are arbitrary closures over the relative path.
#[derive(Clone)]
pub enum Rule {
    Glob {
        source: String,
        matcher: GlobSet,
    },
    Regex(Regex),
    Predicate {
        name: String,
        func: Arc<PredicateFn>,
    },
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Glob { source, .. } => write!(f, "Glob({source:?})"),
            Rule::Regex(re) => write!(f, "Regex({:?})", re.as_str()),
            Rule::Predicate { name, .. } => write!(f, "Predicate({name:?})"),
        }
    }
}

impl Rule {
    /// Compile a textual rule.
    ///
    /// `regex:<re>` selects the regex syntax, `glob:<glob>` or a bare pattern
    /// selects globs. Malformed patterns are rejected here, never at match
    /// time.
    pub fn parse(pattern: &str) -> Result<Rule> {
        if let Some(re) = pattern.strip_prefix(REGEX_PREFIX) {
            let regex = Regex::new(re).map_err(|e| FolderWatchError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Rule::Regex(regex));
        }

        let glob = pattern.strip_prefix(GLOB_PREFIX).unwrap_or(pattern);
        if glob.is_empty() {
            return Err(FolderWatchError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "empty glob".to_string(),
            });
        }

        let invalid = |e: globset::Error| FolderWatchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        };
        let mut builder = GlobSetBuilder::new();
        for variant in expand_glob(glob) {
            builder.add(
                GlobBuilder::new(&variant)
                    .literal_separator(true)
                    .build()
                    .map_err(invalid)?,
            );
        }
        let matcher = builder.build().map_err(invalid)?;

        Ok(Rule::Glob {
            source: glob.to_string(),
            matcher,
        })
    }

    /// Build a rule from a closure over the root-relative path.
    pub fn predicate<F>(name: impl Into<String>, func: F) -> Rule
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Rule::Predicate {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Evaluate the rule. `rel` uses `/` separators and is relative to the
    /// matcher root, `abs` is the absolute path with `/` separators.
    pub fn is_match(&self, rel: &str, abs: &str) -> bool {
        match self {
            Rule::Glob { matcher, .. } => matcher.is_match(rel),
            Rule::Regex(re) => re.is_match(abs),
            Rule::Predicate { func, .. } => func(rel),
        }
    }
}

/// Rewrite `**` glued to other characters into globs `globset` accepts.
///
/// A glued `**` matches any run of characters, `/` included:
/// - `**.scss` becomes `**/*.scss` (any depth, including directly under root)
/// - `foo**` becomes `foo*` or `foo*/**`
/// - `a**b` becomes `a*b` or `a*/**/*b`
///
/// Every returned variant is a plain glob; the rule matches if any does.
pub(crate) fn expand_glob(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut variants = vec![String::with_capacity(pattern.len() + 4)];
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '*' && chars.get(i + 1) == Some(&'*') {
            let mut end = i + 2;
            while chars.get(end) == Some(&'*') {
                end += 1;
            }
            let open_before = i == 0 || chars[i - 1] == '/';
            let open_after = end == chars.len() || chars[end] == '/';

            let choices: &[&str] = match (open_before, open_after) {
                (true, true) => &["**"],
                (true, false) => &["**/*"],
                (false, true) => &["*", "*/**"],
                (false, false) => &["*", "*/**/*"],
            };
            variants = variants
                .iter()
                .flat_map(|v| choices.iter().map(move |c| format!("{v}{c}")))
                .collect();
            i = end;
        } else {
            for v in &mut variants {
                v.push(chars[i]);
            }
            i += 1;
        }
    }

    variants
}

