// src/matcher/path_rules.rs

use crate::errors::Result;
use crate::matcher::rule::Rule;

/// Ordered include/exclude rule lists for one matcher.
///
/// Stateless apart from the rules themselves; evaluation never mutates.
#[derive(Debug, Clone, Default)]
pub struct PathRules {
    includes: Vec<Rule>,
    excludes: Vec<Rule>,
}

impl PathRules {
    pub fn new(includes: Vec<Rule>, excludes: Vec<Rule>) -> Self {
        Self { includes, excludes }
    }

    /// Compile textual include/exclude patterns.
    pub fn compile<I, E>(includes: I, excludes: E) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let includes = includes
            .into_iter()
            .map(|p| Rule::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let excludes = excludes
            .into_iter()
            .map(|p| Rule::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { includes, excludes })
    }

    pub fn includes(&self) -> &[Rule] {
        &self.includes
    }

    pub fn excludes(&self) -> &[Rule] {
        &self.excludes
    }

    /// True iff any exclude rule matches.
    pub fn is_excluded(&self, rel: &str, abs: &str) -> bool {
        self.excludes.iter().any(|rule| rule.is_match(rel, abs))
    }

    /// True iff (no includes, or the first matching include exists) and the
    /// path is not excluded.
    pub fn is_match(&self, rel: &str, abs: &str) -> bool {
        if !self.includes.is_empty() && !self.includes.iter().any(|rule| rule.is_match(rel, abs)) {
            return false;
        }
        !self.is_excluded(rel, abs)
    }
}
