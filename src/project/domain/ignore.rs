//! Ignore rules deciding whether a revision's changes warrant a build.

use super::ProjectDomainError;
use glob::{MatchOptions, Pattern};
use std::path::Path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    negated: bool,
    anchored_to_name: bool,
}

impl IgnoreRule {
    fn matches(&self, path: &str) -> bool {
        if self.pattern.matches_with(path, MATCH_OPTIONS) {
            return true;
        }
        self.anchored_to_name
            && Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| self.pattern.matches_with(name, MATCH_OPTIONS))
    }
}

/// Compiled ignore patterns in gitignore style.
///
/// A leading `!` re-includes paths matched by an earlier rule, the last
/// matching rule wins, and patterns without a `/` also match a path's file
/// name.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Compiles ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidIgnorePattern`] for the first
    /// pattern that is not a valid glob.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ProjectDomainError> {
        let rules = patterns
            .iter()
            .map(|raw| compile_rule(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Returns `true` when there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` when `path` is ignored.
    #[must_use]
    pub fn ignores(&self, path: &str) -> bool {
        let normalized = path.trim_start_matches('/');
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(normalized))
            .is_some_and(|rule| !rule.negated)
    }

    /// Returns `true` when there is at least one file and every file is
    /// ignored.
    #[must_use]
    pub fn ignores_all<S: AsRef<str>>(&self, paths: &[S]) -> bool {
        !self.rules.is_empty()
            && !paths.is_empty()
            && paths.iter().all(|path| self.ignores(path.as_ref()))
    }
}

fn compile_rule(raw: &str) -> Result<IgnoreRule, ProjectDomainError> {
    let trimmed = raw.trim();
    let (negated, body) = trimmed
        .strip_prefix('!')
        .map_or((false, trimmed), |rest| (true, rest));
    let unanchored = body.trim_start_matches('/');
    let pattern = Pattern::new(unanchored).map_err(|err| {
        ProjectDomainError::InvalidIgnorePattern {
            pattern: raw.to_owned(),
            reason: err.msg.to_owned(),
        }
    })?;
    Ok(IgnoreRule {
        pattern,
        negated,
        anchored_to_name: !body.contains('/'),
    })
}
