//! Exclusion rules for discovered units.
//!
//! Entries of the `exclude` list are literal dotted names unless they start
//! with `re:`, in which case the rest is a regular expression matched from
//! the start of the dotted name.

use regex::Regex;
use tracing::warn;

/// Prefix marking a regular-expression exclusion.
pub const REGEX_PREFIX: &str = "re:";

/// A single exclusion rule.
#[derive(Clone, Debug)]
pub enum Exclusion {
    /// Matches the name itself and every name below it.
    Literal(String),
    /// Matches names the expression matches at their start.
    Pattern(Regex),
}

impl Exclusion {
    /// Parse one configured entry.
    ///
    /// Returns `None` (after logging a warning) when a `re:` entry does not
    /// compile.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let Some(pattern) = raw.strip_prefix(REGEX_PREFIX) else {
            return Some(Self::Literal(raw.to_owned()));
        };
        match Regex::new(&format!("^(?:{pattern})")) {
            Ok(regex) => Some(Self::Pattern(regex)),
            Err(e) => {
                warn!("Ignoring invalid exclusion pattern {raw:?}: {e}");
                None
            }
        }
    }

    /// Check a dot-joined unit name.
    #[must_use]
    pub fn matches(&self, dotted: &str) -> bool {
        match self {
            Self::Literal(name) => dotted
                .strip_prefix(name.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.')),
            Self::Pattern(regex) => regex.is_match(dotted),
        }
    }
}

/// Parse the `exclude` list, dropping invalid patterns.
#[must_use]
pub fn parse_exclusions(raw: &[String]) -> Vec<Exclusion> {
    raw.iter().filter_map(|entry| Exclusion::parse(entry)).collect()
}
