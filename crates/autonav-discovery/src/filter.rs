//! Privacy and exclusion filtering, applied while walking.

use autonav_config::Exclusion;

/// Leading character of private names.
pub const PRIVATE_MARKER: char = '_';

/// Decides which units discovery may yield or descend into.
#[derive(Clone, Debug, Default)]
pub struct UnitFilter {
    exclude_private: bool,
    exclusions: Vec<Exclusion>,
}

impl UnitFilter {
    /// Create a filter.
    #[must_use]
    pub fn new(exclude_private: bool, exclusions: Vec<Exclusion>) -> Self {
        Self {
            exclude_private,
            exclusions,
        }
    }

    /// Check a unit by its name segments.
    ///
    /// Every ancestor is checked too, so a unit below an excluded or private
    /// name is rejected even when the walk did not prune it.
    #[must_use]
    pub fn allows<S: AsRef<str>>(&self, parts: &[S]) -> bool {
        let mut dotted = String::new();
        for part in parts.iter().map(AsRef::as_ref) {
            if self.exclude_private && part.starts_with(PRIVATE_MARKER) {
                return false;
            }
            if !dotted.is_empty() {
                dotted.push('.');
            }
            dotted.push_str(part);
            if self.exclusions.iter().any(|rule| rule.matches(&dotted)) {
                return false;
            }
        }
        true
    }
}
