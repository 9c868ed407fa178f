//! Per-unit renderer option overrides.
//!
//! `module_options` maps regular expressions to option mappings. Every
//! expression that matches the start of a unit's dotted identifier
//! contributes its options, in configuration order, later ones winning.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::warn;

/// Compiled `module_options` rules.
#[derive(Clone, Debug, Default)]
pub struct ModuleOptions {
    rules: Vec<(Regex, Mapping)>,
}

impl ModuleOptions {
    /// Compile rules from the raw configuration mapping.
    ///
    /// Keys that are not strings, keys that fail to compile and values that
    /// are not mappings are logged and skipped.
    #[must_use]
    pub fn from_mapping(raw: &Mapping) -> Self {
        let mut rules = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let Value::String(pattern) = key else {
                warn!("Ignoring module_options key {key:?}: not a string");
                continue;
            };
            let Value::Mapping(options) = value else {
                warn!("Ignoring module_options for {pattern:?}: value is not a mapping");
                continue;
            };
            match Regex::new(&format!("^(?:{pattern})")) {
                Ok(regex) => rules.push((regex, options.clone())),
                Err(e) => warn!("Ignoring module_options pattern {pattern:?}: {e}"),
            }
        }
        Self { rules }
    }

    /// Merged overrides for a dotted identifier.
    #[must_use]
    pub fn for_identifier(&self, identifier: &str) -> Mapping {
        let mut merged = Mapping::new();
        for (regex, options) in &self.rules {
            if regex.is_match(identifier) {
                for (key, value) in options {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

}

/// Renderer options of one source, in the form its strategy reads them.
#[derive(Clone, Debug)]
pub enum SourceOptions {
    /// Pattern-keyed overrides, like the plugin-level `module_options`.
    Patterns(ModuleOptions),
    /// Options given to every unit as they are (e.g. the C `handler`).
    Flat(Mapping),
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self::Patterns(ModuleOptions::default())
    }
}

impl SourceOptions {
    /// Options this source contributes for a dotted identifier.
    #[must_use]
    pub fn for_identifier(&self, identifier: &str) -> Mapping {
        match self {
            Self::Patterns(rules) => rules.for_identifier(identifier),
            Self::Flat(options) => options.clone(),
        }
    }
}
