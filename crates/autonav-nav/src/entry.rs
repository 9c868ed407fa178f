//! Typed navigation entries.
//!
//! A site navigation is a YAML list whose items are either bare strings (a
//! page path, or a placeholder title) or single-key mappings from a title to
//! a link or to a nested list. [`NavEntry`] gives those shapes names so the
//! merge rules can match on them. Anything else round-trips untouched through
//! the `Other` variants.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};

/// One item of a navigation list.
#[derive(Clone, Debug, PartialEq)]
pub enum NavEntry {
    /// Bare string: a page path, or a section placeholder title.
    Bare(String),
    /// Single-key mapping from a title to its value.
    Titled {
        /// Display title (the mapping key).
        title: String,
        /// Link target or nested entries.
        value: NavValue,
    },
    /// Any other YAML value (multi-key mappings, numbers, ...), kept verbatim.
    Other(Value),
}

/// Value side of a titled navigation entry.
#[derive(Clone, Debug, PartialEq)]
pub enum NavValue {
    /// Page path.
    Link(String),
    /// Nested navigation list.
    Children(Vec<NavEntry>),
    /// Any other YAML value (e.g. a nested mapping).
    Other(Value),
}

impl NavEntry {
    /// Bare page path entry.
    #[must_use]
    pub fn page(path: impl Into<String>) -> Self {
        Self::Bare(path.into())
    }

    /// `{title: path}` entry.
    #[must_use]
    pub fn link(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Titled {
            title: title.into(),
            value: NavValue::Link(path.into()),
        }
    }

    /// `{title: [children...]}` entry.
    #[must_use]
    pub fn section(title: impl Into<String>, children: Vec<NavEntry>) -> Self {
        Self::Titled {
            title: title.into(),
            value: NavValue::Children(children),
        }
    }

    /// Title of a titled entry.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Titled { title, .. } => Some(title),
            Self::Bare(_) | Self::Other(_) => None,
        }
    }

    /// Classify a raw YAML value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Bare(s),
            Value::Mapping(map) => Self::from_mapping(map),
            other => Self::Other(other),
        }
    }

    fn from_mapping(map: Mapping) -> Self {
        if map.len() != 1 {
            return Self::Other(Value::Mapping(map));
        }
        let mut entries = map.into_iter();
        match entries.next() {
            Some((Value::String(title), value)) => Self::Titled {
                title,
                value: NavValue::from_value(value),
            },
            Some((key, value)) => {
                let mut map = Mapping::new();
                map.insert(key, value);
                Self::Other(Value::Mapping(map))
            }
            None => Self::Other(Value::Mapping(Mapping::new())),
        }
    }

    /// Convert back to the YAML shape this entry was read from.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bare(s) => Value::String(s.clone()),
            Self::Titled { title, value } => {
                let mut map = Mapping::new();
                map.insert(Value::String(title.clone()), value.to_value());
                Value::Mapping(map)
            }
            Self::Other(value) => value.clone(),
        }
    }
}

impl NavValue {
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Link(s),
            Value::Sequence(items) => {
                Self::Children(items.into_iter().map(NavEntry::from_value).collect())
            }
            other => Self::Other(other),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Link(path) => Value::String(path.clone()),
            Self::Children(children) => {
                Value::Sequence(children.iter().map(NavEntry::to_value).collect())
            }
            Self::Other(value) => value.clone(),
        }
    }
}

impl From<Value> for NavEntry {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl Serialize for NavEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NavEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
