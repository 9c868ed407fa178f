//! Navigation trie built from discovered units.
//!
//! Units arrive as a flat `(name parts, doc path)` sequence. Each pair is
//! inserted along its name segments, so units sharing a prefix collapse into
//! one branch. Children keep insertion order, which is menu order.

use crate::entry::NavEntry;

/// Node of the navigation trie.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct NavNode {
    /// Display title, including the configured prefix.
    title: String,
    /// Page for this node itself (package index, module page).
    doc_path: Option<String>,
    /// Children keyed by name segment, in insertion order.
    children: Vec<(String, NavNode)>,
}

impl NavNode {
    fn child_mut(&mut self, segment: &str, title: impl FnOnce() -> String) -> &mut NavNode {
        let index = match self.children.iter().position(|(name, _)| name == segment) {
            Some(index) => index,
            None => {
                let node = NavNode {
                    title: title(),
                    ..NavNode::default()
                };
                self.children.push((segment.to_owned(), node));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    /// Render as a titled entry.
    ///
    /// A leaf becomes `{title: path}`. A branch becomes `{title: [...]}` with
    /// its own page first (when it has one) followed by its children.
    fn to_entry(&self) -> NavEntry {
        if self.children.is_empty() {
            return NavEntry::link(&self.title, self.doc_path.clone().unwrap_or_default());
        }
        let mut items = Vec::with_capacity(self.children.len() + 1);
        if let Some(path) = &self.doc_path {
            items.push(NavEntry::page(path));
        }
        items.extend(self.children.iter().map(|(_, child)| child.to_entry()));
        NavEntry::section(&self.title, items)
    }
}

/// Trie of generated navigation entries.
#[derive(Clone, Debug, Default)]
pub struct NavTree {
    prefix: String,
    root: NavNode,
}

impl NavTree {
    /// Create an empty tree whose titles all start with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            root: NavNode::default(),
        }
    }

    /// Insert a unit.
    ///
    /// `title` receives the name parts up to each newly created node and
    /// returns its display title (without prefix). Existing nodes keep the
    /// title they were created with.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        parts: &[S],
        doc_path: &str,
        title: impl Fn(&[S]) -> String,
    ) {
        let mut node = &mut self.root;
        for (depth, segment) in parts.iter().enumerate() {
            let prefix = &self.prefix;
            node = node.child_mut(segment.as_ref(), || {
                format!("{prefix}{}", title(&parts[..=depth]))
            });
        }
        node.doc_path = Some(doc_path.to_owned());
    }

    /// True when nothing was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Top-level entries, ready to place under the section title.
    #[must_use]
    pub fn to_entries(&self) -> Vec<NavEntry> {
        self.root
            .children
            .iter()
            .map(|(_, child)| child.to_entry())
            .collect()
    }
}
