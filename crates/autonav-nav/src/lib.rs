//! Navigation building for autonav.
//!
//! Provides:
//! - [`NavEntry`]: typed view of a site navigation list (as found in `mkdocs.yml`)
//! - [`NavTree`]: trie that turns discovered units into nested entries
//! - [`merge_nav`]: places the generated section into an existing navigation
//!
//! # Example
//!
//! ```
//! use autonav_nav::{MergeOutcome, NavEntry, NavTree, merge_nav};
//!
//! let mut tree = NavTree::new("");
//! tree.insert(&["pkg"], "reference/pkg/index.md", |p: &[&str]| p[p.len() - 1].to_owned());
//!
//! let mut nav = vec![NavEntry::page("index.md"), NavEntry::page("API Reference")];
//! let outcome = merge_nav(&mut nav, "API Reference", "reference", tree.to_entries());
//!
//! assert_eq!(outcome, MergeOutcome::ReplacedTitle { position: 1 });
//! ```

mod entry;
mod merge;
mod tree;

pub use entry::{NavEntry, NavValue};
pub use merge::{MergeOutcome, merge_nav};
pub use tree::NavTree;
