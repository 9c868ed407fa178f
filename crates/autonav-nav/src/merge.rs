//! Placement of the generated section into an existing navigation.
//!
//! The top level of the navigation is scanned once, left to right. The first
//! entry that names the section decides what happens:
//!
//! 1. Bare string equal to the title: replaced by the generated section.
//! 2. `{title: "<path>"}`: replaced when the path points at the API root,
//!    otherwise the navigation is left alone and a conflict is reported.
//! 3. `{title: [...]}`: generated entries are merged into the list.
//!
//! When no entry names the section it is appended at the end.

use tracing::error;

use crate::entry::{NavEntry, NavValue};

/// Which placement rule was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A bare title placeholder was replaced.
    ReplacedTitle {
        /// Index of the replaced entry.
        position: usize,
    },
    /// A `{title: api_root}` link was replaced.
    ReplacedLink {
        /// Index of the replaced entry.
        position: usize,
    },
    /// Generated entries were merged into an existing section list.
    Extended {
        /// Index of the extended entry.
        position: usize,
    },
    /// The section was appended at the end.
    Appended,
    /// The section exists but links somewhere other than the API root.
    Conflict {
        /// Link found in the navigation.
        found: String,
        /// Configured API root.
        expected: String,
    },
}

impl MergeOutcome {
    /// True when the navigation was left untouched because of a conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

enum Placement {
    ReplaceTitle,
    ReplaceLink,
    Extend,
    Conflict(String),
}

/// Merge `generated` (the section's children) into `nav` under `section_title`.
pub fn merge_nav(
    nav: &mut Vec<NavEntry>,
    section_title: &str,
    api_root: &str,
    generated: Vec<NavEntry>,
) -> MergeOutcome {
    let found = nav
        .iter()
        .enumerate()
        .find_map(|(position, entry)| {
            classify(entry, section_title, api_root).map(|placement| (position, placement))
        });

    let Some((position, placement)) = found else {
        nav.push(NavEntry::section(section_title, generated));
        return MergeOutcome::Appended;
    };

    match placement {
        Placement::ReplaceTitle => {
            nav[position] = NavEntry::section(section_title, generated);
            MergeOutcome::ReplacedTitle { position }
        }
        Placement::ReplaceLink => {
            nav[position] = NavEntry::section(section_title, generated);
            MergeOutcome::ReplacedLink { position }
        }
        Placement::Extend => {
            if let NavEntry::Titled {
                value: NavValue::Children(children),
                ..
            } = &mut nav[position]
            {
                merge_children(children, generated);
            }
            MergeOutcome::Extended { position }
        }
        Placement::Conflict(found) => {
            error!(
                "Encountered pre-existing navigation section {section_title:?} with unexpected \
                 value {found:?} (expected {api_root:?}). Skipping..."
            );
            MergeOutcome::Conflict {
                found,
                expected: api_root.to_owned(),
            }
        }
    }
}

/// Decide whether `entry` names the section, and how it would be merged.
fn classify(entry: &NavEntry, section_title: &str, api_root: &str) -> Option<Placement> {
    match entry {
        NavEntry::Bare(title) if title == section_title => Some(Placement::ReplaceTitle),
        NavEntry::Titled { title, value } if title == section_title => match value {
            NavValue::Link(link) if link_matches_root(link, api_root) => Some(Placement::ReplaceLink),
            NavValue::Link(link) => Some(Placement::Conflict(link.clone())),
            NavValue::Children(_) => Some(Placement::Extend),
            NavValue::Other(_) => None,
        },
        _ => None,
    }
}

/// Accept the root with or without one trailing slash.
fn link_matches_root(link: &str, api_root: &str) -> bool {
    let root = api_root.trim_end_matches('/');
    link == root || link.strip_suffix('/') == Some(root)
}

/// Replace same-titled entries in place, append the rest.
fn merge_children(existing: &mut Vec<NavEntry>, generated: Vec<NavEntry>) {
    for entry in generated {
        let slot = match entry.title() {
            Some(title) => existing.iter().position(|e| e.title() == Some(title)),
            None => existing.iter().position(|e| *e == entry),
        };
        match slot {
            Some(index) => existing[index] = entry,
            None => existing.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TITLE: &str = "API Reference";
    const ROOT: &str = "reference";

    fn generated() -> Vec<NavEntry> {
        vec![NavEntry::section(
            "pkg",
            vec![
                NavEntry::page("reference/pkg/index.md"),
                NavEntry::link("sub", "reference/pkg/sub.md"),
            ],
        )]
    }

    fn section() -> NavEntry {
        NavEntry::section(TITLE, generated())
    }

    fn parse(yaml: &str) -> Vec<NavEntry> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_bare_title_replaced_in_place() {
        let mut nav = parse("[Home, API Reference, About]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::ReplacedTitle { position: 1 });
        assert_eq!(
            nav,
            vec![NavEntry::page("Home"), section(), NavEntry::page("About")]
        );
    }

    #[test]
    fn test_no_match_appends_same_section() {
        let mut nav = parse("[Home, About]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(
            nav,
            vec![NavEntry::page("Home"), NavEntry::page("About"), section()]
        );
    }

    #[test]
    fn test_empty_nav_appends() {
        let mut nav = Vec::new();

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(nav, vec![section()]);
    }

    #[test]
    fn test_link_with_trailing_slash_matches_root() {
        let mut nav = parse("[{API Reference: reference/}]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::ReplacedLink { position: 0 });
        assert_eq!(nav, vec![section()]);
    }

    #[test]
    fn test_link_without_trailing_slash_matches_root() {
        let mut nav = parse("[index.md, {API Reference: reference}]");

        let outcome = merge_nav(&mut nav, TITLE, "reference/", generated());

        assert_eq!(outcome, MergeOutcome::ReplacedLink { position: 1 });
        assert_eq!(nav[1], section());
    }

    #[test]
    fn test_link_mismatch_leaves_nav_untouched() {
        let mut nav = parse("[{API Reference: docs/}]");
        let before = nav.clone();

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(
            outcome,
            MergeOutcome::Conflict {
                found: "docs/".to_owned(),
                expected: ROOT.to_owned(),
            }
        );
        assert!(outcome.is_conflict());
        assert_eq!(nav, before);
    }

    #[test]
    fn test_link_with_double_slash_is_conflict() {
        let mut nav = parse("[{API Reference: reference//}]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert!(outcome.is_conflict());
    }

    #[test]
    fn test_list_is_extended() {
        let mut nav = parse("[index.md, {API Reference: [some_file.md]}]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::Extended { position: 1 });
        let mut expected_children = vec![NavEntry::page("some_file.md")];
        expected_children.extend(generated());
        assert_eq!(nav[1], NavEntry::section(TITLE, expected_children));
    }

    #[test]
    fn test_nested_mapping_falls_through_to_append() {
        let mut nav = parse("[{API Reference: {x: y.md}}]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(nav.len(), 2);
        assert_eq!(nav[1], section());
    }

    #[test]
    fn test_first_match_wins() {
        let mut nav = parse("[API Reference, {API Reference: docs/}]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::ReplacedTitle { position: 0 });
        assert_eq!(nav[1], NavEntry::link(TITLE, "docs/"));
    }

    #[test]
    fn test_nested_sections_are_not_searched() {
        let mut nav = parse("[{Docs: [API Reference]}]");

        let outcome = merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(nav[0], NavEntry::section("Docs", vec![NavEntry::page(TITLE)]));
    }

    #[test]
    fn test_merge_is_idempotent_for_every_rule() {
        let cases = [
            "[Home, API Reference, About]",
            "[Home]",
            "[{API Reference: reference/}]",
            "[{API Reference: [some_file.md]}]",
            "[{API Reference: docs/}]",
        ];
        for yaml in cases {
            let mut once = parse(yaml);
            merge_nav(&mut once, TITLE, ROOT, generated());
            let mut twice = once.clone();
            merge_nav(&mut twice, TITLE, ROOT, generated());

            assert_eq!(
                serde_yaml::to_string(&once).unwrap(),
                serde_yaml::to_string(&twice).unwrap(),
                "not idempotent for {yaml}"
            );
        }
    }

    #[test]
    fn test_rerun_replaces_stale_generated_entries() {
        let mut nav = parse("[{API Reference: [{pkg: old.md}, notes.md]}]");

        merge_nav(&mut nav, TITLE, ROOT, generated());

        assert_eq!(
            nav,
            vec![NavEntry::section(
                TITLE,
                vec![generated().remove(0), NavEntry::page("notes.md")]
            )]
        );
    }
}
