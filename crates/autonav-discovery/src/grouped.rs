//! C/C++ file discovery.
//!
//! Files are named relative to the source root itself. With grouping on, a
//! header and its implementation (`device.h`, `device.c`) share one page.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use autonav_config::GroupedOptions;
use serde_yaml::{Mapping, Value};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::DiscoveryError;
use crate::filter::UnitFilter;
use crate::strategy::{DiscoveryStrategy, Units};
use crate::unit::{SourceUnit, doc_path};

const DEFAULT_HANDLER: &str = "c";

/// Discovers C/C++ sources and headers.
#[derive(Clone, Debug)]
pub struct GroupedFileDiscovery {
    extensions: Vec<String>,
    group: bool,
    filter: UnitFilter,
    show_full: bool,
}

impl GroupedFileDiscovery {
    /// Create a grouped strategy.
    #[must_use]
    pub fn new(options: &GroupedOptions, filter: UnitFilter, show_full: bool) -> Self {
        Self {
            extensions: options.extensions(),
            group: options.group_by_basename,
            filter,
            show_full,
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    fn collect(&self, root: &Path, docs_root: &str) -> Result<Vec<SourceUnit>, DiscoveryError> {
        let mut files = BTreeSet::new();
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if entry.file_type().is_file() && self.matches_extension(entry.path()) {
                files.insert(entry.into_path());
            }
        }

        let mut units: Vec<SourceUnit> = Vec::new();
        let mut by_parts: HashMap<Vec<String>, usize> = HashMap::new();
        for file in files {
            let relative = file.strip_prefix(root).unwrap_or(&file);
            let mut parts: Vec<String> = relative
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let name = if self.group {
                file.file_stem()
            } else {
                file.file_name()
            };
            let Some(name) = name.map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            parts.push(if self.group { name } else { name.replace('.', "_") });

            if let Some(&index) = by_parts.get(&parts) {
                units[index].sources.push(file);
                continue;
            }

            let Some((name, dirs)) = parts.split_last() else {
                continue;
            };
            let doc_path = doc_path(docs_root, dirs, &format!("{name}.md"));
            by_parts.insert(parts.clone(), units.len());
            units.push(SourceUnit {
                parts,
                doc_path,
                sources: vec![file],
            });
        }

        units.retain(|unit| {
            let allowed = self.filter.allows(&unit.parts);
            if !allowed {
                debug!(unit = %unit.parts.join("/"), "Skipping excluded file");
            }
            allowed
        });
        Ok(units)
    }
}

impl DiscoveryStrategy for GroupedFileDiscovery {
    fn discover(&self, root: &Path, docs_root: &str) -> Units {
        match self.collect(root, docs_root) {
            Ok(units) => Box::new(units.into_iter().map(Ok)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn make_content(&self, unit: &SourceUnit, options: &Mapping) -> Result<String, DiscoveryError> {
        let handler = options
            .get("handler")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_HANDLER);
        let heading = if self.group {
            unit.parts.join(".")
        } else {
            unit.parts.join("/")
        };

        let blocks: String = unit
            .sources
            .iter()
            .map(|source| format!("\n::: {}\n    handler: {handler}\n", source.display()))
            .collect();
        Ok(format!(
            "---\ntitle: {}\n---\n\n# {heading}\n{blocks}",
            self.display_title(&unit.parts, self.show_full)
        ))
    }

    fn display_title(&self, parts: &[String], show_full: bool) -> String {
        if show_full {
            parts.join("/")
        } else {
            parts.last().cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in ["arv.c", "arv.h", "device.c", "device.h", "notes.txt", "hal/gpio.h"] {
            let path = temp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        temp
    }

    fn strategy(options: &GroupedOptions) -> GroupedFileDiscovery {
        GroupedFileDiscovery::new(options, UnitFilter::default(), false)
    }

    fn discover(strategy: &GroupedFileDiscovery, root: &Path) -> Vec<SourceUnit> {
        strategy
            .discover(root, "reference")
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_grouped_by_basename() {
        let temp = project();
        let root = temp.path();

        let units = discover(&strategy(&GroupedOptions::default()), root);

        let pages: Vec<_> = units.iter().map(|u| u.doc_path.as_str()).collect();
        assert_eq!(
            pages,
            vec!["reference/arv.md", "reference/device.md", "reference/hal/gpio.md"]
        );
        assert_eq!(units[0].sources, vec![root.join("arv.c"), root.join("arv.h")]);
        assert_eq!(units[2].parts, vec!["hal", "gpio"]);
    }

    #[test]
    fn test_ungrouped_uses_file_names() {
        let temp = project();
        let options = GroupedOptions {
            group_by_basename: false,
            ..GroupedOptions::default()
        };

        let units = discover(&strategy(&options), temp.path());

        let names: Vec<_> = units.iter().map(SourceUnit::name).collect();
        assert_eq!(names, vec!["arv_c", "arv_h", "device_c", "device_h", "gpio_h"]);
        assert_eq!(units[0].doc_path, "reference/arv_c.md");
        assert_eq!(units[0].sources.len(), 1);
    }

    #[test]
    fn test_headers_only() {
        let temp = project();
        let options = GroupedOptions {
            include_source: false,
            ..GroupedOptions::default()
        };

        let units = discover(&strategy(&options), temp.path());

        assert!(units.iter().all(|u| u.sources.iter().all(|s| s.extension().unwrap() == "h")));
        assert_eq!(units.len(), 3);
    }

    #[test]
    fn test_exclusions_apply_to_units() {
        let temp = project();
        let filter = UnitFilter::new(false, autonav_config::parse_exclusions(&["hal".to_owned()]));
        let strategy = GroupedFileDiscovery::new(&GroupedOptions::default(), filter, false);

        let units = discover(&strategy, temp.path());

        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_missing_root_yields_error() {
        let temp = TempDir::new().unwrap();

        let mut units = strategy(&GroupedOptions::default()).discover(&temp.path().join("nope"), "");

        assert!(matches!(units.next(), Some(Err(DiscoveryError::Walk(_)))));
        assert!(units.next().is_none());
    }

    #[test]
    fn test_make_content() {
        let unit = SourceUnit {
            parts: vec!["hal".to_owned(), "gpio".to_owned()],
            doc_path: "reference/hal/gpio.md".to_owned(),
            sources: vec![PathBuf::from("/p/hal/gpio.c"), PathBuf::from("/p/hal/gpio.h")],
        };

        let content = strategy(&GroupedOptions::default())
            .make_content(&unit, &Mapping::new())
            .unwrap();

        assert_eq!(
            content,
            "---\ntitle: gpio\n---\n\n# hal.gpio\n\n::: /p/hal/gpio.c\n    handler: c\n\n::: /p/hal/gpio.h\n    handler: c\n"
        );
    }

    #[test]
    fn test_make_content_custom_handler() {
        let unit = SourceUnit {
            parts: vec!["arv".to_owned()],
            doc_path: "reference/arv.md".to_owned(),
            sources: vec![PathBuf::from("/p/arv.cpp")],
        };
        let options: Mapping = serde_yaml::from_str("handler: cpp").unwrap();

        let content = strategy(&GroupedOptions::default())
            .make_content(&unit, &options)
            .unwrap();

        assert!(content.ends_with("::: /p/arv.cpp\n    handler: cpp\n"));
    }

    #[test]
    fn test_display_title() {
        let strategy = strategy(&GroupedOptions::default());
        let parts = vec!["hal".to_owned(), "gpio".to_owned()];

        assert_eq!(strategy.display_title(&parts, true), "hal/gpio");
        assert_eq!(strategy.display_title(&parts, false), "gpio");
    }
}
