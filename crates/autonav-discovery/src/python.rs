//! Python package discovery.
//!
//! Modules are named relative to the parent of the source root, so a root at
//! `src/my_library` yields `my_library`, `my_library.submod` and so on.
//! A package's `__init__.py` becomes its `index.md`; a module literally named
//! `index.py` becomes `index_py.md` so it cannot collide with it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use autonav_config::NamespacePolicy;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::DiscoveryError;
use crate::filter::UnitFilter;
use crate::strategy::{DiscoveryStrategy, Units};
use crate::unit::{SourceUnit, doc_path, name_parts};

const PACKAGE_MARKER: &str = "__init__.py";
const PACKAGE_STEM: &str = "__init__";
const EXTENSION: &str = "py";

/// Discovers Python packages and modules.
#[derive(Clone, Debug)]
pub struct PythonDiscovery {
    policy: NamespacePolicy,
    filter: UnitFilter,
    show_full: bool,
}

impl PythonDiscovery {
    /// Create a Python strategy.
    #[must_use]
    pub fn new(policy: NamespacePolicy, filter: UnitFilter, show_full: bool) -> Self {
        Self {
            policy,
            filter,
            show_full,
        }
    }
}

impl DiscoveryStrategy for PythonDiscovery {
    fn discover(&self, root: &Path, docs_root: &str) -> Units {
        Box::new(PythonUnits::new(self.clone(), root, docs_root))
    }

    fn make_content(&self, unit: &SourceUnit, options: &Mapping) -> Result<String, DiscoveryError> {
        let identifier = unit.identifier();
        let title = self.display_title(&unit.parts, self.show_full);

        let mut resolved: BTreeMap<String, Value> = BTreeMap::new();
        resolved.insert("heading_level".to_owned(), Value::from(1));
        for (key, value) in options {
            resolved.insert(key_string(key), value.clone());
        }

        let heading = if below_top_level(&resolved) {
            format!("# {identifier}")
        } else {
            resolved
                .entry("show_root_heading".to_owned())
                .or_insert(Value::Bool(true));
            String::new()
        };

        let block = serde_yaml::to_string(&BTreeMap::from([("options", resolved)]))?;
        Ok(format!(
            "---\ntitle: {title}\n---\n{heading}\n\n::: {identifier}\n{}",
            indent(&block, "    ")
        ))
    }

    fn display_title(&self, parts: &[String], show_full: bool) -> String {
        if show_full {
            parts.join(".")
        } else {
            parts.last().cloned().unwrap_or_default()
        }
    }
}

/// Lazy walk over a Python source root.
struct PythonUnits {
    strategy: PythonDiscovery,
    walker: walkdir::IntoIter,
    base: PathBuf,
    docs_root: String,
    done: bool,
}

impl PythonUnits {
    fn new(strategy: PythonDiscovery, root: &Path, docs_root: &str) -> Self {
        Self {
            strategy,
            walker: WalkDir::new(root).sort_by_file_name().into_iter(),
            base: root.parent().unwrap_or(root).to_path_buf(),
            docs_root: docs_root.to_owned(),
            done: false,
        }
    }

    /// Decide whether to descend into `dir`.
    fn enter_dir(&self, dir: &Path) -> Result<bool, DiscoveryError> {
        let parts = name_parts(dir, &self.base);
        if !self.strategy.filter.allows(&parts) {
            debug!(package = %parts.join("."), "Skipping excluded package");
            return Ok(false);
        }
        if !is_implicit_namespace(dir)? {
            return Ok(true);
        }
        match self.strategy.policy {
            NamespacePolicy::Raise => Err(DiscoveryError::ImplicitNamespace(dir.to_path_buf())),
            NamespacePolicy::Warn => {
                warn!(
                    "Skipping implicit namespace package (without an __init__.py file) at {}. \
                     Set 'on_implicit_namespace_package' to 'skip' to omit it without warning.",
                    dir.display()
                );
                Ok(false)
            }
            NamespacePolicy::Skip => {
                info!(
                    "Skipping implicit namespace package (without an __init__.py file) at {}",
                    dir.display()
                );
                Ok(false)
            }
        }
    }

    fn unit_for(&self, file: &Path) -> Option<SourceUnit> {
        let mut parts = name_parts(file, &self.base);
        let stem = file.file_stem()?.to_string_lossy().into_owned();
        *parts.last_mut()? = stem;

        let is_package = parts.last().is_some_and(|name| name == PACKAGE_STEM);
        if is_package {
            parts.pop();
        }
        if parts.is_empty() || !self.strategy.filter.allows(&parts) {
            debug!(module = %parts.join("."), "Skipping excluded module");
            return None;
        }

        let doc_path = if is_package {
            doc_path(&self.docs_root, &parts, "index.md")
        } else {
            let (name, dirs) = parts.split_last()?;
            let file_name = if name == "index" {
                "index_py.md".to_owned()
            } else {
                format!("{name}.md")
            };
            doc_path(&self.docs_root, dirs, &file_name)
        };

        Some(SourceUnit {
            parts,
            doc_path,
            sources: vec![file.to_path_buf()],
        })
    }
}

impl Iterator for PythonUnits {
    type Item = Result<SourceUnit, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };

            if entry.file_type().is_dir() {
                match self.enter_dir(entry.path()) {
                    Ok(true) => {}
                    Ok(false) => self.walker.skip_current_dir(),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
                continue;
            }

            if !is_python_file(entry.path()) {
                continue;
            }
            if let Some(unit) = self.unit_for(entry.path()) {
                return Some(Ok(unit));
            }
        }
    }
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == EXTENSION)
}

/// A directory with Python files directly inside but no `__init__.py`.
fn is_implicit_namespace(dir: &Path) -> Result<bool, DiscoveryError> {
    if dir.join(PACKAGE_MARKER).is_file() {
        return Ok(false);
    }
    let io_error = |source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && is_python_file(&path) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether the effective `heading_level` is deeper than 1.
///
/// Integral, float (`2.0`) and numeric string values count; the level is
/// truncated toward zero, so `1.5` is still level 1.
fn below_top_level(options: &BTreeMap<String, Value>) -> bool {
    match options.get("heading_level") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(level) => level > 1,
            None => n.as_f64().is_some_and(|level| level >= 2.0),
        },
        Some(Value::String(s)) => s.trim().parse::<i64>().is_ok_and(|level| level > 1),
        _ => false,
    }
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

/// Prefix every non-blank line of `text` with `prefix`.
fn indent(text: &str, prefix: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_owned()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use autonav_config::parse_exclusions;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    /// `src/my_library` with a public subpackage and a private one.
    fn library() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        touch(&root, "my_library/__init__.py");
        touch(&root, "my_library/submod/__init__.py");
        touch(&root, "my_library/submod/sub_submod.py");
        touch(&root, "my_library/_private_submod/__init__.py");
        touch(&root, "my_library/_private_submod/mod.py");
        temp
    }

    fn strategy(policy: NamespacePolicy, exclude_private: bool) -> PythonDiscovery {
        PythonDiscovery::new(policy, UnitFilter::new(exclude_private, Vec::new()), false)
    }

    fn collect(strategy: &PythonDiscovery, root: &Path) -> Vec<(String, String)> {
        strategy
            .discover(root, "reference")
            .map(|unit| {
                let unit = unit.unwrap();
                (unit.identifier(), unit.doc_path)
            })
            .collect()
    }

    fn pair(identifier: &str, doc_path: &str) -> (String, String) {
        (identifier.to_owned(), doc_path.to_owned())
    }

    #[test]
    fn test_discover_package_tree() {
        let temp = library();
        let root = temp.path().join("src/my_library");

        let units = collect(&strategy(NamespacePolicy::Warn, false), &root);

        assert_eq!(
            units,
            vec![
                pair("my_library", "reference/my_library/index.md"),
                pair(
                    "my_library._private_submod",
                    "reference/my_library/_private_submod/index.md"
                ),
                pair(
                    "my_library._private_submod.mod",
                    "reference/my_library/_private_submod/mod.md"
                ),
                pair("my_library.submod", "reference/my_library/submod/index.md"),
                pair(
                    "my_library.submod.sub_submod",
                    "reference/my_library/submod/sub_submod.md"
                ),
            ]
        );
    }

    #[test]
    fn test_discover_excludes_private() {
        let temp = library();
        let root = temp.path().join("src/my_library");

        let units = collect(&strategy(NamespacePolicy::Warn, true), &root);

        let names: Vec<_> = units.into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["my_library", "my_library.submod", "my_library.submod.sub_submod"]
        );
    }

    #[test]
    fn test_discover_applies_exclusions_to_descendants() {
        let temp = library();
        let root = temp.path().join("src/my_library");
        let filter = UnitFilter::new(true, parse_exclusions(&["my_library.submod".to_owned()]));
        let strategy = PythonDiscovery::new(NamespacePolicy::Warn, filter, false);

        let units = collect(&strategy, &root);

        assert_eq!(units, vec![pair("my_library", "reference/my_library/index.md")]);
    }

    #[test]
    fn test_index_module_renamed() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/__init__.py");
        touch(temp.path(), "pkg/index.py");

        let units = collect(&strategy(NamespacePolicy::Warn, false), &temp.path().join("pkg"));

        assert_eq!(
            units,
            vec![
                pair("pkg", "reference/pkg/index.md"),
                pair("pkg.index", "reference/pkg/index_py.md"),
            ]
        );
    }

    #[test]
    fn test_implicit_namespace_skipped_under_warn_and_skip() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/__init__.py");
        touch(temp.path(), "pkg/nsp/mod.py");
        touch(temp.path(), "pkg/other.py");
        let root = temp.path().join("pkg");

        for policy in [NamespacePolicy::Warn, NamespacePolicy::Skip] {
            let names: Vec<_> = collect(&strategy(policy, false), &root)
                .into_iter()
                .map(|(name, _)| name)
                .collect();
            assert_eq!(names, vec!["pkg", "pkg.other"]);
        }
    }

    #[test]
    fn test_implicit_namespace_raises() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/__init__.py");
        touch(temp.path(), "pkg/nsp/mod.py");
        let root = temp.path().join("pkg");

        let results: Vec<_> = strategy(NamespacePolicy::Raise, false)
            .discover(&root, "reference")
            .collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().identifier(), "pkg");
        assert!(matches!(
            &results[1],
            Err(DiscoveryError::ImplicitNamespace(path)) if path.ends_with("pkg/nsp")
        ));
    }

    #[test]
    fn test_excluded_namespace_does_not_raise() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/__init__.py");
        touch(temp.path(), "pkg/_nsp/mod.py");

        let units = collect(&strategy(NamespacePolicy::Raise, true), &temp.path().join("pkg"));

        assert_eq!(units, vec![pair("pkg", "reference/pkg/index.md")]);
    }

    #[test]
    fn test_directories_without_python_are_transparent() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/__init__.py");
        touch(temp.path(), "pkg/data/sub/__init__.py");
        touch(temp.path(), "pkg/data/readme.txt");

        let units = collect(&strategy(NamespacePolicy::Raise, false), &temp.path().join("pkg"));

        assert_eq!(
            units,
            vec![
                pair("pkg", "reference/pkg/index.md"),
                pair("pkg.data.sub", "reference/pkg/data/sub/index.md"),
            ]
        );
    }

    #[test]
    fn test_missing_root_yields_walk_error() {
        let temp = TempDir::new().unwrap();

        let mut units = strategy(NamespacePolicy::Warn, false)
            .discover(&temp.path().join("absent"), "reference");

        assert!(matches!(units.next(), Some(Err(DiscoveryError::Walk(_)))));
        assert!(units.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_yields_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        touch(temp.path(), "pkg/__init__.py");
        let locked = temp.path().join("pkg/locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Privileged users bypass directory permissions.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let results: Vec<_> = strategy(NamespacePolicy::Warn, false)
            .discover(&temp.path().join("pkg"), "reference")
            .collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().identifier(), "pkg");
        assert!(matches!(
            &results[1],
            Err(DiscoveryError::Io { path, .. }) if path == &locked
        ));
    }

    #[test]
    fn test_single_module_root() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "tool.py");

        let units = collect(&strategy(NamespacePolicy::Warn, false), &temp.path().join("tool.py"));

        assert_eq!(units, vec![pair("tool", "reference/tool.md")]);
    }

    fn unit(identifier: &str) -> SourceUnit {
        SourceUnit {
            parts: identifier.split('.').map(str::to_owned).collect(),
            doc_path: String::new(),
            sources: Vec::new(),
        }
    }

    #[test]
    fn test_make_content_defaults() {
        let content = strategy(NamespacePolicy::Warn, false)
            .make_content(&unit("pkg.sub"), &Mapping::new())
            .unwrap();

        assert_eq!(
            content,
            "---\ntitle: sub\n---\n\n\n::: pkg.sub\n    options:\n      heading_level: 1\n      show_root_heading: true\n"
        );
    }

    #[test]
    fn test_make_content_with_heading_level() {
        let options: Mapping = serde_yaml::from_str("heading_level: 2\nshow_source: false").unwrap();

        let content = strategy(NamespacePolicy::Warn, false)
            .make_content(&unit("pkg.sub"), &options)
            .unwrap();

        assert_eq!(
            content,
            "---\ntitle: sub\n---\n# pkg.sub\n\n::: pkg.sub\n    options:\n      heading_level: 2\n      show_source: false\n"
        );
    }

    #[test]
    fn test_make_content_float_heading_level() {
        let strategy = strategy(NamespacePolicy::Warn, false);
        let deep: Mapping = serde_yaml::from_str("heading_level: 2.0").unwrap();
        let top: Mapping = serde_yaml::from_str("heading_level: 1.5").unwrap();

        let deep = strategy.make_content(&unit("pkg.sub"), &deep).unwrap();
        let top = strategy.make_content(&unit("pkg.sub"), &top).unwrap();

        assert!(deep.contains("---\n# pkg.sub\n"));
        assert!(!deep.contains("show_root_heading"));
        assert!(top.contains("      show_root_heading: true\n"));
    }

    #[test]
    fn test_make_content_keeps_explicit_root_heading() {
        let options: Mapping = serde_yaml::from_str("show_root_heading: false").unwrap();

        let content = strategy(NamespacePolicy::Warn, false)
            .make_content(&unit("pkg"), &options)
            .unwrap();

        assert!(content.contains("      show_root_heading: false\n"));
    }

    #[test]
    fn test_make_content_full_namespace_title() {
        let strategy = PythonDiscovery::new(NamespacePolicy::Warn, UnitFilter::default(), true);

        let content = strategy.make_content(&unit("pkg.sub"), &Mapping::new()).unwrap();

        assert!(content.starts_with("---\ntitle: pkg.sub\n---\n"));
    }

    #[test]
    fn test_display_title() {
        let strategy = strategy(NamespacePolicy::Warn, false);
        let parts = vec!["pkg".to_owned(), "sub".to_owned()];

        assert_eq!(strategy.display_title(&parts, false), "sub");
        assert_eq!(strategy.display_title(&parts, true), "pkg.sub");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a:\n\n  b: 1\n", "    "), "    a:\n\n      b: 1\n");
    }
}
