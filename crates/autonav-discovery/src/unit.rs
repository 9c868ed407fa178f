//! Discovered units and their output paths.

use std::path::{Path, PathBuf};

/// A documentable unit found under a source root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    /// Name segments, outermost first (e.g. `["pkg", "sub", "leaf"]`).
    pub parts: Vec<String>,
    /// Path of the virtual page (e.g. `reference/pkg/sub/leaf.md`).
    pub doc_path: String,
    /// Files backing this unit, sorted.
    pub sources: Vec<PathBuf>,
}

impl SourceUnit {
    /// Dot-joined identifier.
    #[must_use]
    pub fn identifier(&self) -> String {
        self.parts.join(".")
    }

    /// Last name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }
}

/// Name segments of `path` relative to `base`.
pub(crate) fn name_parts(path: &Path, base: &Path) -> Vec<String> {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect()
}

/// Join `docs_root`, directory segments and a file name with `/`.
pub(crate) fn doc_path<S: AsRef<str>>(docs_root: &str, dirs: &[S], file: &str) -> String {
    let mut path = docs_root.trim_end_matches('/').to_owned();
    for segment in dirs.iter().map(AsRef::as_ref).chain([file]) {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment);
    }
    path
}
