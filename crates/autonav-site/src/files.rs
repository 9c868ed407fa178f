//! Generated file collection.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path};

use tracing::info;

/// A generated page, borrowed from the collection holding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualDocument<'a> {
    /// Path relative to the docs directory.
    pub path: &'a str,
    /// Markdown content.
    pub content: &'a str,
}

/// Host file collection that generated pages are registered with.
pub trait FileCollection {
    /// Register a generated page, replacing any file already at `path`.
    fn add_generated(&mut self, path: &str, content: String);
}

/// In-memory file collection, ordered by path.
#[derive(Clone, Debug, Default)]
pub struct GeneratedFiles {
    files: BTreeMap<String, String>,
}

impl GeneratedFiles {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of the page at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when no page was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Registered pages, sorted by path.
    pub fn documents(&self) -> impl Iterator<Item = VirtualDocument<'_>> {
        self.files.iter().map(|(path, content)| VirtualDocument {
            path: path.as_str(),
            content: content.as_str(),
        })
    }

    /// Write every page below `dir`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error encountered.
    pub fn write_to(&self, dir: &Path) -> io::Result<usize> {
        for document in self.documents() {
            let target = dir.join(document.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, document.content)?;
        }
        Ok(self.files.len())
    }

    /// Replace the `root` subtree of `dir` with the registered pages.
    ///
    /// Everything under `dir/root` is removed first, so pages of units that
    /// no longer exist do not survive a rerun. `root` must be a non-empty
    /// relative path that stays inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unsafe `root`, or the first I/O error.
    pub fn replace_in(&self, dir: &Path, root: &str) -> io::Result<usize> {
        let root = Path::new(root.trim_matches('/'));
        let is_contained = root.components().next().is_some()
            && root.components().all(|c| matches!(c, Component::Normal(_)));
        if !is_contained {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Refusing to clear output root '{}'", root.display()),
            ));
        }

        let target = dir.join(root);
        if target.is_dir() {
            info!("Removing previous pages under {}", target.display());
            fs::remove_dir_all(&target)?;
        }
        self.write_to(dir)
    }
}

impl FileCollection for GeneratedFiles {
    fn add_generated(&mut self, path: &str, content: String) {
        self.files.insert(path.to_owned(), content);
    }
}
