//! Discovery error types.

use std::path::PathBuf;

/// Error returned while discovering units or rendering their pages.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// A directory without `__init__.py` was found under the `raise` policy.
    #[error(
        "Implicit namespace package (without an __init__.py file) detected at {}.\n\
         This will likely cause a collection error in mkdocstrings. Set \
         'on_implicit_namespace_package' to 'skip' or 'warn' to omit this package \
         from the documentation.",
        .0.display()
    )]
    ImplicitNamespace(PathBuf),
    /// A directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Directory being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The source tree could not be walked.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),
    /// Renderer options could not be serialized.
    #[error("Failed to render options: {0}")]
    Render(#[from] serde_yaml::Error),
}
