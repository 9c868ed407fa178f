//! CLI error types.

use autonav_config::ConfigError;
use autonav_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize navigation: {0}")]
    Nav(#[from] serde_yaml::Error),
}
