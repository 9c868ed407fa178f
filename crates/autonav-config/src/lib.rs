//! Configuration management for autonav.
//!
//! Parses the site configuration (`mkdocs.yml`) with serde, extracts the
//! `api-autonav` plugin section and provides auto-discovery of the config
//! file in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

mod exclusion;
mod module_options;
mod plugin;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::info;

use autonav_nav::NavEntry;

pub use exclusion::{Exclusion, REGEX_PREFIX, parse_exclusions};
pub use module_options::{ModuleOptions, SourceOptions};
pub use plugin::{
    DEFAULT_API_ROOT, DEFAULT_NAV_ITEM_PREFIX, DEFAULT_SECTION_TITLE, DiscoveryKind,
    GroupedOptions, NamespacePolicy, PluginConfig, ResolvedSource, SourceConfig, StrategyConfig,
};

/// Name of the plugin entry in the site config `plugins` list.
pub const PLUGIN_NAME: &str = "api-autonav";

/// Renderer plugin that expands the generated directives.
pub const RENDERER_PLUGIN: &str = "mkdocstrings";

/// Configuration filenames to search for, in order.
const CONFIG_FILENAMES: [&str; 2] = ["mkdocs.yml", "mkdocs.yaml"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the output root for generated pages.
    pub api_root_uri: Option<String>,
    /// Override the navigation section title.
    pub nav_section_title: Option<String>,
    /// Override full-namespace navigation titles.
    pub show_full_namespace: Option<bool>,
    /// Override strict mode.
    pub strict: Option<bool>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Plugin section missing from the site config.
    #[error("Plugin 'api-autonav' is not listed in the site config plugins")]
    PluginMissing,
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// The parts of the site config autonav reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name.
    pub site_name: String,
    /// Existing navigation, if any.
    pub nav: Option<Vec<NavEntry>>,
    /// Treat warnings as errors.
    pub strict: bool,
    /// Plugin list (strings, single-key mappings, or a mapping).
    plugins: Value,
}

impl SiteConfig {
    /// Names of all configured plugins, in order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<String> {
        plugin_entries(&self.plugins)
            .map(|(name, _)| name.to_owned())
            .collect()
    }

    /// Raw options of a plugin (`Null` when listed without options).
    #[must_use]
    pub fn plugin_options(&self, name: &str) -> Option<&Value> {
        plugin_entries(&self.plugins).find_map(|(n, options)| (n == name).then_some(options))
    }

    /// Add the renderer plugin when it is missing.
    ///
    /// Returns `true` when the plugin list was changed.
    pub fn ensure_renderer_plugin(&mut self) -> bool {
        if self.plugin_names().iter().any(|name| name == RENDERER_PLUGIN) {
            return false;
        }
        match &mut self.plugins {
            Value::Sequence(list) => list.push(Value::String(RENDERER_PLUGIN.to_owned())),
            Value::Mapping(map) => {
                map.insert(Value::String(RENDERER_PLUGIN.to_owned()), Value::Null);
            }
            other => *other = Value::Sequence(vec![Value::String(RENDERER_PLUGIN.to_owned())]),
        }
        info!("'{RENDERER_PLUGIN}' wasn't found in the plugins list. It has been added automatically.");
        true
    }

    /// Parse the `api-autonav` plugin section.
    pub fn plugin_config(&self) -> Result<PluginConfig, ConfigError> {
        let options = self
            .plugin_options(PLUGIN_NAME)
            .ok_or(ConfigError::PluginMissing)?;
        let options = match options {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other.clone(),
        };
        Ok(serde_yaml::from_value(options)?)
    }
}

/// Iterate `(name, options)` over either plugin list form.
fn plugin_entries(plugins: &Value) -> Box<dyn Iterator<Item = (&str, &Value)> + '_> {
    static NULL: Value = Value::Null;
    match plugins {
        Value::Sequence(list) => Box::new(list.iter().filter_map(|item| match item {
            Value::String(name) => Some((name.as_str(), &NULL)),
            Value::Mapping(map) if map.len() == 1 => map
                .iter()
                .next()
                .and_then(|(name, options)| Some((name.as_str()?, options))),
            _ => None,
        })),
        Value::Mapping(map) => Box::new(
            map.iter()
                .filter_map(|(name, options)| Some((name.as_str()?, options))),
        ),
        _ => Box::new(std::iter::empty()),
    }
}

/// Loaded configuration: the site config plus the resolved plugin section.
#[derive(Debug)]
pub struct Config {
    /// Site config.
    pub site: SiteConfig,
    /// Plugin section.
    pub plugin: PluginConfig,
    /// Directory relative source paths resolve against.
    pub config_dir: PathBuf,
    /// Path to the config file (set when loaded from disk).
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `mkdocs.yml` in the current directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns error if no config file is found, parsing fails, or the plugin
    /// section is missing or invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => Self::discover_config()
                .ok_or_else(|| ConfigError::NotFound(PathBuf::from(CONFIG_FILENAMES[0])))?,
        };

        let content = std::fs::read_to_string(&path)?;
        let config_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let mut config = Self::from_yaml(&content, config_dir)?;
        config.config_path = Some(path);

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.plugin.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str, config_dir: PathBuf) -> Result<Self, ConfigError> {
        let site: SiteConfig = serde_yaml::from_str(content)?;
        let plugin = site.plugin_config()?;
        plugin.validate()?;
        Ok(Self {
            site,
            plugin,
            config_dir,
            config_path: None,
        })
    }

    /// Resolved sources, relative to the config directory.
    pub fn sources(&self) -> Result<Vec<ResolvedSource>, ConfigError> {
        self.plugin.resolve_sources(&self.config_dir)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.api_root_uri {
            self.plugin.api_root_uri.clone_from(root);
        }
        if let Some(title) = &settings.nav_section_title {
            self.plugin.nav_section_title.clone_from(title);
        }
        if let Some(full) = settings.show_full_namespace {
            self.plugin.show_full_namespace = full;
        }
        if let Some(strict) = settings.strict {
            self.site.strict = strict;
        }
    }

    /// Search for a config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            for name in CONFIG_FILENAMES {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
            if !current.pop() {
                return None;
            }
        }
    }
}
