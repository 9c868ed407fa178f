//! The `api-autonav` plugin section.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::exclusion::{Exclusion, parse_exclusions};
use crate::module_options::{ModuleOptions, SourceOptions};
use crate::{ConfigError, require_non_empty};

/// Default title of the generated navigation section.
pub const DEFAULT_SECTION_TITLE: &str = "API Reference";

/// Default output root for generated pages.
pub const DEFAULT_API_ROOT: &str = "reference";

/// Default title prefix: an empty code element the theme renders as a module badge.
pub const DEFAULT_NAV_ITEM_PREFIX: &str =
    r#"<code class="doc-symbol doc-symbol-nav doc-symbol-module"></code>"#;

/// Handling of Python directories that lack an `__init__.py`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespacePolicy {
    /// Abort discovery.
    Raise,
    /// Log a warning and skip the directory.
    #[default]
    Warn,
    /// Skip the directory without a warning.
    Skip,
}

/// Discovery strategy named by a source entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryKind {
    /// Python packages and modules.
    #[default]
    Python,
    /// C/C++ sources and headers.
    C,
    /// Pick automatically (currently Python).
    Auto,
}

/// Plugin configuration as written in the site config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Python package roots (legacy form of `sources`).
    pub modules: Vec<String>,
    /// Source roots with an explicit discovery strategy.
    pub sources: Vec<SourceConfig>,
    /// Renderer option overrides keyed by identifier regex.
    pub module_options: Mapping,
    /// Title of the generated navigation section.
    pub nav_section_title: String,
    /// Output root for generated pages.
    pub api_root_uri: String,
    /// Prefix prepended to every generated navigation title.
    pub nav_item_prefix: String,
    /// Skip units whose name starts with an underscore.
    pub exclude_private: bool,
    /// Handling of implicit namespace packages.
    pub on_implicit_namespace_package: NamespacePolicy,
    /// Literal or `re:` exclusions.
    pub exclude: Vec<String>,
    /// Use full dotted names as navigation titles.
    pub show_full_namespace: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            sources: Vec::new(),
            module_options: Mapping::new(),
            nav_section_title: DEFAULT_SECTION_TITLE.to_owned(),
            api_root_uri: DEFAULT_API_ROOT.to_owned(),
            nav_item_prefix: DEFAULT_NAV_ITEM_PREFIX.to_owned(),
            exclude_private: true,
            on_implicit_namespace_package: NamespacePolicy::Warn,
            exclude: Vec::new(),
            show_full_namespace: false,
        }
    }
}

/// One `sources` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Root directory, relative to the site config.
    pub path: String,
    /// Discovery strategy.
    #[serde(default)]
    pub discovery: DiscoveryKind,
    /// Strategy options.
    #[serde(default)]
    pub options: Mapping,
    /// Renderer options: regex-keyed overrides for Python sources, a plain
    /// mapping (e.g. `handler`) for C sources.
    #[serde(default)]
    pub module_options: Mapping,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PythonOptionsRaw {
    exclude_private: Option<bool>,
    on_implicit_namespace_package: Option<NamespacePolicy>,
}

/// Options of the grouped C/C++ strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupedOptions {
    /// Include header files.
    pub include_headers: bool,
    /// Include source files.
    pub include_source: bool,
    /// One page per basename instead of one per file.
    pub group_by_basename: bool,
    /// Explicit extension list (with leading dot).
    pub file_extensions: Option<Vec<String>>,
}

impl Default for GroupedOptions {
    fn default() -> Self {
        Self {
            include_headers: true,
            include_source: true,
            group_by_basename: true,
            file_extensions: None,
        }
    }
}

impl GroupedOptions {
    const SOURCE_EXTENSIONS: [&'static str; 4] = [".c", ".cpp", ".cc", ".cxx"];
    const HEADER_EXTENSIONS: [&'static str; 4] = [".h", ".hpp", ".hh", ".hxx"];

    /// Extensions to collect, in priority order.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        if let Some(explicit) = &self.file_extensions {
            return explicit.clone();
        }
        let mut extensions = Vec::new();
        if self.include_source {
            extensions.extend(Self::SOURCE_EXTENSIONS.map(str::to_owned));
        }
        if self.include_headers {
            extensions.extend(Self::HEADER_EXTENSIONS.map(str::to_owned));
        }
        extensions
    }
}

/// Strategy selection with its options resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyConfig {
    /// Python package discovery.
    Python {
        /// Handling of implicit namespace packages.
        on_implicit_namespace_package: NamespacePolicy,
    },
    /// C/C++ file discovery.
    Grouped(GroupedOptions),
}

/// A source root ready for discovery.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// Absolute (or config-relative) root path.
    pub path: PathBuf,
    /// Strategy and its options.
    pub strategy: StrategyConfig,
    /// Skip units whose name starts with an underscore.
    pub exclude_private: bool,
    /// Renderer options this source adds on top of the plugin-level ones.
    pub module_options: SourceOptions,
}

impl PluginConfig {
    /// Validate values that serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modules.is_empty() && self.sources.is_empty() {
            return Err(ConfigError::Validation(
                "api-autonav requires at least one entry in `modules` or `sources`".to_owned(),
            ));
        }
        require_non_empty(&self.nav_section_title, "nav_section_title")?;
        require_non_empty(self.api_root_uri.trim_end_matches('/'), "api_root_uri")?;
        for (index, source) in self.sources.iter().enumerate() {
            require_non_empty(&source.path, &format!("sources[{index}].path"))?;
        }
        Ok(())
    }

    /// Build the list of sources to discover.
    ///
    /// Legacy `modules` entries come first as Python sources using the
    /// plugin-level options, followed by explicit `sources`. Relative paths
    /// are resolved against `base`.
    pub fn resolve_sources(&self, base: &Path) -> Result<Vec<ResolvedSource>, ConfigError> {
        let legacy = self.modules.iter().map(|module| ResolvedSource {
            path: base.join(module),
            strategy: StrategyConfig::Python {
                on_implicit_namespace_package: self.on_implicit_namespace_package,
            },
            exclude_private: self.exclude_private,
            module_options: SourceOptions::default(),
        });

        let mut sources: Vec<_> = legacy.collect();
        for (index, source) in self.sources.iter().enumerate() {
            sources.push(self.resolve_source(index, source, base)?);
        }
        Ok(sources)
    }

    fn resolve_source(
        &self,
        index: usize,
        source: &SourceConfig,
        base: &Path,
    ) -> Result<ResolvedSource, ConfigError> {
        let options = Value::Mapping(source.options.clone());
        let invalid = |e: serde_yaml::Error| {
            ConfigError::Validation(format!("sources[{index}].options: {e}"))
        };

        let (strategy, exclude_private, module_options) = match source.discovery {
            DiscoveryKind::Python | DiscoveryKind::Auto => {
                let raw: PythonOptionsRaw = serde_yaml::from_value(options).map_err(invalid)?;
                let strategy = StrategyConfig::Python {
                    on_implicit_namespace_package: raw
                        .on_implicit_namespace_package
                        .unwrap_or(self.on_implicit_namespace_package),
                };
                (
                    strategy,
                    raw.exclude_private.unwrap_or(self.exclude_private),
                    SourceOptions::Patterns(ModuleOptions::from_mapping(&source.module_options)),
                )
            }
            DiscoveryKind::C => {
                let grouped: GroupedOptions = serde_yaml::from_value(options).map_err(invalid)?;
                (
                    StrategyConfig::Grouped(grouped),
                    self.exclude_private,
                    SourceOptions::Flat(source.module_options.clone()),
                )
            }
        };

        Ok(ResolvedSource {
            path: base.join(&source.path),
            strategy,
            exclude_private,
            module_options,
        })
    }

    /// Compiled exclusion rules.
    #[must_use]
    pub fn exclusions(&self) -> Vec<Exclusion> {
        parse_exclusions(&self.exclude)
    }

    /// Compiled `module_options` rules.
    #[must_use]
    pub fn module_option_rules(&self) -> ModuleOptions {
        ModuleOptions::from_mapping(&self.module_options)
    }
}
