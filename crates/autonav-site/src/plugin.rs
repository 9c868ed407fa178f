//! The autonav build pipeline.
//!
//! For every configured source: discover units, synthesize a page per unit,
//! register it with the host and insert it into the navigation trie. The
//! trie is then merged into the site navigation.

use autonav_config::{
    Config, ConfigError, Exclusion, ModuleOptions, PluginConfig, ResolvedSource, SiteConfig,
};
use autonav_discovery::{DiscoveryError, SourceUnit, UnitFilter, create_strategy};
use autonav_nav::{MergeOutcome, NavEntry, NavTree, merge_nav};
use serde_yaml::Mapping;
use tracing::{debug, info};

use crate::files::FileCollection;

/// Error returned by the build pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A source could not be discovered or rendered.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The renderer plugin had to be added in strict mode.
    #[error("'mkdocstrings' is not listed in the site config plugins (strict mode)")]
    RendererMissing,
    /// The navigation section conflicts with the output root in strict mode.
    #[error(
        "Navigation section '{section}' links to '{found}' instead of '{expected}' (strict mode)"
    )]
    NavConflict {
        /// Configured section title.
        section: String,
        /// Link found in the navigation.
        found: String,
        /// Configured output root.
        expected: String,
    },
}

/// Result of one pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildReport {
    /// Navigation after merging.
    pub nav: Vec<NavEntry>,
    /// Which placement rule fired.
    pub outcome: MergeOutcome,
    /// Generated page paths, in discovery order.
    pub pages: Vec<String>,
}

/// Plugin state resolved from configuration.
#[derive(Debug)]
pub struct AutoNavPlugin {
    config: PluginConfig,
    sources: Vec<ResolvedSource>,
    exclusions: Vec<Exclusion>,
    module_options: ModuleOptions,
    strict: bool,
}

impl AutoNavPlugin {
    /// Resolve sources and compile rules from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a source's options are invalid.
    pub fn new(config: &Config) -> Result<Self, SiteError> {
        Ok(Self {
            sources: config.sources()?,
            exclusions: config.plugin.exclusions(),
            module_options: config.plugin.module_option_rules(),
            strict: config.site.strict,
            config: config.plugin.clone(),
        })
    }

    /// Make sure the renderer plugin is enabled in `site`.
    ///
    /// Returns `true` when it was missing and has been added. Strict mode
    /// turns a missing renderer into an error instead.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::RendererMissing`] in strict mode.
    pub fn on_config(site: &mut SiteConfig) -> Result<bool, SiteError> {
        if !site.ensure_renderer_plugin() {
            return Ok(false);
        }
        if site.strict {
            return Err(SiteError::RendererMissing);
        }
        Ok(true)
    }

    /// Generate pages into `files` and merge the API section into `nav`.
    ///
    /// Each call starts from scratch: nothing is kept between runs.
    ///
    /// # Errors
    ///
    /// Returns error on discovery failure, or on a navigation conflict when
    /// strict mode is enabled.
    pub fn on_files(
        &self,
        files: &mut dyn FileCollection,
        nav: Option<Vec<NavEntry>>,
    ) -> Result<BuildReport, SiteError> {
        let show_full = self.config.show_full_namespace;
        let mut tree = NavTree::new(&self.config.nav_item_prefix);
        let mut pages = Vec::new();

        for source in &self.sources {
            debug!(path = %source.path.display(), "Discovering source");
            let filter = UnitFilter::new(source.exclude_private, self.exclusions.clone());
            let strategy = create_strategy(&source.strategy, filter, show_full);

            for unit in strategy.discover(&source.path, &self.config.api_root_uri) {
                let unit = unit?;
                let options = self.options_for(&unit, source);
                let content = strategy.make_content(&unit, &options)?;

                info!("Writing virtual file: {}", unit.doc_path);
                files.add_generated(&unit.doc_path, content);
                tree.insert(&unit.parts, &unit.doc_path, |parts: &[String]| {
                    strategy.display_title(parts, show_full)
                });
                pages.push(unit.doc_path);
            }
        }

        let mut nav = nav.unwrap_or_default();
        let outcome = merge_nav(
            &mut nav,
            &self.config.nav_section_title,
            &self.config.api_root_uri,
            tree.to_entries(),
        );

        if self.strict
            && let MergeOutcome::Conflict { found, expected } = &outcome
        {
            return Err(SiteError::NavConflict {
                section: self.config.nav_section_title.clone(),
                found: found.clone(),
                expected: expected.clone(),
            });
        }

        Ok(BuildReport {
            nav,
            outcome,
            pages,
        })
    }

    /// Plugin-level pattern options first, then the source's own options.
    fn options_for(&self, unit: &SourceUnit, source: &ResolvedSource) -> Mapping {
        let identifier = unit.identifier();
        let mut options = self.module_options.for_identifier(&identifier);
        for (key, value) in source.module_options.for_identifier(&identifier) {
            options.insert(key, value);
        }
        options
    }
}
