//! Discovery strategy trait and construction.

use std::path::Path;

use autonav_config::StrategyConfig;
use serde_yaml::Mapping;

use crate::error::DiscoveryError;
use crate::filter::UnitFilter;
use crate::grouped::GroupedFileDiscovery;
use crate::python::PythonDiscovery;
use crate::unit::SourceUnit;

/// Stream of discovered units.
///
/// Errors are yielded in place; the stream ends after the first one.
pub type Units = Box<dyn Iterator<Item = Result<SourceUnit, DiscoveryError>>>;

/// A way of turning a source root into documentable units and their pages.
pub trait DiscoveryStrategy {
    /// Walk `root` and yield units whose pages live under `docs_root`.
    fn discover(&self, root: &Path, docs_root: &str) -> Units;

    /// Render the virtual Markdown page for `unit`.
    ///
    /// `options` are the renderer options already resolved for the unit.
    fn make_content(&self, unit: &SourceUnit, options: &Mapping) -> Result<String, DiscoveryError>;

    /// Title shown for a navigation node or page with the given name segments.
    fn display_title(&self, parts: &[String], show_full: bool) -> String;
}

/// Build the strategy for a resolved source.
#[must_use]
pub fn create_strategy(
    config: &StrategyConfig,
    filter: UnitFilter,
    show_full_namespace: bool,
) -> Box<dyn DiscoveryStrategy> {
    match config {
        StrategyConfig::Python {
            on_implicit_namespace_package,
        } => Box::new(PythonDiscovery::new(
            *on_implicit_namespace_package,
            filter,
            show_full_namespace,
        )),
        StrategyConfig::Grouped(options) => {
            Box::new(GroupedFileDiscovery::new(options, filter, show_full_namespace))
        }
    }
}
