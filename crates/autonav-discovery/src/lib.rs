//! Source discovery for autonav.
//!
//! A [`DiscoveryStrategy`] walks one source root and yields [`SourceUnit`]s,
//! each of which becomes one virtual Markdown page holding a `::: identifier`
//! directive for the renderer plugin.
//!
//! ```ignore
//! let strategy = create_strategy(&source.strategy, filter, false);
//! for unit in strategy.discover(&source.path, "reference") {
//!     let unit = unit?;
//!     let page = strategy.make_content(&unit, &options)?;
//! }
//! ```

mod error;
mod filter;
mod grouped;
mod python;
mod strategy;
mod unit;

pub use error::DiscoveryError;
pub use filter::{PRIVATE_MARKER, UnitFilter};
pub use grouped::GroupedFileDiscovery;
pub use python::PythonDiscovery;
pub use strategy::{DiscoveryStrategy, Units, create_strategy};
pub use unit::SourceUnit;
