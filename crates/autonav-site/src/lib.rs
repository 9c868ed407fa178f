//! Page generation and navigation pipeline for autonav.
//!
//! [`AutoNavPlugin`] runs discovery for every configured source, registers the
//! synthesized pages with a [`FileCollection`] and merges the generated API
//! section into the site navigation.

mod files;
mod plugin;

pub use files::{FileCollection, GeneratedFiles, VirtualDocument};
pub use plugin::{AutoNavPlugin, BuildReport, SiteError};
