//! `autonav generate` command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use autonav_config::{CliSettings, Config};
use autonav_site::{AutoNavPlugin, GeneratedFiles};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// File the merged navigation is written to, inside the output directory.
const NAV_FILENAME: &str = "nav.yml";

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to the site config file (default: auto-discover mkdocs.yml).
    #[arg(short = 'f', long)]
    config_file: Option<PathBuf>,

    /// Output directory for generated pages (default: docs/ next to the config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Fail when the navigation section conflicts with the output root.
    #[arg(long)]
    strict: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Output root for generated pages (overrides config).
    #[arg(long)]
    api_root_uri: Option<String>,

    /// Navigation section title (overrides config).
    #[arg(long)]
    nav_section_title: Option<String>,

    /// Show full dotted names in navigation titles.
    #[arg(long)]
    show_full_namespace: bool,
}

impl GenerateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            api_root_uri: self.api_root_uri.clone(),
            nav_section_title: self.nav_section_title.clone(),
            show_full_namespace: self.show_full_namespace.then_some(true),
            strict: self.strict.then_some(true),
        };
        let mut config = Config::load(self.config_file.as_deref(), Some(&cli_settings))?;

        if AutoNavPlugin::on_config(&mut config.site)? {
            output.warning(
                "'mkdocstrings' is not in the site config plugins list. \
                 The config file is left unchanged; add it there so the generated pages render.",
            );
        }

        let output_dir = self
            .output_dir
            .unwrap_or_else(|| config.config_dir.join("docs"));
        if let Some(path) = &config.config_path {
            output.field("Config", path.display());
        }
        output.field("Output", output_dir.display());

        let plugin = AutoNavPlugin::new(&config)?;
        let mut files = GeneratedFiles::new();
        let report = plugin.on_files(&mut files, config.site.nav.take())?;

        std::fs::create_dir_all(&output_dir)?;
        let written = files.replace_in(&output_dir, &config.plugin.api_root_uri)?;
        let nav_yaml = serde_yaml::to_string(&BTreeMap::from([("nav", &report.nav)]))?;
        std::fs::write(output_dir.join(NAV_FILENAME), nav_yaml)?;

        if report.outcome.is_conflict() {
            output.warning(&format!(
                "Navigation section '{}' was left unchanged because it links elsewhere",
                config.plugin.nav_section_title
            ));
        }
        output.success(&format!(
            "Generated {written} pages and {NAV_FILENAME} in {}",
            output_dir.display()
        ));
        Ok(())
    }
}
