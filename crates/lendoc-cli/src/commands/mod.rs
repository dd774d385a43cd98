//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod types;

use std::path::Path;

use tracing::debug;

use lendoc_core::models::config::LendocConfig;

/// Load the explicit config file, else the default one if present, then
/// apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LendocConfig> {
    let mut config = match config_path {
        Some(path) => LendocConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config at {}", default_path.display());
                LendocConfig::from_file(&default_path)?
            } else {
                LendocConfig::default()
            }
        }
    };
    config.apply_env();
    Ok(config)
}
