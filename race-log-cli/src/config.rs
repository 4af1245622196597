//! Configuration and event file loading

use anyhow::{Context, Result};
use race_log_engine::RaceConfig;
use std::fs;
use std::path::Path;

/// Load the race configuration from a JSON file, or TOML for `.toml` paths
pub fn load_config(path: &Path) -> Result<RaceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let config = if is_toml {
        let config: RaceConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        config
    } else {
        RaceConfig::from_json_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    };

    log::debug!("Configuration loaded from {:?}: {:?}", path, config);
    Ok(config)
}

/// Read the raw event text
pub fn load_events(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read events file: {:?}", path))
}
