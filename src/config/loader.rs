//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::apply_env_overrides;
use super::sources::{read_config_text_with_sources, ConfigSource};
use super::ProviderConfig;

/// Parsed configuration plus the source it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ProviderConfig,
    pub source: ConfigSource,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<ProviderConfig, ConfigError> {
    Ok(load_config_with_source(path_override)?.config)
}

/// Load configuration and report where it was read from.
pub fn load_config_with_source(path_override: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: ProviderConfig = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    Ok(LoadedConfig { config, source })
}

/// Platform config directory (`$XDG_CONFIG_HOME` or equivalent).
pub(super) fn config_root_dir() -> Option<PathBuf> {
    dirs::config_dir()
}

fn validate(config: &ProviderConfig) -> Result<(), ConfigError> {
    if config.max_tool_rounds == 0 {
        return Err(ConfigError::Invalid(
            "max_tool_rounds must be at least 1".to_string(),
        ));
    }
    if config.image_count == 0 {
        return Err(ConfigError::Invalid(
            "image_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
