//! Config-file source discovery.
//!
//! Source order: explicit path > `./chatwire.toml` > user config dir >
//! built-in defaults.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from an explicit `--config` path.
    Explicit(PathBuf),
    /// Loaded from `./chatwire.toml`.
    Local,
    /// Loaded from the per-user config directory.
    Global(PathBuf),
    /// No file found; defaults were used.
    BuiltInDefaults,
}

impl ConfigSource {
    /// File that should receive saved settings for this source.
    pub fn write_path(&self, config_root: Option<PathBuf>) -> Option<PathBuf> {
        match self {
            Self::Explicit(path) | Self::Global(path) => Some(path.clone()),
            Self::Local => Some(PathBuf::from(CONFIG_FILE_NAME)),
            Self::BuiltInDefaults => global_config_path(config_root),
        }
    }
}

/// `<config root>/chatwire/chatwire.toml`.
pub(super) fn global_config_path(config_root: Option<PathBuf>) -> Option<PathBuf> {
    config_root.map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read config text from the highest-precedence available source.
pub(super) fn read_config_text_with_sources<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    // An explicit path must exist; a missing file is an error, not a fallback.
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path)?;
        return Ok((text, ConfigSource::Explicit(path)));
    }

    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(path) = global_config_path(config_root()) {
        if let Ok(text) = read_file(&path) {
            return Ok((text, ConfigSource::Global(path)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}
