//! Configuration store: read-only current settings plus save/clear.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::ConfigError;

use super::ProviderConfig;

/// Owner of the current [`ProviderConfig`].
///
/// The chat core only ever reads `current()`; UI/CLI surfaces call `save`.
pub trait ConfigStore: Send + Sync {
    fn current(&self) -> ProviderConfig;
    fn save(&self, config: ProviderConfig) -> Result<(), ConfigError>;
    /// Reset to defaults and remove persisted settings.
    fn clear(&self) -> Result<(), ConfigError>;
}

/// TOML-file backed config store.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    current: RwLock<ProviderConfig>,
}

impl FileConfigStore {
    /// Wrap already-loaded settings that persist to `path`.
    pub fn new(path: impl Into<PathBuf>, config: ProviderConfig) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(config),
        }
    }

    /// Load `path` if it exists, otherwise start from defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProviderConfig::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self::new(path, config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn current(&self) -> ProviderConfig {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, config: ProviderConfig) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(&config)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Write a sibling temp file first so a crash never leaves half a config.
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        match self.current.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    fn clear(&self) -> Result<(), ConfigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        match self.current.write() {
            Ok(mut guard) => *guard = ProviderConfig::default(),
            Err(poisoned) => *poisoned.into_inner() = ProviderConfig::default(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderKind, SearchProvider};
    use crate::testsupport::TestTempDir;

    #[test]
    fn save_then_reopen_round_trips_settings() {
        let dir = TestTempDir::new("config-store");
        let path = dir.child("nested/chatwire.toml");
        let store = FileConfigStore::open(&path).unwrap();
        assert_eq!(store.current(), ProviderConfig::default());

        let config = ProviderConfig {
            provider: ProviderKind::Gemini,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-pro".into(),
            token: "key".into(),
            temperature: Some(0.0),
            search_provider: Some(SearchProvider::Tavily),
            ..ProviderConfig::default()
        };
        store.save(config.clone()).unwrap();
        assert_eq!(store.current(), config);

        let reopened = FileConfigStore::open(&path).unwrap();
        assert_eq!(reopened.current(), config);
    }

    #[test]
    fn clear_removes_file_and_resets() {
        let dir = TestTempDir::new("config-clear");
        let path = dir.write_text("chatwire.toml", "model = \"gpt-4o\"\n");
        let store = FileConfigStore::open(&path).unwrap();
        assert_eq!(store.current().model, "gpt-4o");

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.current(), ProviderConfig::default());
        // Clearing twice is fine.
        store.clear().unwrap();
    }
}
