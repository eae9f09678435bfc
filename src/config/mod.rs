//! Configuration loading from TOML files and environment variables.
//!
//! Precedence (highest wins):
//! 1. Environment variables (`CHATWIRE_PROVIDER`, `CHATWIRE_ENDPOINT`,
//!    `CHATWIRE_MODEL`, `CHATWIRE_TOKEN`, `CHATWIRE_SEARCH_API_KEY`)
//! 2. TOML file given via `--config`
//! 3. `./chatwire.toml`
//! 4. `$XDG_CONFIG_HOME/chatwire/chatwire.toml`
//! 5. Built-in defaults

mod defaults;
mod env;
mod loader;
mod persist;
mod sources;
mod types;

pub use loader::{load_config, load_config_with_source, LoadedConfig};
pub use persist::{ConfigStore, FileConfigStore};
pub use sources::ConfigSource;
pub use types::{ProviderConfig, ProviderKind, SearchProvider};

/// Path settings should be saved to, given where they were loaded from.
pub fn resolve_write_path(source: &ConfigSource) -> Option<std::path::PathBuf> {
    source.write_path(loader::config_root_dir())
}
