//! Environment variable overrides.
//!
//! `CHATWIRE_*` variables win over file values so a config file can be shared
//! while secrets stay in the environment.

use crate::error::ConfigError;

use super::ProviderConfig;

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut ProviderConfig,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(provider) = non_empty(env_lookup("CHATWIRE_PROVIDER")) {
        config.provider = provider
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("CHATWIRE_PROVIDER: {e}")))?;
    }
    if let Some(endpoint) = non_empty(env_lookup("CHATWIRE_ENDPOINT")) {
        config.endpoint = endpoint;
    }
    if let Some(model) = non_empty(env_lookup("CHATWIRE_MODEL")) {
        config.model = model;
    }
    if let Some(token) = non_empty(env_lookup("CHATWIRE_TOKEN")) {
        config.token = token;
    }
    if let Some(key) = non_empty(env_lookup("CHATWIRE_SEARCH_API_KEY")) {
        config.search_api_key = key;
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
