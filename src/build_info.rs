//! Compile-time build metadata.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("CHATWIRE_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("CHATWIRE_BUILD_TIMESTAMP");

/// Text after the binary name in `chatwire --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("CHATWIRE_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("CHATWIRE_BUILD_TIMESTAMP")
);

/// Full version block including the binary name.
pub fn cli_version_text() -> String {
    format!("chatwire {LONG_VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_text_lists_commit_and_build_time() {
        let text = cli_version_text();
        assert!(text.starts_with(&format!("chatwire {VERSION}\n")));
        assert!(text.contains(&format!("commit: {GIT_COMMIT}")));
        assert!(text.ends_with(&format!("built: {BUILD_TIMESTAMP}")));
    }
}
