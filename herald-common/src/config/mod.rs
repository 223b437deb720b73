pub mod config;

use std::path::Path;

use anyhow::Context;

pub use self::config::HeraldConfig;

impl HeraldConfig {
    /// Loads the config from a TOML file. Startup fails on a malformed or
    /// unreadable file rather than serving with partial configuration.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}
