//! Engine configuration.
//!
//! Ambient settings threaded through query compilation and into constructed
//! operators. Settings are string-keyed, matching the WITH-properties style
//! used by the submission surface; well-known keys get named constants here.

use std::collections::HashMap;

/// Configuration key that selects where the output records of a root SELECT
/// statement are delivered. If set to `"$console"` (or left unset), records
/// print to the console. Any other value names an in-memory buffer that the
/// client can drain later.
pub const CLIENT_SELECT_TARGET_KEY: &str = "client.select.target";

/// Special value for [`CLIENT_SELECT_TARGET_KEY`] that prints to stdout.
pub const CONSOLE_SELECT_TARGET: &str = "$console";

/// String-keyed engine settings.
///
/// One instance is created per engine/session and shared (via `Arc`) by the
/// compiler and every operator descriptor that captures ambient configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    settings: HashMap<String, String>,
}

impl EngineConfig {
    /// Create an empty configuration (all keys unset).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration key, builder style.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Set a configuration key in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Look up a configuration key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(|s| s.as_str())
    }

    /// Look up a configuration key with a default.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_key_falls_back_to_default() {
        let config = EngineConfig::new();
        assert_eq!(
            config.get_or(CLIENT_SELECT_TARGET_KEY, CONSOLE_SELECT_TARGET),
            CONSOLE_SELECT_TARGET
        );
    }

    #[test]
    fn test_set_and_get() {
        let config = EngineConfig::new().with_setting(CLIENT_SELECT_TARGET_KEY, "buf1");
        assert_eq!(config.get(CLIENT_SELECT_TARGET_KEY), Some("buf1"));
    }
}
