//! Combobox configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Tuning for row geometry, overscan and search debounce.
///
/// # Example
///
/// ```
/// use treecombo::ComboboxConfig;
///
/// let config = ComboboxConfig::default()
///     .with_item_height(32)
///     .with_overscan(3);
/// assert_eq!(config.debounce().as_millis(), 300);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboboxConfig {
    /// Fixed height of every row, in pixels.
    ///
    /// Default: 40
    pub item_height: u32,

    /// Rows materialized beyond each edge of the viewport.
    ///
    /// Default: 5
    pub overscan: usize,

    /// Quiet period after the last keystroke before a search is dispatched.
    ///
    /// Default: 300 ms
    pub debounce_ms: u64,

    /// Viewport height used until the presentation layer reports a real one.
    ///
    /// Default: 800
    pub fallback_viewport_height: u32,
}

impl Default for ComboboxConfig {
    fn default() -> Self {
        Self {
            item_height: 40,
            overscan: 5,
            debounce_ms: 300,
            fallback_viewport_height: 800,
        }
    }
}

impl ComboboxConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON config document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the row height.
    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = item_height;
        self
    }

    /// Sets the overscan row count.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Sets the search debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis() as u64;
        self
    }

    /// Sets the fallback viewport height.
    pub fn with_fallback_viewport_height(mut self, height: u32) -> Self {
        self.fallback_viewport_height = height;
        self
    }

    /// The search debounce delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Checks that the geometry is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_height == 0 {
            return Err(ConfigError::ZeroItemHeight);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ComboboxConfig::from_json(r#"{ "overscan": 2 }"#).unwrap();
        assert_eq!(config.overscan, 2);
        assert_eq!(config.item_height, 40);
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_zero_item_height_rejected() {
        let err = ComboboxConfig::from_json(r#"{ "item_height": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroItemHeight));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = ComboboxConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
