//! Configuration error types

/// Errors raised when a [`ComboboxConfig`](crate::config::ComboboxConfig) is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Row height must be non-zero for index/pixel math.
    #[error("item height must be greater than zero")]
    ZeroItemHeight,

    /// The config document could not be parsed.
    #[error("invalid config document: {0}")]
    Json(#[from] serde_json::Error),
}
