//! Load error types

/// Errors produced while asking a [`DataProvider`](crate::provider::DataProvider)
/// for nodes.
///
/// These never reach callers of the engine: the store logs them and leaves
/// its cache untouched.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The provider rejected the request.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider panicked while answering.
    #[error("provider panicked: {0}")]
    Panicked(String),

    /// A tree document could not be parsed.
    #[error("invalid tree document: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    /// Creates a provider rejection with the given message.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}
