//! Demo error types

use std::path::PathBuf;

use treecombo::{ConfigError, LoadError};

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid tree: {0}")]
    Tree(#[from] LoadError),

    #[error("{0}")]
    Usage(String),
}
