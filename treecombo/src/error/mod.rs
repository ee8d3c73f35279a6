//! Error types

mod config;
mod load;

pub use config::*;
pub use load::*;
