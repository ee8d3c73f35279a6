//! Searchable multi-select tree picker engine
//!
//! The non-visual half of a hierarchical combobox: a lazily loaded tree with
//! debounced search, tri-state cascading selection, a flattened row list, a
//! virtual window over it and keyboard navigation. Rendering is left to the
//! caller, which feeds intents in and draws from a [`ComboboxView`].

pub mod config;
pub mod error;
pub mod flatten;
pub mod nav;
pub mod node;
pub mod provider;
pub mod search;
pub mod selection;
pub mod store;
pub mod virtualize;

mod combobox;

pub use combobox::*;
pub use config::ComboboxConfig;
pub use error::{ConfigError, LoadError};
pub use flatten::{FlattenedRow, flatten};
pub use nav::{EventResult, KeyOutcome, NavEffect, NavKey, NavPhase, NavState};
pub use node::{LockKey, TreeNode};
pub use provider::{DataProvider, FnProvider, MemoryProvider, provider_fn};
pub use selection::{CheckState, SelectionEngine, TreeIndex};
pub use store::{Cache, TreeSnapshot, TreeStore};
pub use virtualize::{VirtualItem, VirtualWindow, Virtualizer};
