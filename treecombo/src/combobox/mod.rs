//! Combobox facade.
//!
//! Ties the store, selection, flattening, windowing and navigation engines
//! together behind the intents a presentation layer sends and the
//! [`ComboboxView`] it renders from.
//!
//! # Example
//!
//! ```ignore
//! use treecombo::{Combobox, ComboboxConfig, MemoryProvider, NavKey};
//!
//! let combo = Combobox::new(MemoryProvider::new(tree), ComboboxConfig::default())?
//!     .with_on_change(|ids| println!("selected: {ids:?}"));
//!
//! combo.set_viewport_height(320);
//! combo.handle_key(NavKey::Down);
//!
//! let view = combo.view();
//! for item in &view.window.items {
//!     let row = &view.rows[item.index];
//!     // draw row at item.offset_top
//! }
//! ```

mod events;
mod state;
mod view;

pub use state::Combobox;
pub use view::{ComboboxView, ViewStatus};
