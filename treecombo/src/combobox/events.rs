//! Keyboard handling for the Combobox.

use crate::nav::{EventResult, NavEffect, NavKey};

use super::state::Combobox;

impl Combobox {
    /// Feeds one key press.
    ///
    /// Returns [`EventResult::Ignored`] when the host should keep its default
    /// behavior (including Tab, which still closes the dropdown).
    pub fn handle_key(&self, key: NavKey) -> EventResult {
        let rows = self.rows();
        let outcome = {
            let Ok(mut inner) = self.inner.write() else {
                return EventResult::Ignored;
            };
            let outcome = inner.nav.handle_key(key, rows.len());
            if let NavEffect::Moved(index) = outcome.effect {
                let current = self.clamped_scroll(&inner, rows.len());
                inner.scroll_offset =
                    self.virtualizer
                        .scroll_into_view(index, current, inner.viewport_height);
            }
            outcome
        };

        match outcome.effect {
            NavEffect::ToggleExpand(index) => {
                // Leaves have nothing to expand.
                if let Some(row) = rows.get(index).filter(|row| row.has_children) {
                    self.store.toggle_expand(&row.id);
                }
            }
            NavEffect::ToggleSelect(index) => {
                if let Some(row) = rows.get(index) {
                    self.toggle_select(&row.id);
                }
            }
            NavEffect::None | NavEffect::Opened | NavEffect::Closed | NavEffect::Moved(_) => {}
        }

        if outcome.result == EventResult::Consumed || outcome.effect != NavEffect::None {
            self.mark_dirty();
        }
        outcome.result
    }
}
