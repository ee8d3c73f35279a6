//! Per-render view of the combobox.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::flatten::FlattenedRow;
use crate::node::LockKey;
use crate::selection::{CheckState, check_state};
use crate::virtualize::{VirtualItem, VirtualWindow};

use super::state::Combobox;

/// What the dropdown body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing to show yet and a root load or search is running.
    Loading,
    /// Nothing to show. Failed loads end up here too.
    Empty,
    /// Rows are available.
    Ready,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone)]
pub struct ComboboxView {
    pub rows: Arc<[FlattenedRow]>,
    /// Rows to materialize.
    pub window: VirtualWindow,
    pub total_height: u64,
    /// Scroll offset clamped to the content.
    pub scroll_offset: u64,
    /// Viewport height in use, the fallback until a real one is reported.
    pub viewport_height: u32,
    pub is_open: bool,
    /// Active row, always a valid index into `rows`.
    pub active_index: Option<usize>,
    pub active_id: Option<String>,
    pub selected: Arc<BTreeSet<String>>,
    pub indeterminate: Arc<BTreeSet<String>>,
    pub loading: Arc<HashSet<LockKey>>,
    pub is_loading_root: bool,
    pub is_searching: bool,
    /// Root loading or searching.
    pub is_loading: bool,
    pub query: String,
    pub status: ViewStatus,
}

impl ComboboxView {
    /// Checkbox state of a row.
    pub fn check_state(&self, id: &str) -> CheckState {
        check_state(&self.selected, &self.indeterminate, id)
    }

    /// Whether a row's children are being fetched.
    pub fn is_row_loading(&self, id: &str) -> bool {
        self.loading.contains(&LockKey::node(id))
    }

    /// Windowed rows paired with their position.
    pub fn visible_rows(&self) -> impl Iterator<Item = (&VirtualItem, &FlattenedRow)> {
        self.window
            .items
            .iter()
            .filter_map(|item| self.rows.get(item.index).map(|row| (item, row)))
    }
}

impl Combobox {
    /// Builds the view for the current state.
    ///
    /// Also dispatches fetches for expanded rows whose children were never
    /// requested.
    pub fn view(&self) -> ComboboxView {
        let mut snapshot = self.store.snapshot();
        if snapshot.query.is_empty() {
            let rows = self.rows_for(&snapshot);
            let expanded = rows.iter().filter(|row| row.expanded).map(|row| row.id.as_str());
            if self.store.ensure_loaded(expanded) {
                snapshot = self.store.snapshot();
            }
        }

        let rows = self.rows_for(&snapshot);
        let count = rows.len();
        let is_loading_root = snapshot.is_loading_root();
        let is_searching = snapshot.is_searching();
        let is_loading = is_loading_root || is_searching;
        let status = match (count, is_loading) {
            (0, true) => ViewStatus::Loading,
            (0, false) => ViewStatus::Empty,
            _ => ViewStatus::Ready,
        };

        let (nav, selection, scroll_offset, viewport) = match self.inner.read() {
            Ok(inner) => (
                inner.nav.clone(),
                inner.selection.clone(),
                self.clamped_scroll(&inner, count),
                inner.viewport_height,
            ),
            Err(_) => Default::default(),
        };

        let active_index = nav.active_index(count);
        let active_id = active_index
            .and_then(|index| rows.get(index))
            .map(|row| row.id.clone());

        ComboboxView {
            window: self.virtualizer.window(count, scroll_offset, viewport),
            total_height: self.virtualizer.total_height(count),
            scroll_offset,
            viewport_height: self.virtualizer.effective_viewport(viewport),
            is_open: nav.is_open(),
            active_index,
            active_id,
            selected: selection.selected(),
            indeterminate: selection.indeterminate(),
            loading: snapshot.loading,
            is_loading_root,
            is_searching,
            is_loading,
            query: snapshot.query,
            status,
            rows,
        }
    }
}
