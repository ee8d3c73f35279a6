//! Combobox state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::config::ComboboxConfig;
use crate::error::ConfigError;
use crate::flatten::FlattenedRow;
use crate::nav::NavState;
use crate::provider::DataProvider;
use crate::selection::{SelectionEngine, TreeIndex};
use crate::store::{TreeSnapshot, TreeStore};
use crate::virtualize::Virtualizer;

/// Selection change callback, called with every selected id in sorted order.
pub(super) type ChangeCallback = Arc<dyn Fn(Vec<String>) + Send + Sync>;

/// Internal state for the Combobox.
#[derive(Debug, Default)]
pub(super) struct ComboInner {
    /// Open/closed phase and active row.
    pub nav: NavState,
    /// Selected and indeterminate ids.
    pub selection: SelectionEngine,
    /// Scroll offset in pixels, clamped on read.
    pub scroll_offset: u64,
    /// Viewport height reported by the presentation layer.
    pub viewport_height: Option<u32>,
    /// Parent/children index keyed by cache generation.
    pub index: Option<(u64, Arc<TreeIndex>)>,
    /// Flattened rows keyed by store revision.
    pub rows: Option<(u64, Arc<[FlattenedRow]>)>,
}

/// Searchable multi-select tree picker.
///
/// Clones share state. Must be created inside a tokio runtime.
pub struct Combobox {
    pub(super) store: TreeStore,
    pub(super) virtualizer: Virtualizer,
    pub(super) inner: Arc<RwLock<ComboInner>>,
    pub(super) dirty: Arc<AtomicBool>,
    pub(super) on_change: Option<ChangeCallback>,
}

impl Combobox {
    /// Creates a combobox and dispatches the root load.
    pub fn new(
        provider: impl DataProvider + 'static,
        config: ComboboxConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_shared(Arc::new(provider), config)
    }

    /// Creates a combobox around an already shared provider.
    pub fn with_shared(
        provider: Arc<dyn DataProvider>,
        config: ComboboxConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: TreeStore::with_shared(provider, config.debounce()),
            virtualizer: Virtualizer::from_config(&config),
            inner: Arc::new(RwLock::new(ComboInner::default())),
            dirty: Arc::new(AtomicBool::new(true)),
            on_change: None,
        })
    }

    /// Installs the selection change callback.
    pub fn with_on_change(mut self, f: impl Fn(Vec<String>) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Row geometry in use.
    pub fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    /// Receiver that fires whenever the store changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Waits until no search is pending and no load is in flight.
    pub async fn settled(&self) {
        self.store.settled().await
    }

    /// Check if the combobox needs re-rendering.
    ///
    /// Store changes are not tracked here; watch [`subscribe`](Self::subscribe).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    pub(super) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Derived data
    // -------------------------------------------------------------------------

    /// Parent/children index for `snapshot`, rebuilt only when the cache
    /// changed.
    pub(super) fn index_for(&self, snapshot: &TreeSnapshot) -> Arc<TreeIndex> {
        let cached = self.inner.read().ok().and_then(|inner| {
            inner
                .index
                .as_ref()
                .filter(|(generation, _)| *generation == snapshot.cache_generation)
                .map(|(_, index)| Arc::clone(index))
        });
        if let Some(index) = cached {
            return index;
        }

        let index = Arc::new(TreeIndex::from_cache(&snapshot.cache));
        if let Ok(mut inner) = self.inner.write() {
            inner.index = Some((snapshot.cache_generation, Arc::clone(&index)));
        }
        index
    }

    /// Flattened rows for `snapshot`, rebuilt only when the store changed.
    pub(super) fn rows_for(&self, snapshot: &TreeSnapshot) -> Arc<[FlattenedRow]> {
        let cached = self.inner.read().ok().and_then(|inner| {
            inner
                .rows
                .as_ref()
                .filter(|(revision, _)| *revision == snapshot.revision)
                .map(|(_, rows)| Arc::clone(rows))
        });
        if let Some(rows) = cached {
            return rows;
        }

        let rows: Arc<[FlattenedRow]> = Arc::from(snapshot.rows());
        if let Ok(mut inner) = self.inner.write() {
            inner.rows = Some((snapshot.revision, Arc::clone(&rows)));
        }
        rows
    }

    /// Current rows.
    pub fn rows(&self) -> Arc<[FlattenedRow]> {
        self.rows_for(&self.store.snapshot())
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Sets the search query, opens the dropdown and activates the first row.
    pub fn set_query(&self, query: impl Into<String>) {
        self.store.set_query(query);
        if let Ok(mut inner) = self.inner.write() {
            inner.nav.open();
            inner.nav.set_active(Some(0));
            inner.scroll_offset = 0;
        }
        self.mark_dirty();
    }

    /// Current search query.
    pub fn query(&self) -> String {
        self.store.query()
    }

    // -------------------------------------------------------------------------
    // Expand/Collapse
    // -------------------------------------------------------------------------

    /// Expands a collapsed node or collapses an expanded one.
    pub fn toggle_expand(&self, id: &str) {
        self.store.toggle_expand(id);
        self.mark_dirty();
    }

    /// Expand a node, fetching its children if unknown.
    pub fn expand(&self, id: &str) {
        self.store.expand(id);
        self.mark_dirty();
    }

    /// Collapse a node.
    pub fn collapse(&self, id: &str) {
        self.store.collapse(id);
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Flips the selection of `id`, cascading through loaded nodes.
    pub fn toggle_select(&self, id: &str) {
        let index = self.index_for(&self.store.snapshot());
        let changed = self.update_selection(|selection| {
            let before = selection.selected();
            selection.toggle(id, &index);
            before != selection.selected()
        });
        self.notify(changed);
    }

    /// Unselects `id` if it is selected.
    pub fn remove_selection(&self, id: &str) {
        let index = self.index_for(&self.store.snapshot());
        let changed = self.update_selection(|selection| selection.remove(id, &index));
        self.notify(changed);
    }

    /// Unselects everything.
    pub fn clear_selection(&self) {
        let changed = self.update_selection(SelectionEngine::clear);
        self.notify(changed);
    }

    /// Selected ids in sorted order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.selection.selected_ids())
            .unwrap_or_default()
    }

    /// Snapshot of the selection engine.
    pub fn selection(&self) -> SelectionEngine {
        self.inner
            .read()
            .map(|inner| inner.selection.clone())
            .unwrap_or_default()
    }

    /// Applies `f` to the selection. Returns the selected ids if it reported
    /// a change.
    fn update_selection(
        &self,
        f: impl FnOnce(&mut SelectionEngine) -> bool,
    ) -> Option<Vec<String>> {
        let mut inner = self.inner.write().ok()?;
        if !f(&mut inner.selection) {
            return None;
        }
        Some(inner.selection.selected_ids())
    }

    /// Calls the change callback outside the state lock.
    fn notify(&self, changed: Option<Vec<String>>) {
        let Some(ids) = changed else {
            return;
        };
        self.mark_dirty();
        if let Some(on_change) = &self.on_change {
            on_change(ids);
        }
    }

    // -------------------------------------------------------------------------
    // Open/Close
    // -------------------------------------------------------------------------

    /// Opens the dropdown.
    pub fn open(&self) {
        let changed = self
            .inner
            .write()
            .map(|mut inner| inner.nav.open())
            .unwrap_or(false);
        if changed {
            self.mark_dirty();
        }
    }

    /// Closes the dropdown.
    pub fn close(&self) {
        let changed = self
            .inner
            .write()
            .map(|mut inner| inner.nav.close())
            .unwrap_or(false);
        if changed {
            self.mark_dirty();
        }
    }

    /// Opens a closed dropdown or closes an open one.
    pub fn toggle_open(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.nav.toggle();
        }
        self.mark_dirty();
    }

    /// Whether the dropdown is open.
    pub fn is_open(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.nav.is_open())
            .unwrap_or(false)
    }

    /// Sets the active row, e.g. on pointer hover. `None` clears it.
    pub fn set_active_index(&self, index: Option<usize>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.nav.set_active(index);
        }
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Scrolling
    // -------------------------------------------------------------------------

    /// Sets the scroll offset in pixels.
    pub fn set_scroll_offset(&self, offset: u64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.scroll_offset = offset;
        }
        self.mark_dirty();
    }

    /// Sets the viewport height in pixels. Zero falls back to the configured
    /// default.
    pub fn set_viewport_height(&self, height: u32) {
        if let Ok(mut inner) = self.inner.write() {
            inner.viewport_height = (height > 0).then_some(height);
        }
        self.mark_dirty();
    }

    /// Scroll offset clamped to the current content.
    pub fn scroll_offset(&self) -> u64 {
        let count = self.rows().len();
        self.inner
            .read()
            .map(|inner| self.clamped_scroll(&inner, count))
            .unwrap_or(0)
    }

    pub(super) fn clamped_scroll(&self, inner: &ComboInner, item_count: usize) -> u64 {
        inner.scroll_offset.min(
            self.virtualizer
                .max_scroll_offset(item_count, inner.viewport_height),
        )
    }
}

impl Clone for Combobox {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            virtualizer: self.virtualizer,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            on_change: self.on_change.clone(),
        }
    }
}

impl fmt::Debug for Combobox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combobox")
            .field("store", &self.store)
            .field("virtualizer", &self.virtualizer)
            .field("inner", &self.inner)
            .field("on_change", &self.on_change.is_some())
            .finish_non_exhaustive()
    }
}
