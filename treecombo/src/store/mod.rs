//! Tree data store.
//!
//! Owns the cache of loaded children, the set of in-flight loads, the
//! expansion set and the search query. It is the only component that talks
//! to the [`DataProvider`]: loads are spawned as tokio tasks and their results
//! are applied when they settle.
//!
//! Every mutation replaces the affected collection instead of editing a
//! shared one, so a [`TreeSnapshot`] taken earlier never changes.

mod debounce;

pub use debounce::Debouncer;

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures::FutureExt;
use log::{debug, error, trace};
use tokio::sync::watch;

use crate::error::LoadError;
use crate::flatten::{FlattenedRow, flatten};
use crate::node::{LockKey, TreeNode};
use crate::provider::DataProvider;

/// Loaded children by lock key.
///
/// A present key means the children are fully known; an absent key means
/// they must be fetched before they can be shown. Entries are only ever
/// replaced wholesale.
pub type Cache = BTreeMap<LockKey, Arc<[TreeNode]>>;

/// Immutable view of the store at one revision.
#[derive(Debug, Clone, Default)]
pub struct TreeSnapshot {
    /// Bumped on every store change.
    pub revision: u64,
    /// Bumped on every cache change.
    pub cache_generation: u64,
    pub cache: Arc<Cache>,
    pub expanded: Arc<HashSet<String>>,
    pub loading: Arc<HashSet<LockKey>>,
    pub query: String,
    /// Results for the current query, `None` until they arrive.
    pub search_results: Option<Arc<[TreeNode]>>,
    /// A search is waiting for the debounce delay.
    pub search_pending: bool,
}

impl TreeSnapshot {
    /// Visible rows for this snapshot.
    pub fn rows(&self) -> Vec<FlattenedRow> {
        flatten(
            &self.cache,
            self.search_results.as_deref(),
            &self.expanded,
            &self.query,
        )
    }

    /// Root level is loading and nothing is cached for it yet.
    pub fn is_loading_root(&self) -> bool {
        self.loading.contains(&LockKey::Root) && !self.cache.contains_key(&LockKey::Root)
    }

    /// A search for the current query is pending or in flight.
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
            && (self.search_pending
                || self.loading.contains(&LockKey::Search(self.query.clone())))
    }

    /// Whether a node's children are being fetched.
    pub fn is_node_loading(&self, id: &str) -> bool {
        self.loading.contains(&LockKey::node(id))
    }
}

#[derive(Debug)]
struct StoreState {
    revision: u64,
    cache_generation: u64,
    cache: Arc<Cache>,
    loading: Arc<HashSet<LockKey>>,
    expanded: Arc<HashSet<String>>,
    /// Expanded ids already fetched on behalf of the expansion set.
    auto_requested: HashSet<String>,
    query: String,
    search_results: Option<Arc<[TreeNode]>>,
    debounce: Debouncer,
}

impl StoreState {
    fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            revision: self.revision,
            cache_generation: self.cache_generation,
            cache: Arc::clone(&self.cache),
            expanded: Arc::clone(&self.expanded),
            loading: Arc::clone(&self.loading),
            query: self.query.clone(),
            search_results: self.search_results.clone(),
            search_pending: self.debounce.is_pending(),
        }
    }

    /// Marks `key` as loading. Returns false if it already was.
    fn begin_load(&mut self, key: &LockKey) -> bool {
        if self.loading.contains(key) {
            debug!("load for {key} already in flight, dropping");
            return false;
        }
        Arc::make_mut(&mut self.loading).insert(key.clone());
        true
    }
}

struct TreeStoreInner {
    state: RwLock<StoreState>,
    provider: Arc<dyn DataProvider>,
    revision: watch::Sender<u64>,
}

/// Async tree loader and cache.
///
/// Cheap to clone; clones share state. Must be created inside a tokio
/// runtime: construction dispatches the root load.
///
/// # Example
///
/// ```ignore
/// let store = TreeStore::new(MemoryProvider::new(tree), Duration::from_millis(300));
/// store.settled().await;
/// store.expand("node-0");
/// store.settled().await;
/// let rows = store.snapshot().rows();
/// ```
#[derive(Clone)]
pub struct TreeStore {
    inner: Arc<TreeStoreInner>,
}

impl TreeStore {
    /// Creates a store and dispatches the root load.
    pub fn new(provider: impl DataProvider + 'static, debounce: Duration) -> Self {
        Self::with_shared(Arc::new(provider), debounce)
    }

    /// Creates a store around an already shared provider.
    pub fn with_shared(provider: Arc<dyn DataProvider>, debounce: Duration) -> Self {
        let (revision, _) = watch::channel(0);
        let store = Self {
            inner: Arc::new(TreeStoreInner {
                state: RwLock::new(StoreState {
                    revision: 0,
                    cache_generation: 0,
                    cache: Arc::default(),
                    loading: Arc::default(),
                    expanded: Arc::default(),
                    auto_requested: HashSet::new(),
                    query: String::new(),
                    search_results: None,
                    debounce: Debouncer::new(debounce),
                }),
                provider,
                revision,
            }),
        };
        store.load_children(LockKey::Root);
        store
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current state as an immutable snapshot.
    pub fn snapshot(&self) -> TreeSnapshot {
        self.inner
            .state
            .read()
            .map(|state| state.snapshot())
            .unwrap_or_default()
    }

    /// Receiver that observes every revision bump.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        self.inner.state.read().map(|s| s.revision).unwrap_or(0)
    }

    /// Current search query.
    pub fn query(&self) -> String {
        self.inner
            .state
            .read()
            .map(|s| s.query.clone())
            .unwrap_or_default()
    }

    /// Cached children for `key`.
    pub fn children(&self, key: &LockKey) -> Option<Arc<[TreeNode]>> {
        self.inner
            .state
            .read()
            .ok()
            .and_then(|s| s.cache.get(key).cloned())
    }

    /// Check if a node is in the expansion set.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.inner
            .state
            .read()
            .map(|s| s.expanded.contains(id))
            .unwrap_or(false)
    }

    /// Check if a load for `key` is in flight.
    pub fn is_loading(&self, key: &LockKey) -> bool {
        self.inner
            .state
            .read()
            .map(|s| s.loading.contains(key))
            .unwrap_or(false)
    }

    /// Root level is loading and nothing is cached for it yet.
    pub fn is_loading_root(&self) -> bool {
        self.snapshot().is_loading_root()
    }

    /// A search for the current query is pending or in flight.
    pub fn is_searching(&self) -> bool {
        self.snapshot().is_searching()
    }

    /// Whether a debounced search is pending or any load is in flight.
    pub fn is_busy(&self) -> bool {
        self.inner
            .state
            .read()
            .map(|s| s.debounce.is_pending() || !s.loading.is_empty())
            .unwrap_or(false)
    }

    /// Waits until no search is pending and no load is in flight.
    ///
    /// Never returns while a provider call is stuck.
    pub async fn settled(&self) {
        let mut changes = self.subscribe();
        while self.is_busy() {
            if changes.changed().await.is_err() {
                break;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Fetches the children of `key` unless a fetch for it is already in
    /// flight. A `Search` key fetches results for its query.
    pub fn load_children(&self, key: LockKey) {
        let dispatch = self.mutate(|state| state.begin_load(&key));
        if dispatch == Some(true) {
            self.spawn_load(key);
        }
    }

    /// Fetches children for expanded nodes whose children are unknown.
    ///
    /// Each id is fetched this way at most once; later failures are not
    /// retried until the node is expanded again. Returns whether any fetch
    /// was dispatched.
    pub fn ensure_loaded<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let wanted: Vec<&str> = match self.inner.state.read() {
            Ok(state) => ids
                .into_iter()
                .filter(|id| {
                    state.expanded.contains(*id)
                        && !state.auto_requested.contains(*id)
                        && !state.cache.contains_key(&LockKey::node(*id))
                })
                .collect(),
            Err(_) => return false,
        };
        if wanted.is_empty() {
            return false;
        }

        let keys = self
            .mutate(|state| {
                let mut keys = Vec::new();
                for id in wanted {
                    let key = LockKey::node(id);
                    if state.cache.contains_key(&key) || !state.auto_requested.insert(id.to_string())
                    {
                        continue;
                    }
                    if state.begin_load(&key) {
                        keys.push(key);
                    }
                }
                keys
            })
            .unwrap_or_default();

        let dispatched = !keys.is_empty();
        for key in keys {
            self.spawn_load(key);
        }
        dispatched
    }

    fn spawn_load(&self, key: LockKey) {
        debug!("dispatching load for {key}");
        let store = self.clone();
        tokio::spawn(async move {
            let provider = Arc::clone(&store.inner.provider);
            let result = AssertUnwindSafe(provider.load(key.parent_id(), key.query()))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(LoadError::Panicked(panic_message(panic.as_ref()))));
            store.settle(key, result);
        });
    }

    fn settle(&self, key: LockKey, result: Result<Vec<TreeNode>, LoadError>) {
        self.mutate(|state| {
            Arc::make_mut(&mut state.loading).remove(&key);
            match result {
                Ok(nodes) => match &key {
                    LockKey::Search(query) if *query != state.query => {
                        debug!("discarding stale search results for {query:?}");
                    }
                    LockKey::Search(query) => {
                        debug!("search for {query:?} returned {} roots", nodes.len());
                        state.search_results = Some(Arc::from(nodes));
                    }
                    LockKey::Root | LockKey::Node(_) => {
                        debug!("loaded {} children for {key}", nodes.len());
                        Arc::make_mut(&mut state.cache).insert(key.clone(), Arc::from(nodes));
                        state.cache_generation += 1;
                    }
                },
                Err(err) => error!("failed to load nodes for {key}: {err}"),
            }
        });
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Sets the search query.
    ///
    /// The query takes effect immediately; the provider is asked only after
    /// the debounce delay has passed without another call. Clearing the query
    /// cancels a pending search and drops the previous results. A search that
    /// was already dispatched is never retracted, but its results are
    /// discarded if the query changed in the meantime.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.mutate(|state| {
            if state.query == query {
                return;
            }
            state.query = query.clone();
            if query.is_empty() {
                state.debounce.cancel();
                state.search_results = None;
                return;
            }
            let store = self.clone();
            let ticket = state.debounce.schedule(move |ticket| async move {
                store.fire_search(ticket, query);
            });
            trace!("search debounce scheduled (ticket {ticket})");
        });
    }

    fn fire_search(&self, ticket: u64, query: String) {
        let key = LockKey::Search(query);
        let dispatch = self.mutate(|state| {
            if !state.debounce.complete(ticket) {
                trace!("search debounce ticket {ticket} superseded");
                return false;
            }
            state.begin_load(&key)
        });
        if dispatch == Some(true) {
            self.spawn_load(key);
        }
    }

    // -------------------------------------------------------------------------
    // Expand/Collapse
    // -------------------------------------------------------------------------

    /// Adds `id` to the expansion set, fetching its children if unknown.
    pub fn expand(&self, id: &str) {
        let key = LockKey::node(id);
        let dispatch = self.mutate(|state| {
            if !Arc::make_mut(&mut state.expanded).insert(id.to_string()) {
                return false;
            }
            if state.cache.contains_key(&key) {
                return false;
            }
            state.auto_requested.insert(id.to_string());
            state.begin_load(&key)
        });
        if dispatch == Some(true) {
            self.spawn_load(key);
        }
    }

    /// Removes `id` from the expansion set.
    pub fn collapse(&self, id: &str) {
        self.mutate(|state| {
            if state.expanded.contains(id) {
                Arc::make_mut(&mut state.expanded).remove(id);
            }
        });
    }

    /// Expands a collapsed node or collapses an expanded one.
    pub fn toggle_expand(&self, id: &str) {
        if self.is_expanded(id) {
            self.collapse(id);
        } else {
            self.expand(id);
        }
    }

    /// Runs `f` under the write lock and publishes a new revision.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> Option<R> {
        let mut state = self.inner.state.write().ok()?;
        let result = f(&mut state);
        state.revision += 1;
        self.inner.revision.send_replace(state.revision);
        Some(result)
    }
}

impl std::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeStore")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
