//! Tri-state selection with cascading.
//!
//! Selecting a node selects every loaded descendant; ancestors are then
//! recomputed from their loaded children into selected, indeterminate or
//! cleared. Only children already present in the cache take part, so a
//! subtree loaded after a toggle is classified the next time a cascade runs
//! through it.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::node::LockKey;
use crate::store::Cache;

/// Parent and children lookups derived from the cache.
///
/// Rebuilt whenever the cache changes; never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeIndex {
    parents: HashMap<String, LockKey>,
    children: HashMap<LockKey, Vec<String>>,
}

impl TreeIndex {
    /// Builds the index from every cache entry.
    ///
    /// Duplicate ids are not validated; the entry visited last wins.
    pub fn from_cache(cache: &Cache) -> Self {
        let mut index = Self::default();
        for (key, nodes) in cache {
            let ids: Vec<String> = nodes.iter().map(|node| node.id.clone()).collect();
            for id in &ids {
                index.parents.insert(id.clone(), key.clone());
            }
            index.children.insert(key.clone(), ids);
        }
        index
    }

    /// The lock key whose children contain `id`.
    pub fn parent_of(&self, id: &str) -> Option<&LockKey> {
        self.parents.get(id)
    }

    /// Loaded children of `key`, `None` when not loaded.
    pub fn children_of(&self, key: &LockKey) -> Option<&[String]> {
        self.children.get(key).map(Vec::as_slice)
    }
}

/// Display state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Checked,
    Indeterminate,
}

/// Selected and indeterminate id sets.
///
/// Both sets are shared snapshots: every change builds new sets and swaps
/// them in, so handed-out snapshots never change underneath a reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionEngine {
    selected: Arc<BTreeSet<String>>,
    indeterminate: Arc<BTreeSet<String>>,
}

impl SelectionEngine {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the selected ids.
    pub fn selected(&self) -> Arc<BTreeSet<String>> {
        Arc::clone(&self.selected)
    }

    /// Snapshot of the indeterminate ids.
    pub fn indeterminate(&self) -> Arc<BTreeSet<String>> {
        Arc::clone(&self.indeterminate)
    }

    /// Selected ids in sorted order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Check if an id is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Check if an id is indeterminate.
    pub fn is_indeterminate(&self, id: &str) -> bool {
        self.indeterminate.contains(id)
    }

    /// Display state of an id.
    pub fn check_state(&self, id: &str) -> CheckState {
        check_state(&self.selected, &self.indeterminate, id)
    }

    /// Flips `id` and cascades to its loaded descendants and its ancestors.
    pub fn toggle(&mut self, id: &str, index: &TreeIndex) {
        let mut selected = (*self.selected).clone();
        let mut indeterminate = (*self.indeterminate).clone();
        let target = !selected.contains(id);

        // Down: every loaded descendant takes the target state. Ids repeated
        // by a malformed tree are visited once.
        let mut visited = HashSet::from([id.to_string()]);
        let mut queue = VecDeque::from([id.to_string()]);
        while let Some(current) = queue.pop_front() {
            indeterminate.remove(&current);
            if let Some(children) = index.children_of(&LockKey::node(current.as_str())) {
                for child in children {
                    if visited.insert(child.clone()) {
                        queue.push_back(child.clone());
                    }
                }
            }
            if target {
                selected.insert(current);
            } else {
                selected.remove(&current);
            }
        }

        // Up: recompute each ancestor from its loaded children.
        let mut seen = HashSet::from([id]);
        let mut parent = index.parent_of(id);
        while let Some(LockKey::Node(ancestor)) = parent {
            if !seen.insert(ancestor.as_str()) {
                break;
            }
            let siblings = index
                .children_of(&LockKey::node(ancestor.as_str()))
                .unwrap_or_default();
            let checked = siblings.iter().filter(|sib| selected.contains(*sib)).count();
            let partial = siblings
                .iter()
                .filter(|sib| indeterminate.contains(*sib))
                .count();

            if !siblings.is_empty() && checked == siblings.len() {
                selected.insert(ancestor.clone());
                indeterminate.remove(ancestor);
            } else if checked > 0 || partial > 0 {
                selected.remove(ancestor);
                indeterminate.insert(ancestor.clone());
            } else {
                selected.remove(ancestor);
                indeterminate.remove(ancestor);
            }

            parent = index.parent_of(ancestor);
        }

        self.selected = Arc::new(selected);
        self.indeterminate = Arc::new(indeterminate);
    }

    /// Unselects `id` through a toggle if it is selected. Returns whether
    /// anything changed.
    pub fn remove(&mut self, id: &str, index: &TreeIndex) -> bool {
        if !self.selected.contains(id) {
            return false;
        }
        self.toggle(id, index);
        true
    }

    /// Empties both sets. Returns whether anything changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty() || !self.indeterminate.is_empty();
        self.selected = Arc::default();
        self.indeterminate = Arc::default();
        changed
    }
}

/// Display state of `id` given selection snapshots.
pub fn check_state(
    selected: &BTreeSet<String>,
    indeterminate: &BTreeSet<String>,
    id: &str,
) -> CheckState {
    if selected.contains(id) {
        CheckState::Checked
    } else if indeterminate.contains(id) {
        CheckState::Indeterminate
    } else {
        CheckState::Unchecked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TreeNode;

    /// root: a, b
    /// a: a1, a2, a3
    /// a3: a3x, a3y
    /// b: (not loaded)
    fn sample_cache() -> Cache {
        let mut cache = Cache::new();
        cache.insert(
            LockKey::Root,
            Arc::from(vec![
                TreeNode::new("a", "A").with_has_children(true),
                TreeNode::new("b", "B").with_has_children(true),
            ]),
        );
        cache.insert(
            LockKey::node("a"),
            Arc::from(vec![
                TreeNode::new("a1", "A1"),
                TreeNode::new("a2", "A2"),
                TreeNode::new("a3", "A3").with_has_children(true),
            ]),
        );
        cache.insert(
            LockKey::node("a3"),
            Arc::from(vec![TreeNode::new("a3x", "A3X"), TreeNode::new("a3y", "A3Y")]),
        );
        cache
    }

    fn ids(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    fn assert_disjoint(engine: &SelectionEngine) {
        assert!(engine.selected().is_disjoint(&engine.indeterminate()));
    }

    #[test]
    fn test_index_from_cache() {
        let index = TreeIndex::from_cache(&sample_cache());
        assert_eq!(index.parent_of("a"), Some(&LockKey::Root));
        assert_eq!(index.parent_of("a3x"), Some(&LockKey::node("a3")));
        assert_eq!(index.parent_of("zzz"), None);
        assert_eq!(index.children_of(&LockKey::Root).unwrap(), ["a", "b"]);
        assert_eq!(index.children_of(&LockKey::node("b")), None);
    }

    #[test]
    fn test_cascade_down_selects_loaded_descendants() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("a", &index);

        assert_eq!(ids(&engine.selected()), ["a", "a1", "a2", "a3", "a3x", "a3y"]);
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_cascade_up_marks_indeterminate() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("a3x", &index);

        assert_eq!(ids(&engine.selected()), ["a3x"]);
        assert_eq!(ids(&engine.indeterminate()), ["a", "a3"]);
        assert_eq!(engine.check_state("a3"), CheckState::Indeterminate);
        assert_eq!(engine.check_state("a2"), CheckState::Unchecked);
        assert_disjoint(&engine);
    }

    #[test]
    fn test_cascade_up_completes_parent() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("a3x", &index);
        engine.toggle("a3y", &index);
        assert!(engine.is_selected("a3"));
        assert!(engine.is_indeterminate("a"));

        engine.toggle("a1", &index);
        engine.toggle("a2", &index);
        assert!(engine.is_selected("a"));
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_unselecting_last_child_clears_parent() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("a1", &index);
        engine.toggle("a1", &index);
        assert!(engine.selected().is_empty());
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_cyclic_ids_terminate() {
        // A node listed among its own children.
        let mut cache = Cache::new();
        cache.insert(
            LockKey::Root,
            Arc::from(vec![TreeNode::new("a", "A").with_has_children(true)]),
        );
        cache.insert(
            LockKey::node("a"),
            Arc::from(vec![
                TreeNode::new("a", "A again").with_has_children(true),
                TreeNode::new("b", "B"),
            ]),
        );
        let index = TreeIndex::from_cache(&cache);
        let mut engine = SelectionEngine::new();

        engine.toggle("a", &index);
        assert_eq!(ids(&engine.selected()), ["a", "b"]);
        assert_disjoint(&engine);

        engine.toggle("b", &index);
        assert!(!engine.is_selected("b"));
        assert_disjoint(&engine);

        engine.toggle("a", &index);
        engine.toggle("a", &index);
        assert_disjoint(&engine);
    }

    #[test]
    fn test_double_toggle_on_partial_parent_selects_whole_subtree() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("a3x", &index);
        assert_eq!(engine.check_state("a3"), CheckState::Indeterminate);

        // Indeterminate counts as unselected: the first toggle selects all.
        engine.toggle("a3", &index);
        assert_eq!(ids(&engine.selected()), ["a3", "a3x", "a3y"]);
        engine.toggle("a3", &index);
        assert!(engine.selected().is_empty());
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("a1", &index);
        engine.toggle("a3x", &index);
        let before = engine.clone();

        for id in ["a2", "a3y", "b", "a1"] {
            engine.toggle(id, &index);
            assert_disjoint(&engine);
            engine.toggle(id, &index);
            assert_eq!(engine, before, "toggling {id} twice");
        }
    }

    #[test]
    fn test_parent_state_matches_children_after_any_toggle() {
        let index = TreeIndex::from_cache(&sample_cache());
        let sequence = ["a3x", "a1", "a", "a2", "a3y", "a3", "b", "a3x", "a"];
        let mut engine = SelectionEngine::new();
        for id in sequence {
            engine.toggle(id, &index);
            assert_disjoint(&engine);
            for parent in ["a", "a3"] {
                let children = index.children_of(&LockKey::node(parent)).unwrap();
                let all = children.iter().all(|c| engine.is_selected(c));
                let some = children
                    .iter()
                    .any(|c| engine.is_selected(c) || engine.is_indeterminate(c));
                assert_eq!(engine.is_selected(parent), all, "{parent} after {id}");
                assert_eq!(engine.is_indeterminate(parent), some && !all, "{parent} after {id}");
            }
        }
    }

    #[test]
    fn test_remove_only_affects_selected() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        assert!(!engine.remove("a1", &index));
        assert!(engine.selected().is_empty());

        engine.toggle("a3x", &index);
        // a3 is indeterminate, not selected: nothing happens.
        assert!(!engine.remove("a3", &index));
        assert!(engine.is_selected("a3x"));

        assert!(engine.remove("a3x", &index));
        assert!(engine.selected().is_empty());
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_clear() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        assert!(!engine.clear());
        engine.toggle("a3x", &index);
        assert!(engine.clear());
        assert!(engine.selected().is_empty());
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_unknown_id_selected_alone() {
        let index = TreeIndex::from_cache(&sample_cache());
        let mut engine = SelectionEngine::new();
        engine.toggle("search-only", &index);
        assert_eq!(ids(&engine.selected()), ["search-only"]);
        assert!(engine.indeterminate().is_empty());
    }

    #[test]
    fn test_late_loaded_children_reclassified_on_next_cascade() {
        let mut cache = sample_cache();
        let index = TreeIndex::from_cache(&cache);
        let mut engine = SelectionEngine::new();
        engine.toggle("a", &index);
        assert!(engine.is_selected("a"));

        // a2's children arrive after the toggle and are not selected.
        cache.insert(
            LockKey::node("a2"),
            Arc::from(vec![TreeNode::new("a2x", "A2X"), TreeNode::new("a2y", "A2Y")]),
        );
        let index = TreeIndex::from_cache(&cache);
        assert!(engine.is_selected("a"));

        engine.toggle("a2x", &index);
        assert!(engine.is_indeterminate("a2"));
        assert!(engine.is_indeterminate("a"));
        assert!(!engine.is_selected("a"));
    }
}
