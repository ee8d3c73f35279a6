//! Tree flattening.
//!
//! Turns the cached, partially loaded tree (or the current search results)
//! into the ordered list of rows the presentation layer draws. Flattening is
//! a pure read: it never triggers loads and never mutates its inputs.

use std::collections::HashSet;

use crate::node::{LockKey, TreeNode};
use crate::search::LabelMatcher;
use crate::store::Cache;

/// A visible row in the flattened tree.
///
/// Rows are regenerated on every change; key them by `id`, never by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedRow {
    /// Node id.
    pub id: String,
    /// Node label.
    pub label: String,
    /// Depth in tree (0 = root level).
    pub depth: usize,
    /// Whether children are shown below this row.
    pub expanded: bool,
    /// Whether this node can be expanded.
    pub has_children: bool,
    /// Id of the parent row, `None` at root level.
    pub parent_id: Option<String>,
    /// Labels of all ancestors, root first.
    pub path: Vec<String>,
    /// Query active and this label does not match (drawn dimmed).
    pub hidden_by_search: bool,
    /// Query active and this label matches.
    pub search_match: bool,
}

/// Flattens the tree into visible rows.
///
/// With an empty `query` this walks `cache` from the root, descending only
/// into expanded nodes. Otherwise it walks `search_results` fully expanded and
/// flags each row against the query; no results yet means no rows.
pub fn flatten(
    cache: &Cache,
    search_results: Option<&[TreeNode]>,
    expanded: &HashSet<String>,
    query: &str,
) -> Vec<FlattenedRow> {
    if query.is_empty() {
        let mut walk = BrowseWalk {
            cache,
            expanded,
            path: Vec::new(),
            rows: Vec::new(),
        };
        if let Some(roots) = cache.get(&LockKey::Root) {
            walk.visit(roots, 0, None);
        }
        walk.rows
    } else {
        let mut walk = SearchWalk {
            matcher: LabelMatcher::new(query),
            path: Vec::new(),
            rows: Vec::new(),
        };
        if let Some(results) = search_results {
            walk.visit(results, 0, None);
        }
        walk.rows
    }
}

struct BrowseWalk<'a> {
    cache: &'a Cache,
    expanded: &'a HashSet<String>,
    path: Vec<String>,
    rows: Vec<FlattenedRow>,
}

impl BrowseWalk<'_> {
    fn visit(&mut self, nodes: &[TreeNode], depth: usize, parent_id: Option<&str>) {
        for node in nodes {
            let is_expanded = self.expanded.contains(&node.id);
            let loaded = self.cache.get(&LockKey::node(node.id.as_str()));
            let has_children =
                node.has_children() || loaded.is_some_and(|children| !children.is_empty());

            self.rows.push(FlattenedRow {
                id: node.id.clone(),
                label: node.label.clone(),
                depth,
                expanded: is_expanded,
                has_children,
                parent_id: parent_id.map(str::to_owned),
                path: self.path.clone(),
                hidden_by_search: false,
                search_match: false,
            });

            if let Some(children) = loaded.filter(|_| is_expanded) {
                self.path.push(node.label.clone());
                self.visit(children, depth + 1, Some(node.id.as_str()));
                self.path.pop();
            }
        }
    }
}

struct SearchWalk {
    matcher: LabelMatcher,
    path: Vec<String>,
    rows: Vec<FlattenedRow>,
}

impl SearchWalk {
    fn visit(&mut self, nodes: &[TreeNode], depth: usize, parent_id: Option<&str>) {
        for node in nodes {
            let search_match = self.matcher.is_match(&node.label);

            self.rows.push(FlattenedRow {
                id: node.id.clone(),
                label: node.label.clone(),
                depth,
                // Search results are always shown fully expanded.
                expanded: true,
                has_children: node.has_children(),
                parent_id: parent_id.map(str::to_owned),
                path: self.path.clone(),
                hidden_by_search: !search_match,
                search_match,
            });

            let children = node.children();
            if !children.is_empty() {
                self.path.push(node.label.clone());
                self.visit(children, depth + 1, Some(node.id.as_str()));
                self.path.pop();
            }
        }
    }
}
