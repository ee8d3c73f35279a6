//! In-memory provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::DataProvider;
use crate::error::LoadError;
use crate::node::TreeNode;
use crate::search::LabelMatcher;

/// Serves a complete tree held in memory, optionally with simulated latency.
///
/// Child loads return nodes without their subtrees (expandability kept as a
/// hint), so the engine has to load each level lazily just as it would
/// against a remote backend. Searches return the matching subtrees pruned to
/// matches and their ancestors.
///
/// # Example
///
/// ```
/// use treecombo::{MemoryProvider, TreeNode};
///
/// let provider = MemoryProvider::new(vec![
///     TreeNode::new("fruit", "Fruit").with_children(vec![TreeNode::new("apple", "Apple")]),
/// ]);
/// assert_eq!(provider.roots().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    roots: Arc<Vec<TreeNode>>,
    latency: Duration,
}

impl MemoryProvider {
    /// Creates a provider serving `roots` without latency.
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self {
            roots: Arc::new(roots),
            latency: Duration::ZERO,
        }
    }

    /// Parses a JSON array of nested nodes.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Delays every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The full tree.
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    fn find<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
        for node in nodes {
            if node.id == id {
                return Some(node);
            }
            if let Some(found) = Self::find(node.children(), id) {
                return Some(found);
            }
        }
        None
    }

    fn prune(nodes: &[TreeNode], matcher: &mut LabelMatcher) -> Vec<TreeNode> {
        let mut result = Vec::new();
        for node in nodes {
            let matches = matcher.is_match(&node.label);
            let children = Self::prune(node.children(), matcher);
            if matches || !children.is_empty() {
                result.push(TreeNode {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    children: (!children.is_empty()).then_some(children),
                    has_children: node.has_children,
                });
            }
        }
        result
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn load(
        &self,
        parent_id: Option<&str>,
        query: &str,
    ) -> Result<Vec<TreeNode>, LoadError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if !query.is_empty() {
            let mut matcher = LabelMatcher::new(query);
            return Ok(Self::prune(&self.roots, &mut matcher));
        }

        let level = match parent_id {
            None => self.roots.as_slice(),
            Some(id) => Self::find(&self.roots, id)
                .map(TreeNode::children)
                .unwrap_or_default(),
        };
        Ok(level.iter().map(TreeNode::detached).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryProvider {
        MemoryProvider::new(vec![
            TreeNode::new("n0", "Node 0").with_children(vec![
                TreeNode::new("n0-0", "Child 0-0")
                    .with_children(vec![TreeNode::new("n0-0-0", "Grandchild 0-0-0")]),
                TreeNode::new("n0-1", "Child 0-1"),
            ]),
            TreeNode::new("n1", "Node 1"),
        ])
    }

    #[tokio::test]
    async fn test_root_level_is_detached() {
        let roots = provider().load(None, "").await.unwrap();
        assert_eq!(roots.len(), 2);
        assert!(roots[0].children.is_none());
        assert_eq!(roots[0].has_children, Some(true));
        assert_eq!(roots[1].has_children, Some(false));
    }

    #[tokio::test]
    async fn test_child_level() {
        let children = provider().load(Some("n0-0"), "").await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "n0-0-0");
        assert!(provider().load(Some("missing"), "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_prunes_to_matches_and_ancestors() {
        let results = provider().load(None, "GRANDCHILD").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "n0");
        let children = results[0].children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "n0-0");
        assert_eq!(children[0].children()[0].id, "n0-0-0");
    }

    #[test]
    fn test_from_json() {
        let provider = MemoryProvider::from_json(
            r#"[{ "id": "a", "label": "A", "children": [{ "id": "b", "label": "B" }] }]"#,
        )
        .unwrap();
        assert_eq!(provider.roots()[0].children()[0].id, "b");
        assert!(matches!(
            MemoryProvider::from_json("not json"),
            Err(LoadError::Json(_))
        ));
    }
}
