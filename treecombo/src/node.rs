//! Tree node and lock key types.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A node as supplied by a [`DataProvider`](crate::provider::DataProvider).
///
/// `children` is only present when the provider supplies a subtree eagerly
/// (search results do). Otherwise `has_children` hints whether the node can
/// be expanded before its children are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Globally unique identifier.
    pub id: String,
    /// Display label, also the text searched against.
    pub label: String,
    /// Eagerly supplied children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    /// Expandability hint for nodes whose children are not loaded yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
}

impl TreeNode {
    /// Creates a leaf node with no hint.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: None,
            has_children: None,
        }
    }

    /// Attaches eagerly supplied children.
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Sets the expandability hint.
    pub fn with_has_children(mut self, has_children: bool) -> Self {
        self.has_children = Some(has_children);
        self
    }

    /// Eagerly supplied children, empty when none were supplied.
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether the node can be expanded.
    ///
    /// Non-empty `children` imply true regardless of the hint.
    pub fn has_children(&self) -> bool {
        !self.children().is_empty() || self.has_children.unwrap_or(false)
    }

    /// A copy of this node without its subtree, keeping expandability as a hint.
    pub fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            children: None,
            has_children: Some(self.has_children()),
        }
    }
}

/// Identifies one set of children in the cache and the loading set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LockKey {
    /// The top level of the tree.
    Root,
    /// The children of a node.
    Node(String),
    /// An in-flight search for a query. Never a cache key.
    Search(String),
}

impl LockKey {
    /// Lock key for a node's children.
    pub fn node(id: impl Into<String>) -> Self {
        Self::Node(id.into())
    }

    /// The `parent_id` argument handed to the provider for this key.
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Node(id) => Some(id),
            Self::Root | Self::Search(_) => None,
        }
    }

    /// The `query` argument handed to the provider for this key.
    pub fn query(&self) -> &str {
        match self {
            Self::Search(query) => query,
            Self::Root | Self::Node(_) => "",
        }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Node(id) => write!(f, "{id}"),
            Self::Search(query) => write!(f, "search:{query}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_imply_has_children() {
        let node = TreeNode::new("a", "A")
            .with_has_children(false)
            .with_children(vec![TreeNode::new("b", "B")]);
        assert!(node.has_children());
        assert!(!TreeNode::new("c", "C").has_children());
        assert!(TreeNode::new("d", "D").with_has_children(true).has_children());
    }

    #[test]
    fn test_camel_case_json() {
        let node: TreeNode =
            serde_json::from_str(r#"{ "id": "n1", "label": "Node 1", "hasChildren": true }"#)
                .unwrap();
        assert_eq!(node.has_children, Some(true));
        assert!(node.children.is_none());
    }

    #[test]
    fn test_lock_key_provider_arguments() {
        assert_eq!(LockKey::Root.parent_id(), None);
        assert_eq!(LockKey::node("x").parent_id(), Some("x"));
        assert_eq!(LockKey::Search("q".into()).parent_id(), None);
        assert_eq!(LockKey::Search("q".into()).query(), "q");
        assert_eq!(LockKey::node("x").query(), "");
    }
}
