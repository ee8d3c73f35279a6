//! Generated demo tree.

use std::time::Duration;

use treecombo::{MemoryProvider, TreeNode};

const ROOTS: usize = 100;
const CHILDREN: usize = 10;
const GRANDCHILDREN: usize = 5;

/// Round trip of a slow backend.
pub const LATENCY: Duration = Duration::from_millis(500);

/// Three levels: 100 roots, 10 children each, 5 grandchildren each.
pub fn tree() -> Vec<TreeNode> {
    (0..ROOTS)
        .map(|i| {
            let children = (0..CHILDREN)
                .map(|j| {
                    let leaves = (0..GRANDCHILDREN)
                        .map(|k| {
                            TreeNode::new(
                                format!("node-{i}-{j}-{k}"),
                                format!("Grandchild {i}-{j}-{k}"),
                            )
                        })
                        .collect();
                    TreeNode::new(format!("node-{i}-{j}"), format!("Child {i}-{j}"))
                        .with_children(leaves)
                })
                .collect();
            TreeNode::new(format!("node-{i}"), format!("Node {i}")).with_children(children)
        })
        .collect()
}

/// Provider serving [`tree`] with [`LATENCY`].
pub fn provider() -> MemoryProvider {
    MemoryProvider::new(tree()).with_latency(LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_shape() {
        let roots = tree();
        assert_eq!(roots.len(), ROOTS);
        assert_eq!(roots[0].children().len(), CHILDREN);
        assert_eq!(roots[0].children()[0].children().len(), GRANDCHILDREN);
        assert_eq!(roots[3].children()[2].children()[1].id, "node-3-2-1");
        assert_eq!(roots[3].label, "Node 3");
        assert_eq!(roots[3].children()[2].label, "Child 3-2");
        assert_eq!(roots[3].children()[2].children()[1].label, "Grandchild 3-2-1");
    }
}
