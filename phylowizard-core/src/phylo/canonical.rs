use super::tree::{PhyloNode, PhyloTree};

/// Orders every node's children by the smallest leaf label below each child.
///
/// Children are made canonical first, so the result depends only on topology,
/// labels and lengths. The sort is stable and applying it twice is a no-op.
pub fn canonicalize(tree: &mut PhyloTree) {
    canonicalize_node(tree.root_mut());
}

fn canonicalize_node(node: &mut PhyloNode) {
    if node.is_leaf() {
        return;
    }
    for child in &mut node.children {
        canonicalize_node(child);
    }
    node.children.sort_by(|a, b| a.min_leaf_label().cmp(b.min_leaf_label()));
}

/// Removes names from internal nodes, leaving only leaf labels.
pub fn strip_internal_labels(tree: &mut PhyloTree) {
    fn strip(node: &mut PhyloNode) {
        if node.is_leaf() {
            return;
        }
        node.label = None;
        node.children.iter_mut().for_each(strip);
    }
    strip(tree.root_mut());
}
