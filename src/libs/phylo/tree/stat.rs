use super::{traversal, Tree};
use crate::libs::phylo::node::NodeId;

/// Get IDs of all leaves in subtree rooted at `id`, left to right.
pub fn get_leaves(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    traversal::preorder(tree, id)
        .into_iter()
        .filter(|&n| tree.nodes[n].is_leaf())
        .collect()
}

/// Postorder pass filling leaf counts and the extreme leaves of every subtree.
pub fn update_leaf_info(tree: &mut Tree) {
    let Some(root) = tree.get_root() else {
        return;
    };

    for id in traversal::postorder(tree, root) {
        let children = &tree.nodes[id].children;
        let (n_leaves, leftmost, rightmost) = match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => (
                children.iter().map(|&c| tree.nodes[c].n_leaves).sum(),
                tree.nodes[first].leftmost,
                tree.nodes[last].rightmost,
            ),
            _ => (1, Some(id), Some(id)),
        };

        let node = &mut tree.nodes[id];
        node.n_leaves = n_leaves;
        node.leftmost = leftmost;
        node.rightmost = rightmost;
    }
}

/// Number leaves 0..L-1 in preorder, then internal nodes L.. in reverse preorder.
/// The root always gets the last number.
pub fn assign_numbers(tree: &mut Tree) {
    let Some(root) = tree.get_root() else {
        return;
    };

    let order = traversal::preorder(tree, root);
    let (leaves, internals): (Vec<NodeId>, Vec<NodeId>) =
        order.into_iter().partition(|&id| tree.nodes[id].is_leaf());

    let n_leaves = leaves.len();
    for (num, id) in leaves.into_iter().enumerate() {
        tree.nodes[id].num = num;
    }
    for (k, id) in internals.into_iter().rev().enumerate() {
        tree.nodes[id].num = n_leaves + k;
    }
}
