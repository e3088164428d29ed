use super::Tree;
use crate::libs::phylo::node::NodeId;

/// Get node IDs in preorder traversal (Root -> Children)
pub fn preorder(tree: &Tree, start_node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut stack = vec![start_node];

    while let Some(id) = stack.pop() {
        if let Some(node) = tree.get_node(id) {
            result.push(id);
            // Push children in reverse order so they are processed in order
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }

    result
}

/// Get node IDs in postorder traversal (Children -> Root)
pub fn postorder(tree: &Tree, start_node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();

    fn helper(tree: &Tree, id: NodeId, result: &mut Vec<NodeId>) {
        if let Some(node) = tree.get_node(id) {
            for &child in &node.children {
                helper(tree, child, result);
            }
            result.push(id);
        }
    }

    helper(tree, start_node, &mut result);
    result
}

/// Node IDs ordered by node number; position `k` holds the node numbered `k`.
pub fn by_num(tree: &Tree) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = tree
        .nodes
        .iter()
        .filter(|n| !n.deleted)
        .map(|n| n.id)
        .collect();
    ids.sort_by_key(|&id| tree.nodes[id].num);
    ids
}

/// Branches in node-number order, as `(child, parent)` pairs.
/// The root closes the numbering and owns no branch.
pub fn branches(tree: &Tree) -> Vec<(NodeId, NodeId)> {
    by_num(tree)
        .into_iter()
        .filter_map(|id| tree.nodes[id].parent.map(|p| (id, p)))
        .collect()
}
