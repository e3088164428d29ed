use super::{traversal, Tree};
use crate::libs::phylo::error::PhyloError;
use crate::libs::phylo::node::NodeId;

/// Find the node carrying node number `num`.
pub fn get_node_by_num(tree: &Tree, num: usize) -> Option<NodeId> {
    tree.by_num.get(num).copied()
}

/// Find a node by name (first match in preorder).
pub fn get_node_by_name(tree: &Tree, name: &str) -> Option<NodeId> {
    let root = tree.get_root()?;
    traversal::preorder(tree, root)
        .into_iter()
        .find(|&id| tree.nodes[id].name.as_deref() == Some(name))
}

/// Check that two trees share topology and numbering:
/// same node count, same leaf name at every leaf number,
/// same parent number at every node number.
pub fn check_same_topology(tree: &Tree, other: &Tree) -> Result<(), PhyloError> {
    if tree.by_num.len() != other.by_num.len() {
        return Err(PhyloError::TopologyMismatch(format!(
            "{} nodes vs {} nodes",
            tree.by_num.len(),
            other.by_num.len()
        )));
    }

    for (num, (&a, &b)) in tree.by_num.iter().zip(other.by_num.iter()).enumerate() {
        let (na, nb) = (&tree.nodes[a], &other.nodes[b]);

        if na.is_leaf() != nb.is_leaf() || (na.is_leaf() && na.name != nb.name) {
            return Err(PhyloError::TopologyMismatch(format!(
                "node {} is {:?} vs {:?}",
                num,
                na.name.as_deref().unwrap_or("(internal)"),
                nb.name.as_deref().unwrap_or("(internal)")
            )));
        }

        let pa = na.parent.map(|p| tree.nodes[p].num);
        let pb = nb.parent.map(|p| other.nodes[p].num);
        if pa != pb {
            return Err(PhyloError::TopologyMismatch(format!(
                "parent of node {} is {:?} vs {:?}",
                num, pa, pb
            )));
        }
    }

    Ok(())
}
