use super::Tree;
use crate::libs::phylo::error::PhyloError;
use crate::libs::phylo::node::NodeId;
use std::collections::{BTreeSet, HashMap};

/// What to do when an outgroup is requested but cannot be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutgroupPolicy {
    /// Missing outgroup or a non-trifurcating root is an error
    #[default]
    Strict,
    /// Log a warning and keep the tree unpruned
    Lenient,
}

/// Taxa that root one of the three subtrees of an unrooted topology.
#[derive(Debug, Clone, Default)]
pub struct Outgroup {
    pub names: BTreeSet<String>,
    pub policy: OutgroupPolicy,
}

impl Outgroup {
    pub fn new<I, S>(names: I, policy: OutgroupPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            policy,
        }
    }
}

/// Add a child to a parent node.
/// Updates both parent's `children` list and child's `parent` field.
pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
    if parent_id == child_id {
        return Err("Cannot add node as child of itself".to_string());
    }
    if tree.get_node(parent_id).is_none() {
        return Err(format!("Parent node {} not found or deleted", parent_id));
    }
    if tree.get_node(child_id).is_none() {
        return Err(format!("Child node {} not found or deleted", child_id));
    }

    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(format!(
            "Node {} already has parent {}",
            child_id, old_parent
        ));
    }

    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);

    Ok(())
}

/// Soft remove a node with its whole subtree.
pub fn remove_node(tree: &mut Tree, id: NodeId) {
    if id >= tree.nodes.len() || tree.nodes[id].deleted {
        return;
    }

    if let Some(parent_id) = tree.nodes[id].parent {
        if let Some(parent) = tree.get_node_mut(parent_id) {
            parent.children.retain(|&child| child != id);
        }
    }

    let children = tree.nodes[id].children.clone();
    for child_id in children {
        remove_node(tree, child_id);
    }

    if let Some(node) = tree.get_node_mut(id) {
        node.deleted = true;
        node.children.clear();
        node.parent = None;
    }

    if tree.root == Some(id) {
        tree.root = None;
    }
}

/// Compact the tree by removing soft-deleted nodes and remapping IDs.
/// Relative order of the surviving nodes is kept, so IDs stay in preorder.
/// This invalidates all existing NodeIds held outside!
pub fn compact(tree: &mut Tree) {
    let mut old_to_new = HashMap::new();
    let mut new_nodes = Vec::with_capacity(tree.nodes.len());

    for old_node in &tree.nodes {
        if !old_node.deleted {
            let new_idx = new_nodes.len();
            old_to_new.insert(old_node.id, new_idx);

            let mut new_node = old_node.clone();
            new_node.id = new_idx;
            new_node.parent = None;
            new_node.children.clear();
            new_node.leftmost = None;
            new_node.rightmost = None;
            new_nodes.push(new_node);
        }
    }

    for node in tree.nodes.iter().filter(|n| !n.deleted) {
        let new_self_idx = old_to_new[&node.id];

        if let Some(old_parent) = node.parent {
            new_nodes[new_self_idx].parent = old_to_new.get(&old_parent).copied();
        }
        for old_child in &node.children {
            if let Some(&new_child) = old_to_new.get(old_child) {
                new_nodes[new_self_idx].children.push(new_child);
            }
        }
        new_nodes[new_self_idx].leftmost = node.leftmost.and_then(|l| old_to_new.get(&l).copied());
        new_nodes[new_self_idx].rightmost =
            node.rightmost.and_then(|r| old_to_new.get(&r).copied());
    }

    if let Some(old_root) = tree.root {
        tree.root = old_to_new.get(&old_root).copied();
    }

    tree.nodes = new_nodes;
}

/// Remove the root subtree that holds the outgroup.
///
/// Only an unrooted topology (a root with exactly three children) is pruned.
/// The first root child whose leftmost or rightmost leaf is an outgroup taxon goes,
/// then leaf counts, extreme leaves and node numbers are recomputed.
///
/// Returns `true` if a subtree was removed.
pub fn prune_outgroup(tree: &mut Tree, outgroup: &Outgroup) -> Result<bool, PhyloError> {
    let root = tree
        .get_root()
        .ok_or_else(|| PhyloError::LogicError("Tree has no root".to_string()))?;
    let children = tree.nodes[root].children.clone();

    let failure = if children.len() != 3 {
        PhyloError::NonTrifurcatingRoot(children.len())
    } else {
        let is_outgroup = |id: Option<NodeId>| {
            id.and_then(|leaf| tree.nodes[leaf].name.as_ref())
                .is_some_and(|name| outgroup.names.contains(name))
        };
        let found = children.iter().copied().find(|&child| {
            let node = &tree.nodes[child];
            is_outgroup(node.leftmost) || is_outgroup(node.rightmost)
        });

        match found {
            Some(child) => {
                let removed = tree.nodes[child].n_leaves;
                remove_node(tree, child);
                compact(tree);
                tree.finish();
                log::debug!("Pruned an outgroup subtree of {} leaves", removed);
                return Ok(true);
            }
            None => PhyloError::MissingOutgroup(
                outgroup.names.iter().cloned().collect::<Vec<_>>().join(","),
            ),
        }
    };

    match outgroup.policy {
        OutgroupPolicy::Strict => Err(failure),
        OutgroupPolicy::Lenient => {
            log::warn!("{}; outgroup kept", failure);
            Ok(false)
        }
    }
}
