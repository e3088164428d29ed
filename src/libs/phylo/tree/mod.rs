pub mod io;
pub mod ops;
pub mod query;
pub mod stat;
pub mod traversal;

use super::error::PhyloError;
use super::node::{Node, NodeId, Segment};

pub use ops::{Outgroup, OutgroupPolicy};

#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,

    /// Node number -> node ID, filled by `finish`
    pub(super) by_num: Vec<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id));
        id
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.deleted)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.deleted)
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// Number of leaves under the root
    pub fn n_leaves(&self) -> usize {
        self.root.map_or(0, |r| self.nodes[r].n_leaves)
    }

    /// Number of branches, one per non-root node
    pub fn n_branches(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Recompute leaf counts, extreme leaves and node numbers.
    /// Must run after any change of topology.
    pub fn finish(&mut self) {
        stat::update_leaf_info(self);
        stat::assign_numbers(self);
        self.by_num = traversal::by_num(self);
    }

    /// Event path of the branch above `id`, starting at the parent's state.
    pub fn event_path(&self, id: NodeId) -> Result<Vec<Segment>, PhyloError> {
        let node = self
            .get_node(id)
            .ok_or_else(|| PhyloError::LogicError(format!("Node {} not found", id)))?;
        let parent = node
            .parent
            .ok_or_else(|| PhyloError::LogicError("The root owns no branch".to_string()))?;
        let parent_state = self.nodes[parent].state.ok_or_else(|| {
            PhyloError::LogicError(format!("Parent of node {} has no state", node.num))
        })?;
        Ok(node.event_path(parent_state))
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn remove_node(&mut self, id: NodeId) {
        ops::remove_node(self, id)
    }

    pub fn compact(&mut self) {
        ops::compact(self)
    }

    pub fn prune_outgroup(&mut self, outgroup: &Outgroup) -> Result<bool, PhyloError> {
        ops::prune_outgroup(self, outgroup)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start_node: &NodeId) -> Vec<NodeId> {
        traversal::preorder(self, *start_node)
    }

    pub fn postorder(&self, start_node: &NodeId) -> Vec<NodeId> {
        traversal::postorder(self, *start_node)
    }

    pub fn branches(&self) -> Vec<(NodeId, NodeId)> {
        traversal::branches(self)
    }

    // --- Delegation to query ---

    pub fn get_node_by_num(&self, num: usize) -> Option<NodeId> {
        query::get_node_by_num(self, num)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        query::get_node_by_name(self, name)
    }

    pub fn check_same_topology(&self, other: &Tree) -> Result<(), PhyloError> {
        query::check_same_topology(self, other)
    }

    // --- Delegation to stat ---

    pub fn get_leaves(&self) -> Vec<NodeId> {
        self.root
            .map_or_else(Vec::new, |root| stat::get_leaves(self, root))
    }

    // --- Delegation to io ---

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }

    pub fn to_newick_with<F>(&self, value: F) -> String
    where
        F: Fn(&Node) -> Option<f64>,
    {
        io::to_newick_with(self, value)
    }

    pub fn to_path_table(&self) -> String {
        io::to_path_table(self)
    }
}
