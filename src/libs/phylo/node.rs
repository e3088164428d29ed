/// NodeId is an index into the Tree's node vector.
/// Nodes are created in preorder, so before any pruning it is also the preorder rank.
pub type NodeId = usize;

/// One stretch of a branch spent in a single character state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub state: char,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// List of child node IDs, in input order
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Leaf name (e.g., "human"); internal nodes usually have none
    pub name: Option<String>,

    /// Character state at this node
    pub state: Option<char>,

    /// Time from the nearest event (or the parent) down to the node
    pub time: Option<f64>,

    /// Intermediate `(state, time)` pairs in written order, nearest to the node first
    pub events: Vec<(char, f64)>,

    // --- Derived by Tree::finish ---
    /// Stable cross-run number: leaves first, internal nodes after
    pub num: usize,

    /// Number of leaves below (1 for a leaf)
    pub n_leaves: usize,

    /// Leftmost and rightmost leaf of the subtree
    pub leftmost: Option<NodeId>,
    pub rightmost: Option<NodeId>,

    /// Soft deletion flag.
    /// Use Tree::compact() to permanently remove deleted nodes.
    pub deleted: bool,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            state: None,
            time: None,
            events: Vec::new(),
            num: 0,
            n_leaves: 0,
            leftmost: None,
            rightmost: None,
            deleted: false,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Branch length: all recorded durations summed
    pub fn length(&self) -> f64 {
        self.time.unwrap_or(0.0) + self.events.iter().map(|e| e.1).sum::<f64>()
    }

    /// Chronological event path from the parent's state toward this node.
    ///
    /// The first segment carries `parent_state`; each later segment carries the
    /// state entered at the previous event. The node's own state is reached at the
    /// very end and owns no time of its own.
    ///
    /// ```
    /// use pbsub::libs::phylo::node::{Node, Segment};
    ///
    /// // C_A:0.3:A:0.1:T:0.1:T below a parent in state T
    /// let mut node = Node::new(0);
    /// node.state = Some('A');
    /// node.time = Some(0.3);
    /// node.events = vec![('A', 0.1), ('T', 0.1)];
    ///
    /// let path = node.event_path('T');
    /// let states: Vec<char> = path.iter().map(|s| s.state).collect();
    /// assert_eq!(states, vec!['T', 'T', 'A']);
    /// ```
    pub fn event_path(&self, parent_state: char) -> Vec<Segment> {
        let mut states = vec![parent_state];
        states.extend(self.events.iter().rev().map(|e| e.0));

        let mut durations: Vec<f64> = self.events.iter().rev().map(|e| e.1).collect();
        durations.push(self.time.unwrap_or(0.0));

        states
            .into_iter()
            .zip(durations)
            .map(|(state, duration)| Segment { state, duration })
            .collect()
    }
}
