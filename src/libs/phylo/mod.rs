pub mod error;
pub mod node;
pub mod parser;
pub mod tree;

pub use error::PhyloError;
pub use node::{Node, NodeId, Segment};
pub use tree::{Outgroup, OutgroupPolicy, Tree};
