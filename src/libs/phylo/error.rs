use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhyloError {
    /// Malformed mapping line
    ParseError {
        /// A human-readable message explaining the error
        message: String,
        /// The line number (1-based)
        line: usize,
        /// The column number (1-based)
        column: usize,
        /// The snippet of input where the error occurred
        snippet: String,
    },
    /// Co-indexed trees disagree on node count, leaf names or parents
    TopologyMismatch(String),
    /// No root subtree carries an outgroup leaf
    MissingOutgroup(String),
    /// Outgroup pruning needs a root with exactly three children
    NonTrifurcatingRoot(usize),
    /// Logical error (e.g., summarizing an empty tree)
    LogicError(String),
}

impl fmt::Display for PhyloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhyloError::ParseError {
                message,
                line,
                column,
                snippet,
            } => {
                write!(
                    f,
                    "Parse error at line {}, column {}:\n{}\nSnippet: \"{}\"",
                    line, column, message, snippet
                )
            }
            PhyloError::TopologyMismatch(msg) => write!(f, "Topology mismatch: {}", msg),
            PhyloError::MissingOutgroup(names) => {
                write!(f, "No root subtree contains an outgroup taxon ({})", names)
            }
            PhyloError::NonTrifurcatingRoot(n) => write!(
                f,
                "Outgroup pruning needs a trifurcating root, found {} children",
                n
            ),
            PhyloError::LogicError(msg) => write!(f, "Tree logic error: {}", msg),
        }
    }
}

impl std::error::Error for PhyloError {}
