//! Value model: inline scalars plus an arena of shared containers.

mod graph;
mod value;

pub use graph::{Entries, Graph, Node, NodeId};
pub use value::{ExtData, Timestamp, Value, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};

/// A decoded document: the graph that owns its containers and the root value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub graph: Graph,
    pub root: Value,
}

impl Document {
    pub fn new(graph: Graph, root: Value) -> Self {
        Self { graph, root }
    }

    /// Resolves the root to its node, if it is a container.
    pub fn root_node(&self) -> Option<&Node> {
        self.graph.resolve(&self.root)
    }
}

/// Reserved extension type codes used by the codec itself.
pub mod ext {
    /// Packed 32/64-bit timestamp.
    pub const TIMESTAMP: i8 = -1;
    /// Back-reference to a container started earlier in the same stream.
    pub const CIRCULAR: i8 = -2;
}
