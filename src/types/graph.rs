//! Arena of reference values.
//!
//! Containers are addressed by [`NodeId`] rather than owned inline, so a
//! document can share a container between several parents or contain cycles.
//! A node's id never changes once allocated.

use std::collections::HashSet;
use std::fmt;

use super::value::{Value, MAX_SAFE_INTEGER};

/// Ordered key/value pairs of a mapping. Duplicate keys are kept as given.
pub type Entries = Vec<(String, Value)>;

/// Identity of a node within a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A reference value stored in a [`Graph`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Sequence(Vec<Value>),
    Mapping(Entries),
    Binary(Vec<u8>),
}

/// Owner of every container in a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a node and returns its id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocates a sequence and returns a reference to it.
    pub fn sequence(&mut self, items: impl IntoIterator<Item = Value>) -> Value {
        Value::Ref(self.insert(Node::Sequence(items.into_iter().collect())))
    }

    /// Allocates a mapping and returns a reference to it.
    pub fn mapping<K: Into<String>>(&mut self, entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Ref(self.insert(Node::Mapping(entries)))
    }

    /// Allocates a binary buffer and returns a reference to it.
    pub fn binary(&mut self, bytes: Vec<u8>) -> Value {
        Value::Ref(self.insert(Node::Binary(bytes)))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Resolves a `Ref` value to its node.
    pub fn resolve(&self, value: &Value) -> Option<&Node> {
        match value {
            Value::Ref(id) => self.get(*id),
            _ => None,
        }
    }

    /// Appends an item to a sequence. Returns false if `id` is not a sequence.
    pub fn push(&mut self, id: NodeId, value: Value) -> bool {
        match self.get_mut(id) {
            Some(Node::Sequence(items)) => {
                items.push(value);
                true
            }
            _ => false,
        }
    }

    /// Appends an entry to a mapping. Returns false if `id` is not a mapping.
    pub fn set(&mut self, id: NodeId, key: impl Into<String>, value: Value) -> bool {
        match self.get_mut(id) {
            Some(Node::Mapping(entries)) => {
                entries.push((key.into(), value));
                true
            }
            _ => false,
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Structural comparison of `a` in this graph against `b` in `other`.
    ///
    /// References are followed on both sides; a pair of nodes already under
    /// comparison is assumed equal, so cyclic graphs terminate. Numbers compare
    /// by value, so `Integer(2)` equals `Float(2.0)`. Sharing is not compared:
    /// a node referenced twice matches two distinct equal nodes.
    pub fn same_shape(&self, a: &Value, other: &Graph, b: &Value) -> bool {
        let mut seen = HashSet::new();
        shape_eq(self, a, other, b, &mut seen)
    }
}

fn shape_eq(
    ga: &Graph,
    a: &Value,
    gb: &Graph,
    b: &Value,
    seen: &mut HashSet<(NodeId, NodeId)>,
) -> bool {
    match (a, b) {
        (Value::Ref(x), Value::Ref(y)) => {
            if !seen.insert((*x, *y)) {
                return true;
            }
            match (ga.get(*x), gb.get(*y)) {
                (Some(Node::Sequence(xs)), Some(Node::Sequence(ys))) => {
                    xs.len() == ys.len()
                        && xs.iter().zip(ys).all(|(x, y)| shape_eq(ga, x, gb, y, seen))
                }
                (Some(Node::Mapping(xs)), Some(Node::Mapping(ys))) => {
                    xs.len() == ys.len()
                        && xs
                            .iter()
                            .zip(ys)
                            .all(|((kx, x), (ky, y))| kx == ky && shape_eq(ga, x, gb, y, seen))
                }
                (Some(Node::Binary(xs)), Some(Node::Binary(ys))) => xs == ys,
                _ => false,
            }
        }
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
            i.unsigned_abs() <= MAX_SAFE_INTEGER as u64 && *i as f64 == *f
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_order() {
        let mut graph = Graph::new();
        let a = graph.sequence([]);
        let b = graph.binary(vec![1, 2]);
        assert_eq!(a, Value::Ref(NodeId::new(0)));
        assert_eq!(b, Value::Ref(NodeId::new(1)));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn push_and_set_check_node_kind() {
        let mut graph = Graph::new();
        let seq = graph.insert(Node::Sequence(Vec::new()));
        let map = graph.insert(Node::Mapping(Vec::new()));
        assert!(graph.push(seq, Value::Null));
        assert!(!graph.push(map, Value::Null));
        assert!(graph.set(map, "k", Value::Integer(1)));
        assert!(!graph.set(seq, "k", Value::Integer(1)));
        assert_eq!(graph.get(seq), Some(&Node::Sequence(vec![Value::Null])));
    }

    #[test]
    fn same_shape_terminates_on_cycles() {
        let mut left = Graph::new();
        let a = left.insert(Node::Sequence(Vec::new()));
        left.push(a, Value::Ref(a));

        let mut right = Graph::new();
        right.binary(vec![0]);
        let b = right.insert(Node::Sequence(Vec::new()));
        right.push(b, Value::Ref(b));

        assert!(left.same_shape(&Value::Ref(a), &right, &Value::Ref(b)));
    }

    #[test]
    fn same_shape_compares_numbers_by_value() {
        let graph = Graph::new();
        assert!(graph.same_shape(&Value::Integer(2), &graph, &Value::Float(2.0)));
        assert!(!graph.same_shape(&Value::Integer(2), &graph, &Value::Float(2.5)));
        assert!(!graph.same_shape(&Value::Integer(2), &graph, &Value::String("2".into())));
    }

    #[test]
    fn same_shape_detects_key_mismatch() {
        let mut graph = Graph::new();
        let x = graph.mapping([("a", Value::Integer(1))]);
        let y = graph.mapping([("b", Value::Integer(1))]);
        assert!(!graph.same_shape(&x, &graph, &y));
    }
}
