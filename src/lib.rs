//! RefPack: a MessagePack-variant codec with shared and circular references.
//!
//! Values live in a [`Graph`] arena so that a container can be referenced from
//! several places, including from inside itself. The encoder writes each
//! container once and emits a short back-reference for every later
//! occurrence; the decoder rebuilds the same sharing.
//!
//! # Architecture
//!
//! - **`types`**: `Value`, the `Graph` arena, timestamps and raw extension data
//! - **`pack`**: Binary encoding/decoding, buffer and reference caches
//! - **`extension`**: `Extension` trait and registry for application types
//! - **`options`**: Codec configuration
//!
//! # Example
//!
//! ```
//! use refpack::{decode_value, encode_value, Graph, Node, Value};
//!
//! let mut graph = Graph::new();
//! let shared = graph.mapping([("x", Value::Integer(1))]);
//! let root = graph.sequence([shared.clone(), shared]);
//!
//! let bytes = encode_value(&graph, &root).unwrap();
//! let doc = decode_value(&bytes).unwrap();
//! let Some(Node::Sequence(items)) = doc.root_node() else { unreachable!() };
//! assert_eq!(items[0], items[1]);
//! ```

pub mod error;
pub mod extension;
pub mod options;
pub mod pack;
pub mod types;

pub use error::PackError;
pub use extension::{Extension, ExtensionRegistry};
pub use options::Options;
pub use pack::{decode_value, encode_value, ByteOrder, Decoder, Encoder};
pub use types::{Document, Entries, ExtData, Graph, Node, NodeId, Timestamp, Value};
