//! The binary format.
//!
//! A MessagePack variant: the standard markers, plus a timestamp extension
//! (type -1) and a back-reference extension (type -2) whose payload is the
//! byte offset of a container already written in the same message. Multi-byte
//! fields use the configured [`ByteOrder`]; timestamp payloads are always
//! big-endian.

pub mod buffer;
pub mod cache;
pub mod decode;
pub mod encode;
pub mod marker;
pub mod timestamp;


pub use buffer::{ByteOrder, GrowableBuffer};
pub use decode::{decode_value, Decoder};
pub use encode::{encode_value, Encoder};
