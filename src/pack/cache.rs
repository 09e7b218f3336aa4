//! Per-call reference caches for circular and shared containers.

use std::collections::HashMap;

use super::buffer::ByteOrder;
use super::marker;
use crate::error::PackError;
use crate::types::{ext, NodeId, Value};

/// Pre-encoded back-reference frame: fixext marker, type byte, 1/2/4-byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackRef {
    bytes: [u8; 6],
    len: u8,
}

impl BackRef {
    /// Builds the frame pointing at `offset`, choosing the narrowest width.
    pub fn new(offset: usize, order: ByteOrder) -> Result<Self, PackError> {
        let mut bytes = [0u8; 6];
        bytes[1] = ext::CIRCULAR as u8;
        let len = if offset < 0x100 {
            bytes[0] = marker::FIXEXT_1;
            bytes[2] = offset as u8;
            3
        } else if offset < 0x10000 {
            bytes[0] = marker::FIXEXT_2;
            let v = offset as u16;
            bytes[2..4].copy_from_slice(&match order {
                ByteOrder::BigEndian => v.to_be_bytes(),
                ByteOrder::LittleEndian => v.to_le_bytes(),
            });
            4
        } else {
            let v = u32::try_from(offset).map_err(|_| PackError::LengthOverflow {
                kind: "back-reference offset",
                len: offset,
            })?;
            bytes[0] = marker::FIXEXT_4;
            bytes[2..6].copy_from_slice(&match order {
                ByteOrder::BigEndian => v.to_be_bytes(),
                ByteOrder::LittleEndian => v.to_le_bytes(),
            });
            6
        };
        Ok(Self { bytes, len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

/// Encode side: node identity → back-reference frame for later occurrences.
#[derive(Debug, Default)]
pub struct EncodeCache {
    entries: HashMap<NodeId, BackRef>,
}

impl EncodeCache {
    pub fn get(&self, id: NodeId) -> Option<&BackRef> {
        self.entries.get(&id)
    }

    /// Records that `id` starts at `offset` in the current output.
    pub fn record(&mut self, id: NodeId, offset: usize, order: ByteOrder) -> Result<(), PackError> {
        self.entries.insert(id, BackRef::new(offset, order)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Decode side: start offset of a frame → the value decoded (or being decoded) there.
#[derive(Debug, Default)]
pub struct DecodeCache {
    entries: HashMap<usize, Value>,
}

impl DecodeCache {
    pub fn insert(&mut self, offset: usize, value: Value) {
        self.entries.insert(offset, value);
    }

    pub fn get(&self, offset: usize) -> Option<&Value> {
        self.entries.get(&offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_ref_widths() {
        let small = BackRef::new(0x10, ByteOrder::BigEndian).unwrap();
        assert_eq!(small.as_bytes(), &[marker::FIXEXT_1, 0xFE, 0x10]);

        let medium = BackRef::new(0x1234, ByteOrder::BigEndian).unwrap();
        assert_eq!(medium.as_bytes(), &[marker::FIXEXT_2, 0xFE, 0x12, 0x34]);

        let large = BackRef::new(0x0001_0000, ByteOrder::BigEndian).unwrap();
        assert_eq!(large.as_bytes(), &[marker::FIXEXT_4, 0xFE, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn back_ref_little_endian_offset() {
        let r = BackRef::new(0x1234, ByteOrder::LittleEndian).unwrap();
        assert_eq!(r.as_bytes(), &[marker::FIXEXT_2, 0xFE, 0x34, 0x12]);
    }

    #[test]
    fn encode_cache_records_and_clears() {
        let mut cache = EncodeCache::default();
        let id = NodeId::new(4);
        cache.record(id, 9, ByteOrder::BigEndian).unwrap();
        assert_eq!(cache.get(id).map(BackRef::as_bytes), Some(&[0xD4, 0xFE, 9][..]));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn decode_cache_lookup_by_offset() {
        let mut cache = DecodeCache::default();
        cache.insert(3, Value::Ref(NodeId::new(0)));
        assert_eq!(cache.get(3), Some(&Value::Ref(NodeId::new(0))));
        assert_eq!(cache.get(4), None);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
