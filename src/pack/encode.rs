//! Encoding: `Value` graph → bytes.

use std::collections::HashSet;

use bytes::Bytes;

use super::buffer::GrowableBuffer;
use super::cache::EncodeCache;
use super::{marker, timestamp};
use crate::error::PackError;
use crate::options::Options;
use crate::types::{
    ext, Document, Entries, Graph, Node, NodeId, Timestamp, Value, MAX_SAFE_INTEGER,
    MIN_SAFE_INTEGER,
};

/// Encodes a value with default options.
pub fn encode_value(graph: &Graph, value: &Value) -> Result<Bytes, PackError> {
    Encoder::default().encode(graph, value)
}

/// Reusable encoder. Owns its output buffer and identity cache; both are
/// reset at the end of every [`encode`](Self::encode) call.
#[derive(Debug)]
pub struct Encoder {
    options: Options,
    buf: GrowableBuffer,
    cache: EncodeCache,
    // Nodes on the current path; only tracked when circular references are off.
    active: HashSet<NodeId>,
    depth: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Encoder {
    pub fn new(options: Options) -> Self {
        Self {
            buf: GrowableBuffer::new(options.buffer_size()),
            options,
            cache: EncodeCache::default(),
            active: HashSet::new(),
            depth: 0,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Encodes `value`, resolving references against `graph`.
    pub fn encode(&mut self, graph: &Graph, value: &Value) -> Result<Bytes, PackError> {
        let result = match value {
            Value::Undefined => Err(PackError::UnencodableValue(
                "undefined has no encoding at the top level".into(),
            )),
            _ => self.encode_value(graph, value),
        };

        self.cache.clear();
        self.active.clear();
        self.depth = 0;

        match result {
            Ok(()) => {
                let out = self.buf.finish();
                tracing::trace!(len = out.len(), "encoded value");
                Ok(out)
            }
            Err(e) => {
                self.buf.reset();
                tracing::debug!(error = %e, "encode failed");
                Err(e)
            }
        }
    }

    /// Encodes the root of a document.
    pub fn encode_document(&mut self, doc: &Document) -> Result<Bytes, PackError> {
        self.encode(&doc.graph, &doc.root)
    }

    fn encode_value(&mut self, graph: &Graph, value: &Value) -> Result<(), PackError> {
        match value {
            // Holes inside a sequence keep their position as null.
            Value::Undefined | Value::Null => self.encode_nil(),
            Value::Boolean(b) => self.encode_bool(*b),
            Value::Integer(i) => self.encode_int(*i),
            Value::Float(f) => self.encode_number(*f),
            Value::BigInt(i) => self.encode_bigint(*i)?,
            Value::String(s) => self.encode_str(s)?,
            Value::Timestamp(ts) => {
                if !self.encode_custom(graph, value)? {
                    self.encode_timestamp(ts)?;
                }
            }
            Value::Extension(data) => {
                if !self.encode_custom(graph, value)? {
                    self.encode_ext(data.type_code, &data.data)?;
                }
            }
            Value::Ref(id) => self.encode_ref(graph, *id)?,
        }
        Ok(())
    }

    fn encode_nil(&mut self) {
        self.buf.write_u8(marker::NIL);
    }

    fn encode_bool(&mut self, value: bool) {
        self.buf.write_u8(if value { marker::TRUE } else { marker::FALSE });
    }

    /// Integers inside the float64-safe range take the smallest form; wider
    /// ones keep full precision in the 64-bit forms.
    fn encode_int(&mut self, value: i64) {
        let order = self.options.byte_order();
        if (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
            self.encode_safe_int(value);
        } else if value >= 0 {
            self.buf.write_u8(marker::UINT_64);
            self.buf.write_u64(value as u64, order);
        } else {
            self.buf.write_u8(marker::INT_64);
            self.buf.write_i64(value, order);
        }
    }

    fn encode_number(&mut self, value: f64) {
        if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER as f64 {
            self.encode_safe_int(value as i64);
        } else {
            self.encode_f64(value);
        }
    }

    fn encode_safe_int(&mut self, value: i64) {
        let order = self.options.byte_order();
        if value >= 0 {
            if value <= i64::from(marker::POSITIVE_FIXINT_MAX) {
                self.buf.write_u8(value as u8);
            } else if value < 0x100 {
                self.buf.write_u8(marker::UINT_8);
                self.buf.write_u8(value as u8);
            } else if value < 0x1_0000 {
                self.buf.write_u8(marker::UINT_16);
                self.buf.write_u16(value as u16, order);
            } else if value < 0x1_0000_0000 {
                self.buf.write_u8(marker::UINT_32);
                self.buf.write_u32(value as u32, order);
            } else {
                self.encode_f64(value as f64);
            }
        } else if value >= -0x20 {
            // Negative fixint: the byte's two's complement is the value.
            self.buf.write_u8(value as i8 as u8);
        } else if value >= -0x80 {
            self.buf.write_u8(marker::INT_8);
            self.buf.write_i8(value as i8);
        } else if value >= -0x8000 {
            self.buf.write_u8(marker::INT_16);
            self.buf.write_i16(value as i16, order);
        } else if value >= -0x8000_0000 {
            self.buf.write_u8(marker::INT_32);
            self.buf.write_i32(value as i32, order);
        } else {
            self.encode_f64(value as f64);
        }
    }

    fn encode_f64(&mut self, value: f64) {
        self.buf.write_u8(marker::FLOAT_64);
        self.buf.write_f64(value, self.options.byte_order());
    }

    /// Big integers always use the 64-bit forms, even for small magnitudes.
    fn encode_bigint(&mut self, value: i128) -> Result<(), PackError> {
        let order = self.options.byte_order();
        if value >= 0 {
            let v = u64::try_from(value).map_err(|_| PackError::IntegerOverflow(value))?;
            self.buf.write_u8(marker::UINT_64);
            self.buf.write_u64(v, order);
        } else {
            let v = i64::try_from(value).map_err(|_| PackError::IntegerOverflow(value))?;
            self.buf.write_u8(marker::INT_64);
            self.buf.write_i64(v, order);
        }
        Ok(())
    }

    /// Encodes a string (size = byte length, not char count).
    fn encode_str(&mut self, value: &str) -> Result<(), PackError> {
        let len = value.len();
        let order = self.options.byte_order();
        if len <= marker::FIXSTR_MAX_LEN {
            self.buf.write_u8(marker::FIXSTR | len as u8);
        } else if len < 0x100 {
            self.buf.write_u8(marker::STR_8);
            self.buf.write_u8(len as u8);
        } else if len < 0x1_0000 {
            self.buf.write_u8(marker::STR_16);
            self.buf.write_u16(len as u16, order);
        } else {
            let len = len_u32("string", len)?;
            self.buf.write_u8(marker::STR_32);
            self.buf.write_u32(len, order);
        }
        self.buf.write_str(value);
        Ok(())
    }

    /// Offers the value to the registered extensions. Returns true if one claimed it.
    fn encode_custom(&mut self, graph: &Graph, value: &Value) -> Result<bool, PackError> {
        if self.options.extension_registry().is_empty() {
            return Ok(false);
        }
        match self.options.extension_registry().encode(value, graph) {
            Some((code, data)) => {
                self.encode_ext(code, &data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn encode_timestamp(&mut self, ts: &Timestamp) -> Result<(), PackError> {
        let packed = timestamp::pack(ts)?;
        self.encode_ext(ext::TIMESTAMP, packed.as_bytes())
    }

    /// Writes an extension frame. 16-byte payloads use the explicit-length
    /// form since the 16-byte fixext is not decoded.
    fn encode_ext(&mut self, code: i8, data: &[u8]) -> Result<(), PackError> {
        let len = data.len();
        let order = self.options.byte_order();
        match len {
            1 => self.buf.write_u8(marker::FIXEXT_1),
            2 => self.buf.write_u8(marker::FIXEXT_2),
            4 => self.buf.write_u8(marker::FIXEXT_4),
            8 => self.buf.write_u8(marker::FIXEXT_8),
            _ if len < 0x100 => {
                self.buf.write_u8(marker::EXT_8);
                self.buf.write_u8(len as u8);
            }
            _ if len < 0x1_0000 => {
                self.buf.write_u8(marker::EXT_16);
                self.buf.write_u16(len as u16, order);
            }
            _ => {
                let len = len_u32("extension payload", len)?;
                self.buf.write_u8(marker::EXT_32);
                self.buf.write_u32(len, order);
            }
        }
        self.buf.write_i8(code);
        self.buf.write_bytes(data);
        Ok(())
    }

    fn encode_ref(&mut self, graph: &Graph, id: NodeId) -> Result<(), PackError> {
        let circular = self.options.is_circular();
        if circular {
            if let Some(back) = self.cache.get(id) {
                self.buf.write_bytes(back.as_bytes());
                return Ok(());
            }
        } else if self.active.contains(&id) {
            return Err(PackError::CircularReference(id));
        }

        if self.encode_custom(graph, &Value::Ref(id))? {
            return Ok(());
        }

        let node = graph.get(id).ok_or_else(|| {
            PackError::UnencodableValue(format!("reference {id} is not in the graph"))
        })?;

        self.depth += 1;
        if self.depth > self.options.depth_limit() {
            return Err(PackError::DepthLimitExceeded(self.options.depth_limit()));
        }
        if circular {
            self.cache
                .record(id, self.buf.position(), self.options.byte_order())?;
        } else {
            self.active.insert(id);
        }

        match node {
            Node::Sequence(items) => self.encode_sequence(graph, items)?,
            Node::Mapping(entries) => self.encode_mapping(graph, entries)?,
            Node::Binary(bytes) => self.encode_binary(bytes)?,
        }

        if !circular {
            self.active.remove(&id);
        }
        self.depth -= 1;
        Ok(())
    }

    fn encode_sequence(&mut self, graph: &Graph, items: &[Value]) -> Result<(), PackError> {
        let len = items.len();
        let order = self.options.byte_order();
        if len <= marker::FIXARRAY_MAX_LEN {
            self.buf.write_u8(marker::FIXARRAY | len as u8);
        } else if len < 0x1_0000 {
            self.buf.write_u8(marker::ARRAY_16);
            self.buf.write_u16(len as u16, order);
        } else {
            let len = len_u32("sequence", len)?;
            self.buf.write_u8(marker::ARRAY_32);
            self.buf.write_u32(len, order);
        }
        for item in items {
            self.encode_value(graph, item)?;
        }
        Ok(())
    }

    /// Pairs whose value is `Undefined` are left out, count included.
    fn encode_mapping(&mut self, graph: &Graph, entries: &Entries) -> Result<(), PackError> {
        let kept: Vec<&(String, Value)> = entries.iter().filter(|(_, v)| !v.is_undefined()).collect();
        let len = kept.len();
        let order = self.options.byte_order();
        if len <= marker::FIXMAP_MAX_LEN {
            self.buf.write_u8(marker::FIXMAP | len as u8);
        } else if len < 0x1_0000 {
            self.buf.write_u8(marker::MAP_16);
            self.buf.write_u16(len as u16, order);
        } else {
            let len = len_u32("mapping", len)?;
            self.buf.write_u8(marker::MAP_32);
            self.buf.write_u32(len, order);
        }
        for (key, value) in kept {
            self.encode_str(key)?;
            self.encode_value(graph, value)?;
        }
        Ok(())
    }

    fn encode_binary(&mut self, bytes: &[u8]) -> Result<(), PackError> {
        let len = bytes.len();
        let order = self.options.byte_order();
        if len < 0x100 {
            self.buf.write_u8(marker::BIN_8);
            self.buf.write_u8(len as u8);
        } else if len < 0x1_0000 {
            self.buf.write_u8(marker::BIN_16);
            self.buf.write_u16(len as u16, order);
        } else {
            let len = len_u32("binary", len)?;
            self.buf.write_u8(marker::BIN_32);
            self.buf.write_u32(len, order);
        }
        self.buf.write_bytes(bytes);
        Ok(())
    }
}

fn len_u32(kind: &'static str, len: usize) -> Result<u32, PackError> {
    u32::try_from(len).map_err(|_| PackError::LengthOverflow { kind, len })
}
