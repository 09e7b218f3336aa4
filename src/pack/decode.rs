//! Decoding: bytes → `Value` graph.

use bytes::Buf;

use super::buffer::ByteOrder;
use super::cache::DecodeCache;
use super::{marker, timestamp};
use crate::error::PackError;
use crate::options::Options;
use crate::types::{ext, Document, ExtData, Graph, Node, Value, MAX_SAFE_INTEGER};

/// Decodes a single value with default options.
pub fn decode_value(bytes: &[u8]) -> Result<Document, PackError> {
    Decoder::default().decode(bytes)
}

macro_rules! read_fixed {
    ($($name:ident, $ty:ty, $be:ident, $le:ident;)*) => {
        $(
            fn $name(&mut self) -> Result<$ty, PackError> {
                self.ensure_remaining(std::mem::size_of::<$ty>())?;
                Ok(match self.order {
                    ByteOrder::BigEndian => self.rest.$be(),
                    ByteOrder::LittleEndian => self.rest.$le(),
                })
            }
        )*
    };
}

/// Read cursor over the input. Every read checks the remaining length first.
struct Reader<'a> {
    input: &'a [u8],
    rest: &'a [u8],
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn new(input: &'a [u8], order: ByteOrder) -> Self {
        Self {
            input,
            rest: input,
            order,
        }
    }

    fn position(&self) -> usize {
        self.input.len() - self.rest.len()
    }

    fn remaining(&self) -> usize {
        self.rest.remaining()
    }

    fn ensure_remaining(&self, needed: usize) -> Result<(), PackError> {
        if self.rest.remaining() < needed {
            Err(PackError::TruncatedInput {
                offset: self.position(),
                needed,
                remaining: self.rest.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn read_u8(&mut self) -> Result<u8, PackError> {
        self.ensure_remaining(1)?;
        Ok(self.rest.get_u8())
    }

    fn read_i8(&mut self) -> Result<i8, PackError> {
        self.ensure_remaining(1)?;
        Ok(self.rest.get_i8())
    }

    read_fixed! {
        read_u16, u16, get_u16, get_u16_le;
        read_i16, i16, get_i16, get_i16_le;
        read_u32, u32, get_u32, get_u32_le;
        read_i32, i32, get_i32, get_i32_le;
        read_u64, u64, get_u64, get_u64_le;
        read_i64, i64, get_i64, get_i64_le;
        read_f32, f32, get_f32, get_f32_le;
        read_f64, f64, get_f64, get_f64_le;
    }

    fn read_len8(&mut self) -> Result<usize, PackError> {
        self.read_u8().map(usize::from)
    }

    fn read_len16(&mut self) -> Result<usize, PackError> {
        self.read_u16().map(usize::from)
    }

    fn read_len32(&mut self) -> Result<usize, PackError> {
        self.read_u32().map(|len| len as usize)
    }

    /// Borrows the next `len` bytes of input.
    fn take(&mut self, len: usize) -> Result<&'a [u8], PackError> {
        self.ensure_remaining(len)?;
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }
}

/// Reusable decoder. Owns the offset cache used to resolve back-references;
/// it is cleared at the end of every call.
#[derive(Debug)]
pub struct Decoder {
    options: Options,
    cache: DecodeCache,
    depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Decoder {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            cache: DecodeCache::default(),
            depth: 0,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Decodes one value into a fresh graph.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<Document, PackError> {
        let mut graph = Graph::new();
        let root = self.decode_into(bytes, &mut graph)?;
        Ok(Document::new(graph, root))
    }

    /// Decodes one value, allocating its containers in `graph`.
    ///
    /// On failure `graph` is restored to its previous length.
    pub fn decode_into(&mut self, bytes: &[u8], graph: &mut Graph) -> Result<Value, PackError> {
        let mark = graph.len();
        let mut reader = Reader::new(bytes, self.options.byte_order());
        let result = self.decode_value(&mut reader, graph);

        self.cache.clear();
        self.depth = 0;

        match result {
            Ok(value) => {
                if reader.remaining() > 0 {
                    tracing::trace!(trailing = reader.remaining(), "ignoring bytes after value");
                }
                tracing::trace!(len = bytes.len(), nodes = graph.len() - mark, "decoded value");
                Ok(value)
            }
            Err(e) => {
                graph.truncate(mark);
                tracing::debug!(error = %e, "decode failed");
                Err(e)
            }
        }
    }

    /// Container markers recurse from here; everything else is handled out
    /// of line so each nesting level only costs this small frame.
    fn decode_value(&mut self, r: &mut Reader<'_>, graph: &mut Graph) -> Result<Value, PackError> {
        let offset = r.position();
        let m = r.read_u8()?;
        match m {
            0x80..=0x8F => self.decode_mapping(r, graph, offset, usize::from(m & 0x0F)),
            0x90..=0x9F => self.decode_sequence(r, graph, offset, usize::from(m & 0x0F)),
            marker::ARRAY_16 | marker::ARRAY_32 => {
                let len = container_len(r, m)?;
                self.decode_sequence(r, graph, offset, len)
            }
            marker::MAP_16 | marker::MAP_32 => {
                let len = container_len(r, m)?;
                self.decode_mapping(r, graph, offset, len)
            }
            _ => self.decode_scalar(r, graph, offset, m),
        }
    }

    #[inline(never)]
    fn decode_scalar(
        &mut self,
        r: &mut Reader<'_>,
        graph: &mut Graph,
        offset: usize,
        m: u8,
    ) -> Result<Value, PackError> {
        match m {
            // Positive fixint
            0x00..=marker::POSITIVE_FIXINT_MAX => Ok(Value::Integer(i64::from(m))),

            // Fixstr
            0xA0..=0xBF => decode_str(r, usize::from(m & 0x1F)),

            // Negative fixint
            marker::NEGATIVE_FIXINT..=0xFF => Ok(Value::Integer(i64::from(m as i8))),

            marker::NIL => Ok(Value::Null),
            marker::FALSE => Ok(Value::Boolean(false)),
            marker::TRUE => Ok(Value::Boolean(true)),

            // Float
            marker::FLOAT_32 => Ok(number(f64::from(r.read_f32()?))),
            marker::FLOAT_64 => Ok(number(r.read_f64()?)),

            // Unsigned
            marker::UINT_8 => Ok(Value::Integer(i64::from(r.read_u8()?))),
            marker::UINT_16 => Ok(Value::Integer(i64::from(r.read_u16()?))),
            marker::UINT_32 => Ok(Value::Integer(i64::from(r.read_u32()?))),
            marker::UINT_64 => Ok(Value::BigInt(i128::from(r.read_u64()?))),

            // Signed
            marker::INT_8 => Ok(Value::Integer(i64::from(r.read_i8()?))),
            marker::INT_16 => Ok(Value::Integer(i64::from(r.read_i16()?))),
            marker::INT_32 => Ok(Value::Integer(i64::from(r.read_i32()?))),
            marker::INT_64 => Ok(Value::BigInt(i128::from(r.read_i64()?))),

            // String
            marker::STR_8 => {
                let len = r.read_len8()?;
                decode_str(r, len)
            }
            marker::STR_16 => {
                let len = r.read_len16()?;
                decode_str(r, len)
            }
            marker::STR_32 => {
                let len = r.read_len32()?;
                decode_str(r, len)
            }

            // Binary
            marker::BIN_8 => {
                let len = r.read_len8()?;
                self.decode_binary(r, graph, offset, len)
            }
            marker::BIN_16 => {
                let len = r.read_len16()?;
                self.decode_binary(r, graph, offset, len)
            }
            marker::BIN_32 => {
                let len = r.read_len32()?;
                self.decode_binary(r, graph, offset, len)
            }

            // Fixed-size extension
            marker::FIXEXT_1 => self.decode_ext(r, graph, offset, 1),
            marker::FIXEXT_2 => self.decode_ext(r, graph, offset, 2),
            marker::FIXEXT_4 => self.decode_ext(r, graph, offset, 4),
            marker::FIXEXT_8 => self.decode_ext(r, graph, offset, 8),
            marker::FIXEXT_16 => {
                let code = r.read_i8()?;
                Err(PackError::UnsupportedExtensionSize { code, size: 16 })
            }

            // Extension with explicit length
            marker::EXT_8 => {
                let len = r.read_len8()?;
                self.decode_ext(r, graph, offset, len)
            }
            marker::EXT_16 => {
                let len = r.read_len16()?;
                self.decode_ext(r, graph, offset, len)
            }
            marker::EXT_32 => {
                let len = r.read_len32()?;
                self.decode_ext(r, graph, offset, len)
            }

            _ => Err(PackError::UnrecognizedType { byte: m, offset }),
        }
    }

    fn enter(&mut self) -> Result<(), PackError> {
        self.depth += 1;
        if self.depth > self.options.depth_limit() {
            Err(PackError::DepthLimitExceeded(self.options.depth_limit()))
        } else {
            Ok(())
        }
    }

    fn remember(&mut self, offset: usize, value: Value) {
        if self.options.is_circular() {
            self.cache.insert(offset, value);
        }
    }

    /// The node is allocated and cached before its items are decoded so that
    /// an item referring back to it resolves to the same id.
    fn decode_sequence(
        &mut self,
        r: &mut Reader<'_>,
        graph: &mut Graph,
        offset: usize,
        len: usize,
    ) -> Result<Value, PackError> {
        self.enter()?;
        // Every item takes at least one byte.
        let id = graph.insert(Node::Sequence(Vec::with_capacity(len.min(r.remaining()))));
        self.remember(offset, Value::Ref(id));
        for _ in 0..len {
            let item = self.decode_value(r, graph)?;
            graph.push(id, item);
        }
        self.depth -= 1;
        Ok(Value::Ref(id))
    }

    fn decode_mapping(
        &mut self,
        r: &mut Reader<'_>,
        graph: &mut Graph,
        offset: usize,
        len: usize,
    ) -> Result<Value, PackError> {
        self.enter()?;
        let id = graph.insert(Node::Mapping(Vec::with_capacity(len.min(r.remaining() / 2))));
        self.remember(offset, Value::Ref(id));
        for _ in 0..len {
            let key_offset = r.position();
            let key = match self.decode_value(r, graph)? {
                Value::String(s) => s,
                other => {
                    return Err(PackError::InvalidMapKey {
                        offset: key_offset,
                        found: other.kind(),
                    });
                }
            };
            let value = self.decode_value(r, graph)?;
            graph.set(id, key, value);
        }
        self.depth -= 1;
        Ok(Value::Ref(id))
    }

    fn decode_binary(
        &mut self,
        r: &mut Reader<'_>,
        graph: &mut Graph,
        offset: usize,
        len: usize,
    ) -> Result<Value, PackError> {
        let data = r.take(len)?.to_vec();
        let value = graph.binary(data);
        self.remember(offset, value.clone());
        Ok(value)
    }

    fn decode_ext(
        &mut self,
        r: &mut Reader<'_>,
        graph: &mut Graph,
        offset: usize,
        size: usize,
    ) -> Result<Value, PackError> {
        let code = r.read_i8()?;

        if code == ext::CIRCULAR {
            let target = match size {
                1 => r.read_len8()?,
                2 => r.read_len16()?,
                4 => r.read_len32()?,
                _ => return Err(PackError::UnsupportedExtensionSize { code, size }),
            };
            return self
                .cache
                .get(target)
                .cloned()
                .ok_or(PackError::UnresolvedReference(target));
        }

        let data = r.take(size)?;
        if code == ext::TIMESTAMP {
            return timestamp::unpack(data).map(Value::Timestamp);
        }

        let value = match self.options.extension_registry().decoder(code) {
            Some(handler) => handler.decode(data, code, graph)?,
            None => Value::Extension(ExtData::new(code, data.to_vec())),
        };
        if let Value::Ref(_) = value {
            self.remember(offset, value.clone());
        }
        Ok(value)
    }
}

fn container_len(r: &mut Reader<'_>, m: u8) -> Result<usize, PackError> {
    match m {
        marker::ARRAY_16 | marker::MAP_16 => r.read_len16(),
        _ => r.read_len32(),
    }
}

fn decode_str(r: &mut Reader<'_>, len: usize) -> Result<Value, PackError> {
    let offset = r.position();
    let data = r.take(len)?;
    let s = std::str::from_utf8(data).map_err(|source| PackError::InvalidUtf8 { offset, source })?;
    Ok(Value::String(s.to_owned()))
}

/// Floats holding an integral value in the safe range come back as integers,
/// mirroring how the encoder writes them.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER as f64 {
        Value::Integer(value as i64)
    } else {
        Value::Float(value)
    }
}
