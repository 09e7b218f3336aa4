//! Growable output buffer used by the encoder.

use bytes::{BufMut, Bytes, BytesMut};

/// Byte order for multi-byte integers, floats and length prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

macro_rules! write_fixed {
    ($($name:ident, $ty:ty, $be:ident, $le:ident;)*) => {
        $(
            pub fn $name(&mut self, value: $ty, order: ByteOrder) {
                match order {
                    ByteOrder::BigEndian => self.buf.$be(value),
                    ByteOrder::LittleEndian => self.buf.$le(value),
                }
            }
        )*
    };
}

/// Append-only byte buffer with a write cursor.
///
/// The position doubles as the start offset of the next frame written, which
/// is the identity back-references point at. Backing storage is kept across
/// [`finish`](Self::finish) calls.
#[derive(Debug)]
pub struct GrowableBuffer {
    buf: BytesMut,
}

impl GrowableBuffer {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(initial_capacity),
        }
    }

    /// Number of bytes written since the last reset.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    write_fixed! {
        write_u16, u16, put_u16, put_u16_le;
        write_i16, i16, put_i16, put_i16_le;
        write_u32, u32, put_u32, put_u32_le;
        write_i32, i32, put_i32, put_i32_le;
        write_u64, u64, put_u64, put_u64_le;
        write_i64, i64, put_i64, put_i64_le;
        write_f32, f32, put_f32, put_f32_le;
        write_f64, f64, put_f64, put_f64_le;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Appends the UTF-8 bytes of `value` with no intermediate allocation.
    pub fn write_str(&mut self, value: &str) {
        self.buf.put_slice(value.as_bytes());
    }

    /// Copies out everything written so far and resets the cursor.
    pub fn finish(&mut self) -> Bytes {
        let out = Bytes::copy_from_slice(&self.buf);
        self.buf.clear();
        out
    }

    /// Discards everything written so far.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_INITIAL_BUFFER_SIZE)
    }
}
