//! MessagePack type byte constants.

// Positive fixint: 0x00..=0x7F (value is the byte itself)
pub const POSITIVE_FIXINT_MAX: u8 = 0x7F;

// Inline containers and strings: high bits select the type, low bits the length.
// FIXMAP:   0x80..=0x8F (pair count 0..15)
// FIXARRAY: 0x90..=0x9F (item count 0..15)
// FIXSTR:   0xA0..=0xBF (byte length 0..31)
pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xA0;
pub const FIXMAP_MAX_LEN: usize = 0x0F;
pub const FIXARRAY_MAX_LEN: usize = 0x0F;
pub const FIXSTR_MAX_LEN: usize = 0x1F;

// Null
pub const NIL: u8 = 0xC0;

// 0xC1 is never used.

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Binary
pub const BIN_8: u8 = 0xC4;
pub const BIN_16: u8 = 0xC5;
pub const BIN_32: u8 = 0xC6;

// Extension with explicit payload length
pub const EXT_8: u8 = 0xC7;
pub const EXT_16: u8 = 0xC8;
pub const EXT_32: u8 = 0xC9;

// Float (IEEE 754)
pub const FLOAT_32: u8 = 0xCA;
pub const FLOAT_64: u8 = 0xCB;

// Unsigned integer
pub const UINT_8: u8 = 0xCC;
pub const UINT_16: u8 = 0xCD;
pub const UINT_32: u8 = 0xCE;
pub const UINT_64: u8 = 0xCF;

// Signed integer
pub const INT_8: u8 = 0xD0;
pub const INT_16: u8 = 0xD1;
pub const INT_32: u8 = 0xD2;
pub const INT_64: u8 = 0xD3;

// Extension with implicit payload length (1, 2, 4, 8, 16 bytes)
pub const FIXEXT_1: u8 = 0xD4;
pub const FIXEXT_2: u8 = 0xD5;
pub const FIXEXT_4: u8 = 0xD6;
pub const FIXEXT_8: u8 = 0xD7;
pub const FIXEXT_16: u8 = 0xD8;

// String
pub const STR_8: u8 = 0xD9;
pub const STR_16: u8 = 0xDA;
pub const STR_32: u8 = 0xDB;

// Array
pub const ARRAY_16: u8 = 0xDC;
pub const ARRAY_32: u8 = 0xDD;

// Map
pub const MAP_16: u8 = 0xDE;
pub const MAP_32: u8 = 0xDF;

// Negative fixint: 0xE0..=0xFF (-32..-1)
pub const NEGATIVE_FIXINT: u8 = 0xE0;
