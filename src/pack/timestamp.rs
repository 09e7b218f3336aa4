//! Packed timestamp payloads for extension type -1.
//!
//! - timestamp 32: `seconds` as u32, used when there are no nanoseconds.
//! - timestamp 64: word 0 holds `nanos` in its upper 30 bits and the top two
//!   bits of a 34-bit `seconds` in its lower 2 bits; word 1 holds the low 32
//!   bits of `seconds`.
//!
//! Payload words are always big-endian. The 96-bit form is not supported.

use crate::error::PackError;
use crate::types::{ext, Timestamp};

const SECONDS_34_LIMIT: i64 = 1 << 34;

/// A packed timestamp ready to be written as an extension payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packed {
    Short([u8; 4]),
    Long([u8; 8]),
}

impl Packed {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Short(b) => b,
            Self::Long(b) => b,
        }
    }
}

pub fn pack(ts: &Timestamp) -> Result<Packed, PackError> {
    let seconds = ts.seconds();
    let nanos = ts.nanos();
    if nanos == 0 && (0..=i64::from(u32::MAX)).contains(&seconds) {
        return Ok(Packed::Short((seconds as u32).to_be_bytes()));
    }
    if !(0..SECONDS_34_LIMIT).contains(&seconds) {
        return Err(PackError::UnsupportedExtensionSize {
            code: ext::TIMESTAMP,
            size: 12,
        });
    }
    let high = (nanos << 2) | ((seconds >> 32) as u32 & 0x3);
    let low = (seconds & 0xFFFF_FFFF) as u32;
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&high.to_be_bytes());
    out[4..].copy_from_slice(&low.to_be_bytes());
    Ok(Packed::Long(out))
}

pub fn unpack(data: &[u8]) -> Result<Timestamp, PackError> {
    match *data {
        [a, b, c, d] => Ok(Timestamp::new(i64::from(u32::from_be_bytes([a, b, c, d])), 0)),
        [a, b, c, d, e, f, g, h] => {
            let high = u32::from_be_bytes([a, b, c, d]);
            let low = u32::from_be_bytes([e, f, g, h]);
            let seconds = (i64::from(high & 0x3) << 32) | i64::from(low);
            Ok(Timestamp::new(seconds, i64::from(high >> 2)))
        }
        _ => Err(PackError::UnsupportedExtensionSize {
            code: ext::TIMESTAMP,
            size: data.len(),
        }),
    }
}
