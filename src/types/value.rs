//! Inline value types.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::graph::NodeId;

/// Largest integer a float64 represents exactly, along with every integer below it.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Smallest integer a float64 represents exactly, along with every integer above it.
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A value as seen by the codec.
///
/// Scalars are stored inline. Sequences, mappings and binary buffers live in a
/// [`Graph`](super::Graph) and are referred to through [`Value::Ref`], which is
/// what lets two places in a document point at the same container.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absence of a value. Encodes as null inside a sequence, is dropped from
    /// a mapping and cannot be encoded on its own.
    Undefined,
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    /// Explicit 64-bit integer that always uses the full-width encoding.
    BigInt(i128),
    Float(f64),
    String(String),
    Timestamp(Timestamp),
    Extension(ExtData),
    Ref(NodeId),
}

impl Value {
    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric value of `Integer`, `BigInt` and `Float` variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::BigInt(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the node id, if it is a `Ref` variant.
    pub fn as_ref_id(&self) -> Option<NodeId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::BigInt(_) => "bigint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Timestamp(_) => "timestamp",
            Self::Extension(_) => "extension",
            Self::Ref(_) => "reference",
        }
    }
}

/// A point in time relative to the Unix epoch.
///
/// `nanos` is always within `0..1_000_000_000`; instants before the epoch have
/// negative `seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp, carrying or borrowing whole seconds out of `nanos`.
    ///
    /// Seconds saturate at the ends of the `i64` range.
    pub fn new(seconds: i64, nanos: i64) -> Self {
        let carry = nanos.div_euclid(NANOS_PER_SECOND);
        Self {
            seconds: seconds.saturating_add(carry),
            nanos: nanos.rem_euclid(NANOS_PER_SECOND) as u32,
        }
    }

    /// Creates a timestamp from milliseconds since the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self::new(millis.div_euclid(1000), millis.rem_euclid(1000) * 1_000_000)
    }

    /// Whole seconds since the epoch.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Nanoseconds within the second.
    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Milliseconds since the epoch, truncating sub-millisecond precision.
    /// Saturates when the instant is outside the `i64` millisecond range.
    pub fn as_millis(&self) -> i64 {
        self.seconds
            .saturating_mul(1000)
            .saturating_add(i64::from(self.nanos / 1_000_000))
    }

    /// Converts to a `SystemTime`, or `None` if the platform cannot represent it.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let whole = if self.seconds >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(self.seconds.unsigned_abs()))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(self.seconds.unsigned_abs()))
        };
        whole?.checked_add(Duration::from_nanos(u64::from(self.nanos)))
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::new(
                i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
                i64::from(after.subsec_nanos()),
            ),
            Err(e) => {
                let before = e.duration();
                Self::new(
                    0i64.saturating_sub_unsigned(before.as_secs()),
                    -i64::from(before.subsec_nanos()),
                )
            }
        }
    }
}

/// Raw extension payload with no registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtData {
    pub type_code: i8,
    pub data: Vec<u8>,
}

impl ExtData {
    pub fn new(type_code: i8, data: Vec<u8>) -> Self {
        Self { type_code, data }
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<ExtData> for Value {
    fn from(ext: ExtData) -> Self {
        Self::Extension(ext)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Self::Ref(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::BigInt(i) => write!(f, "{i}n"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Timestamp(ts) => write!(f, "timestamp({}.{:09})", ts.seconds, ts.nanos),
            Self::Extension(ext) => write!(f, "ext({}, <{} bytes>)", ext.type_code, ext.data.len()),
            Self::Ref(id) => write!(f, "&{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_borrows_negative_nanos() {
        let ts = Timestamp::new(10, -1);
        assert_eq!(ts.seconds(), 9);
        assert_eq!(ts.nanos(), 999_999_999);
    }

    #[test]
    fn timestamp_carries_overflowing_nanos() {
        let ts = Timestamp::new(1, 2_500_000_000);
        assert_eq!(ts.seconds(), 3);
        assert_eq!(ts.nanos(), 500_000_000);
    }

    #[test]
    fn timestamp_from_negative_millis() {
        let ts = Timestamp::from_millis(-1);
        assert_eq!(ts.seconds(), -1);
        assert_eq!(ts.nanos(), 999_000_000);
        assert_eq!(ts.as_millis(), -1);
    }

    #[test]
    fn timestamp_system_time_conversion() {
        let ts = Timestamp::new(1_700_000_000, 123_456_789);
        let time = ts.to_system_time().unwrap();
        assert_eq!(Timestamp::from(time), ts);

        let before_epoch = Timestamp::new(-5, 250_000_000);
        let time = before_epoch.to_system_time().unwrap();
        assert_eq!(Timestamp::from(time), before_epoch);
    }

    #[test]
    fn timestamp_extremes_saturate() {
        let ts = Timestamp::new(i64::MAX, 1_000_000_000);
        assert_eq!(ts.seconds(), i64::MAX);
        assert_eq!(ts.nanos(), 0);

        let ts = Timestamp::new(i64::MIN, -1);
        assert_eq!(ts.seconds(), i64::MIN);
        assert_eq!(ts.nanos(), 999_999_999);

        assert_eq!(Timestamp::new(i64::MAX / 10, 0).as_millis(), i64::MAX);
        assert_eq!(Timestamp::new(i64::MIN / 10, 0).as_millis(), i64::MIN);
    }

    #[test]
    fn numeric_accessors() {
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::BigInt(-2).as_f64(), Some(-2.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::from("3").as_f64(), None);
        assert_eq!(Value::Float(2.0).as_int(), None);
        assert_eq!(Value::Integer(2).kind(), "integer");
        assert_eq!(Value::Ref(NodeId::new(0)).kind(), "reference");
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::BigInt(7).to_string(), "7n");
        assert_eq!(Value::Ref(NodeId::new(3)).to_string(), "&#3");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
