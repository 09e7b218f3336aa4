//! Error types for the codec.

use crate::types::NodeId;

/// Errors that can occur while encoding, decoding or registering extensions.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("unrecognized type 0x{byte:02x} at offset {offset}")]
    UnrecognizedType { byte: u8, offset: usize },

    #[error("invalid extension code {0}: must be within 0..=127")]
    InvalidExtensionCode(i32),

    #[error("unsupported {size}-byte payload for extension type {code}")]
    UnsupportedExtensionSize { code: i8, size: usize },

    #[error("truncated input at offset {offset}: need {needed} bytes but only {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unencodable value: {0}")]
    UnencodableValue(String),

    #[error("invalid UTF-8 string at offset {offset}: {source}")]
    InvalidUtf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("mapping key at offset {offset} must be a string, got {found}")]
    InvalidMapKey { offset: usize, found: &'static str },

    #[error("back-reference to offset {0} does not match any decoded container")]
    UnresolvedReference(usize),

    #[error("node {0} refers to itself while circular references are disabled")]
    CircularReference(NodeId),

    #[error("{kind} length {len} exceeds the 32-bit limit")]
    LengthOverflow { kind: &'static str, len: usize },

    #[error("big integer {0} does not fit in 64 bits")]
    IntegerOverflow(i128),

    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("extension {code} failed: {message}")]
    Extension { code: i8, message: String },
}

impl PackError {
    /// Wraps any displayable error raised by an extension handler.
    pub fn extension(code: i8, e: impl std::fmt::Display) -> Self {
        Self::Extension {
            code,
            message: e.to_string(),
        }
    }

    /// Returns true if the error was caused by malformed or truncated input.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedType { .. }
                | Self::TruncatedInput { .. }
                | Self::InvalidUtf8 { .. }
                | Self::InvalidMapKey { .. }
                | Self::UnresolvedReference(_)
        )
    }
}
