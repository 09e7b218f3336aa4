//! Codec configuration shared by [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder).

use std::sync::Arc;

use crate::extension::ExtensionRegistry;
use crate::pack::ByteOrder;

/// Default size of the encoder's first buffer allocation.
pub const DEFAULT_INITIAL_BUFFER_SIZE: usize = 0xFFFF;

/// Default container nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Builder-style codec options.
#[derive(Debug, Clone)]
pub struct Options {
    circular: bool,
    byte_order: ByteOrder,
    extensions: Arc<ExtensionRegistry>,
    initial_buffer_size: usize,
    max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            circular: true,
            byte_order: ByteOrder::BigEndian,
            extensions: Arc::new(ExtensionRegistry::new()),
            initial_buffer_size: DEFAULT_INITIAL_BUFFER_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables back-references for shared and cyclic containers.
    ///
    /// When disabled, shared containers are written once per occurrence and a
    /// cycle fails with [`PackError::CircularReference`](crate::PackError::CircularReference).
    pub fn circular(mut self, enabled: bool) -> Self {
        self.circular = enabled;
        self
    }

    /// Selects little-endian byte order for multi-byte fields.
    pub fn little_endian(mut self, enabled: bool) -> Self {
        self.byte_order = if enabled {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        self
    }

    /// Sets the extension registry.
    pub fn extensions(mut self, registry: ExtensionRegistry) -> Self {
        self.extensions = Arc::new(registry);
        self
    }

    /// Shares an existing extension registry.
    pub fn shared_extensions(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.extensions = registry;
        self
    }

    /// Sets the encoder's first buffer allocation. Only a performance hint.
    pub fn initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size;
        self
    }

    /// Sets the maximum container nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn extension_registry(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    pub fn buffer_size(&self) -> usize {
        self.initial_buffer_size
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }
}
