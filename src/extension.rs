//! User-defined extension types.

use std::fmt;
use std::sync::Arc;

use crate::error::PackError;
use crate::types::{Graph, Value};

/// Handler for one application-defined extension type.
pub trait Extension: Send + Sync {
    /// Returns the payload for `value` if this extension claims it.
    ///
    /// Called for containers, timestamps and extension values, in
    /// registration order, before the built-in encodings are tried.
    fn encode(&self, value: &Value, graph: &Graph) -> Option<Vec<u8>>;

    /// Rebuilds a value from a payload tagged with this extension's code.
    ///
    /// Containers produced here must be allocated in `graph`.
    fn decode(&self, data: &[u8], type_code: i8, graph: &mut Graph) -> Result<Value, PackError>;
}

/// Extension handlers keyed by type code, kept in registration order.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    entries: Vec<(i8, Arc<dyn Extension>)>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `code`, which must be within `0..=127`.
    ///
    /// Registering a code twice replaces the earlier handler in place.
    pub fn register(
        &mut self,
        code: i32,
        handler: impl Extension + 'static,
    ) -> Result<&mut Self, PackError> {
        let code = i8::try_from(code)
            .ok()
            .filter(|c| *c >= 0)
            .ok_or(PackError::InvalidExtensionCode(code))?;
        let handler: Arc<dyn Extension> = Arc::new(handler);
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((code, handler)),
        }
        tracing::debug!(code, "registered extension");
        Ok(self)
    }

    /// Handlers in registration order, for the encoder.
    pub fn encoders(&self) -> impl Iterator<Item = (i8, &dyn Extension)> {
        self.entries.iter().map(|(c, h)| (*c, h.as_ref()))
    }

    /// The handler registered for `code`, for the decoder.
    pub fn decoder(&self, code: i8) -> Option<&dyn Extension> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, h)| h.as_ref())
    }

    /// Runs the encoders in order and returns the first claimed payload.
    pub fn encode(&self, value: &Value, graph: &Graph) -> Option<(i8, Vec<u8>)> {
        self.encoders()
            .find_map(|(code, handler)| handler.encode(value, graph).map(|data| (code, data)))
    }

    pub fn contains(&self, code: i8) -> bool {
        self.decoder(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("codes", &self.entries.iter().map(|(c, _)| *c).collect::<Vec<_>>())
            .finish()
    }
}
