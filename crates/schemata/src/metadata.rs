//! Title and description shared by most schema variants.

use serde_json::{Map, Value};

/// Optional documentation attached to a schema.
///
/// An empty string means "unset" and is omitted from the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaData {
    /// Short title, emitted as `title`.
    pub title: String,
    /// Longer description, emitted as `description`.
    pub description: String,
}

impl MetaData {
    /// Metadata with both fields set.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Start a descriptor document carrying the set metadata fields.
    pub(crate) fn descriptor(&self) -> Map<String, Value> {
        let mut m = Map::new();
        if !self.title.is_empty() {
            m.insert("title".into(), Value::String(self.title.clone()));
        }
        if !self.description.is_empty() {
            m.insert("description".into(), Value::String(self.description.clone()));
        }
        m
    }
}
