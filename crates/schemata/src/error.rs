//! # Error Types
//!
//! Two disjoint failure kinds come out of [`map`](crate::Schema::map):
//!
//! - [`ValidationError`]: the input does not satisfy the schema. Always
//!   returned unchanged from `validate`, never wrapped in another message.
//! - [`MapError::TypeMismatch`]: the target cannot faithfully represent
//!   the schema. This is a programming error in the caller, not bad input,
//!   and is only reported after validation succeeded.
//!
//! [`SchemaError`] covers schema construction and descriptor parsing.

use thiserror::Error;

use crate::issue::ValidationError;

/// Error returned by `map` operations.
#[derive(Error, Debug)]
pub enum MapError {
    /// The value did not validate; identical to what `validate` returns.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The target's shape cannot represent the schema.
    #[error("type mismatch: {schema} schema cannot be mapped into {target}")]
    TypeMismatch {
        /// Kind of schema that was being mapped (e.g. `integer[-240, 240]`).
        schema: String,
        /// Kind of target slot that was offered (e.g. `i8`).
        target: String,
    },
}

impl MapError {
    /// Returns true if this is a schema/target shape incompatibility.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, MapError::TypeMismatch { .. })
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            MapError::Validation(e) => Some(e),
            MapError::TypeMismatch { .. } => None,
        }
    }

    /// Prefix the paths of a validation failure raised below a container
    /// element or object property. Mismatches pass through unchanged.
    pub(crate) fn with_prefix(self, prefix: &str) -> Self {
        match self {
            MapError::Validation(inner) => {
                let mut e = ValidationError::default();
                e.add_issues_with_prefix(&inner, prefix);
                MapError::Validation(e)
            }
            mismatch => mismatch,
        }
    }

    pub(crate) fn mismatch(schema: impl Into<String>, target: impl Into<String>) -> Self {
        let schema = schema.into();
        let target = target.into();
        tracing::debug!(%schema, %target, "schema cannot be mapped into target");
        MapError::TypeMismatch { schema, target }
    }
}

/// Error building a schema or reconstructing one from a descriptor.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `pattern` is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Underlying regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// A string enum was declared without any allowed values.
    #[error("string enum must allow at least one value")]
    EmptyEnum,

    /// A descriptor node could not be turned into a schema.
    #[error("invalid descriptor at {path}: {reason}")]
    InvalidDescriptor {
        /// Location of the node inside the descriptor, e.g. `#/properties/obj`.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The descriptor text is not valid JSON.
    #[error("invalid JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// The descriptor text is not valid YAML.
    #[error("invalid YAML descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The descriptor document could not be loaded.
    #[error("failed to load descriptor {path}: {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn descriptor(path: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidDescriptor {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
