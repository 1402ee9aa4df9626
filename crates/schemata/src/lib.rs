//! # schemata: Schema Description, Validation & Mapping
//!
//! Describes the shape of decoded JSON/YAML values with a small subset of
//! JSON Schema, validates values against it, and binds validated values
//! into typed Rust targets.
//!
//! ## Operations
//!
//! Every [`Schema`] variant supports three operations:
//!
//! - [`Schema::descriptor`]: the JSON-Schema descriptor document.
//! - [`Schema::validate`]: every issue in a value, each with a path such as
//!   `root.obj["weird key"].array[3]`.
//! - [`Schema::map`]: validate, then bind into a [`MapTarget`]. A target
//!   that cannot faithfully represent the schema is reported as
//!   [`MapError::TypeMismatch`], never silently truncated.
//!
//! ## Targets
//!
//! Targets describe their storage through [`Slot`] instead of runtime
//! reflection. Primitives, `String`, `Option<T>`, `Vec<T>`, string-keyed
//! maps, `url::Url`, `chrono` timestamps and durations and
//! `serde_json::Value` are targets out of the box; structs opt in through
//! [`record_target!`].
//!
//! ```
//! use schemata::{record_target, IntegerSchema, ObjectSchema, Schema};
//! use serde_json::json;
//!
//! #[derive(Debug, Default)]
//! struct Config {
//!     port: u16,
//! }
//!
//! record_target!(Config { "port" => port });
//!
//! let schema: Schema = ObjectSchema::new()
//!     .property("port", IntegerSchema::new(1, 65535))
//!     .require("port")
//!     .into();
//!
//! let mut config = Config::default();
//! schema.map(&json!({"port": 8080}), &mut config).unwrap();
//! assert_eq!(config.port, 8080);
//! ```
//!
//! ## Descriptors
//!
//! [`parse_schema`], [`Schema::from_yaml_str`] and [`Schema::from_file`]
//! rebuild a schema from its own descriptor vocabulary.

pub mod combinator;
pub mod container;
pub mod duration;
pub mod error;
pub mod issue;
pub mod metadata;
pub mod object;
pub mod parse;
pub mod scalar;
pub mod schema;
pub mod target;
pub mod value;

pub use combinator::{AllOf, AnyOf, OneOf};
pub use container::{ArraySchema, MapSchema};
pub use duration::{parse_duration, DurationError, DurationSchema, DURATION_PATTERN};
pub use error::{MapError, SchemaError};
pub use issue::{format_index_path, format_key_path, ValidationError, ValidationIssue};
pub use metadata::MetaData;
pub use object::ObjectSchema;
pub use parse::parse_schema;
pub use scalar::{
    BooleanSchema, DateTimeSchema, IntegerSchema, NumberSchema, Pattern, StringEnumSchema,
    StringSchema, UriSchema,
};
pub use schema::Schema;
pub use target::{
    DictionaryTarget, FloatSlot, FreshTarget, InspectSlot, IntSlot, MapTarget, RecordTarget,
    SequenceTarget, Slot, UriSlot,
};
pub use value::json_equal;
