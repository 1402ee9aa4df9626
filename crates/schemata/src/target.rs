//! # Mapping Targets
//!
//! A mapping target is any storage a validated value can be bound into.
//! Instead of discovering a target's shape by runtime introspection, each
//! target type describes itself through [`MapTarget::slot`], returning one
//! [`Slot`] variant per storage kind. Schema variants match on the slot and
//! either write into it or report a type mismatch.
//!
//! Records are bound through an explicit, compile-time-checked table from
//! property names to fields, generated with [`record_target!`]:
//!
//! ```
//! use schemata::record_target;
//!
//! #[derive(Debug, Default)]
//! struct Limits {
//!     max_size: i32,
//!     label: Option<String>,
//! }
//!
//! record_target!(Limits {
//!     "maxSize" => max_size,
//!     "label" => label,
//! });
//! ```
//!
//! ## Containers
//!
//! `Vec<T>`, `HashMap<String, T>` and `BTreeMap<String, T>` stage their
//! elements into a fresh collection and only replace the target's contents
//! once every element was bound. Records are written field by field; their
//! field types are checked against the schema before the first write.
//! [`MapTarget::inspect_slot`] lets those checks look at `Option<T>` fields
//! without allocating them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use url::Url;

use crate::error::MapError;

/// Callback binding one sequence element.
pub type FillElement<'f> = dyn FnMut(usize, &mut dyn MapTarget) -> Result<(), MapError> + 'f;

/// Callback binding one dictionary entry.
pub type FillEntry<'f> = dyn FnMut(&str, &mut dyn MapTarget) -> Result<(), MapError> + 'f;

/// Callback inspecting a scratch element.
pub type Probe<'f> = dyn FnMut(&mut dyn MapTarget) -> Result<(), MapError> + 'f;

/// Callback inspecting a slot without binding into it.
pub type InspectSlot<'f> = dyn FnMut(Slot<'_>) -> Result<(), MapError> + 'f;

/// Storage a schema can bind a validated value into.
pub trait MapTarget {
    /// Describe this storage as a writable slot.
    fn slot(&mut self) -> Slot<'_>;

    /// Run `inspect` against this target's slot, leaving the target as it
    /// was. Optional storage inspects a scratch value instead of
    /// allocating.
    fn inspect_slot(&mut self, inspect: &mut InspectSlot<'_>) -> Result<(), MapError> {
        inspect(self.slot())
    }
}

/// Target types that can be created empty, for container elements and
/// optional fields.
pub trait FreshTarget: Sized {
    /// A new, unpopulated value.
    fn fresh() -> Self;
}

/// A writable view of a target, one variant per storage kind.
pub enum Slot<'a> {
    /// A fixed-width integer.
    Int(IntSlot<'a>),
    /// A floating-point number.
    Float(FloatSlot<'a>),
    /// A boolean.
    Bool(&'a mut bool),
    /// An owned string.
    String(&'a mut String),
    /// A parsed URI.
    Uri(UriSlot<'a>),
    /// A timestamp keeping its original offset.
    DateTime(&'a mut DateTime<FixedOffset>),
    /// A timestamp normalised to UTC.
    DateTimeUtc(&'a mut DateTime<Utc>),
    /// A signed duration.
    Duration(&'a mut chrono::Duration),
    /// A fully dynamic slot receiving the raw decoded value.
    Dynamic(&'a mut Value),
    /// A homogeneous sequence.
    Sequence(&'a mut dyn SequenceTarget),
    /// A string-keyed dictionary.
    Dictionary(&'a mut dyn DictionaryTarget),
    /// A record with named fields.
    Record(&'a mut dyn RecordTarget),
}

impl Slot<'_> {
    /// Name of the storage kind, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Int(slot) => slot.type_name(),
            Slot::Float(slot) => slot.type_name(),
            Slot::Bool(_) => "bool",
            Slot::String(_) => "String",
            Slot::Uri(_) => "Url",
            Slot::DateTime(_) => "DateTime<FixedOffset>",
            Slot::DateTimeUtc(_) => "DateTime<Utc>",
            Slot::Duration(_) => "Duration",
            Slot::Dynamic(_) => "Value",
            Slot::Sequence(_) => "sequence",
            Slot::Dictionary(_) => "dictionary",
            Slot::Record(_) => "record",
        }
    }
}

macro_rules! int_slots {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        /// A fixed-width integer slot.
        pub enum IntSlot<'a> {
            $(
                #[doc = concat!("A `", stringify!($ty), "` slot.")]
                $variant(&'a mut $ty),
            )*
        }

        impl IntSlot<'_> {
            /// Inclusive range representable by the slot.
            pub fn bounds(&self) -> (i128, i128) {
                match self {
                    $(IntSlot::$variant(_) => (i128::from(<$ty>::MIN), i128::from(<$ty>::MAX)),)*
                }
            }

            /// Name of the slot's integer type.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(IntSlot::$variant(_) => stringify!($ty),)*
                }
            }

            /// Store `value`; returns false if it does not fit.
            pub(crate) fn store(self, value: i128) -> bool {
                match self {
                    $(IntSlot::$variant(p) => match <$ty>::try_from(value) {
                        Ok(v) => {
                            *p = v;
                            true
                        }
                        Err(_) => false,
                    },)*
                }
            }
        }

        $(
            impl MapTarget for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Int(IntSlot::$variant(self))
                }
            }

            impl FreshTarget for $ty {
                fn fresh() -> Self {
                    0
                }
            }
        )*
    };
}

int_slots! {
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
}

/// A floating-point slot.
pub enum FloatSlot<'a> {
    /// An `f32` slot.
    F32(&'a mut f32),
    /// An `f64` slot.
    F64(&'a mut f64),
}

impl FloatSlot<'_> {
    /// Inclusive finite range representable by the slot.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            FloatSlot::F32(_) => (f64::from(f32::MIN), f64::from(f32::MAX)),
            FloatSlot::F64(_) => (f64::MIN, f64::MAX),
        }
    }

    /// Name of the slot's float type.
    pub fn type_name(&self) -> &'static str {
        match self {
            FloatSlot::F32(_) => "f32",
            FloatSlot::F64(_) => "f64",
        }
    }

    pub(crate) fn store(self, value: f64) {
        match self {
            FloatSlot::F32(p) => *p = value as f32,
            FloatSlot::F64(p) => *p = value,
        }
    }
}

/// A URI slot. `Url` has no empty value, so optional URIs get their own
/// variant instead of going through [`FreshTarget`].
pub enum UriSlot<'a> {
    /// A required `Url`.
    Required(&'a mut Url),
    /// An optional `Url`, set to `Some` on binding.
    Optional(&'a mut Option<Url>),
}

impl UriSlot<'_> {
    pub(crate) fn store(self, url: Url) {
        match self {
            UriSlot::Required(p) => *p = url,
            UriSlot::Optional(p) => *p = Some(url),
        }
    }
}

/// A homogeneous sequence target.
pub trait SequenceTarget {
    /// Replace the contents with `len` fresh elements, each populated by
    /// `fill`. Nothing is written if any element fails.
    fn bind_elements(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), MapError>;

    /// Run `probe` against a scratch element that is discarded afterwards.
    fn probe(&self, probe: &mut Probe<'_>) -> Result<(), MapError>;
}

/// A string-keyed dictionary target.
pub trait DictionaryTarget {
    /// Replace the contents with one fresh value per key, each populated by
    /// `fill`. Nothing is written if any entry fails.
    fn bind_entries(&mut self, keys: &[&str], fill: &mut FillEntry<'_>) -> Result<(), MapError>;

    /// Run `probe` against a scratch value that is discarded afterwards.
    fn probe(&self, probe: &mut Probe<'_>) -> Result<(), MapError>;
}

/// A record whose fields are bound to property names.
///
/// Usually implemented through [`record_target!`].
pub trait RecordTarget {
    /// Property names this record has a field for.
    fn fields(&self) -> &'static [&'static str];

    /// The field bound to `name`, if any.
    fn field(&mut self, name: &str) -> Option<&mut dyn MapTarget>;
}

impl<T: MapTarget + FreshTarget> SequenceTarget for Vec<T> {
    fn bind_elements(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), MapError> {
        let mut staged = Vec::with_capacity(len);
        for i in 0..len {
            let mut element = T::fresh();
            fill(i, &mut element)?;
            staged.push(element);
        }
        *self = staged;
        Ok(())
    }

    fn probe(&self, probe: &mut Probe<'_>) -> Result<(), MapError> {
        probe(&mut T::fresh())
    }
}

impl<T: MapTarget + FreshTarget> DictionaryTarget for HashMap<String, T> {
    fn bind_entries(&mut self, keys: &[&str], fill: &mut FillEntry<'_>) -> Result<(), MapError> {
        let mut staged = HashMap::with_capacity(keys.len());
        for key in keys {
            let mut value = T::fresh();
            fill(key, &mut value)?;
            staged.insert((*key).to_string(), value);
        }
        *self = staged;
        Ok(())
    }

    fn probe(&self, probe: &mut Probe<'_>) -> Result<(), MapError> {
        probe(&mut T::fresh())
    }
}

impl<T: MapTarget + FreshTarget> DictionaryTarget for BTreeMap<String, T> {
    fn bind_entries(&mut self, keys: &[&str], fill: &mut FillEntry<'_>) -> Result<(), MapError> {
        let mut staged = BTreeMap::new();
        for key in keys {
            let mut value = T::fresh();
            fill(key, &mut value)?;
            staged.insert((*key).to_string(), value);
        }
        *self = staged;
        Ok(())
    }

    fn probe(&self, probe: &mut Probe<'_>) -> Result<(), MapError> {
        probe(&mut T::fresh())
    }
}

// ---------------------------------------------------------------------------
// MapTarget / FreshTarget for standard storage
// ---------------------------------------------------------------------------

impl MapTarget for f32 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Float(FloatSlot::F32(self))
    }
}

impl MapTarget for f64 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Float(FloatSlot::F64(self))
    }
}

impl MapTarget for bool {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Bool(self)
    }
}

impl MapTarget for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::String(self)
    }
}

impl MapTarget for Url {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Uri(UriSlot::Required(self))
    }
}

impl MapTarget for Option<Url> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Uri(UriSlot::Optional(self))
    }
}

impl MapTarget for DateTime<FixedOffset> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::DateTime(self)
    }
}

impl MapTarget for DateTime<Utc> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::DateTimeUtc(self)
    }
}

impl MapTarget for chrono::Duration {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Duration(self)
    }
}

impl MapTarget for Value {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Dynamic(self)
    }
}

impl<T: MapTarget + FreshTarget> MapTarget for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }
}

impl<T: MapTarget + FreshTarget> MapTarget for HashMap<String, T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Dictionary(self)
    }
}

impl<T: MapTarget + FreshTarget> MapTarget for BTreeMap<String, T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Dictionary(self)
    }
}

/// Optional storage is allocated when it is bound.
impl<T: MapTarget + FreshTarget> MapTarget for Option<T> {
    fn slot(&mut self) -> Slot<'_> {
        self.get_or_insert_with(T::fresh).slot()
    }

    fn inspect_slot(&mut self, inspect: &mut InspectSlot<'_>) -> Result<(), MapError> {
        match self {
            Some(inner) => inner.inspect_slot(inspect),
            None => T::fresh().inspect_slot(inspect),
        }
    }
}

impl FreshTarget for f32 {
    fn fresh() -> Self {
        0.0
    }
}

impl FreshTarget for f64 {
    fn fresh() -> Self {
        0.0
    }
}

impl FreshTarget for bool {
    fn fresh() -> Self {
        false
    }
}

impl FreshTarget for String {
    fn fresh() -> Self {
        String::new()
    }
}

impl FreshTarget for DateTime<FixedOffset> {
    fn fresh() -> Self {
        DateTime::<Utc>::default().fixed_offset()
    }
}

impl FreshTarget for DateTime<Utc> {
    fn fresh() -> Self {
        DateTime::<Utc>::default()
    }
}

impl FreshTarget for chrono::Duration {
    fn fresh() -> Self {
        chrono::Duration::zero()
    }
}

impl FreshTarget for Value {
    fn fresh() -> Self {
        Value::Null
    }
}

impl<T> FreshTarget for Vec<T> {
    fn fresh() -> Self {
        Vec::new()
    }
}

impl<T> FreshTarget for HashMap<String, T> {
    fn fresh() -> Self {
        HashMap::new()
    }
}

impl<T> FreshTarget for BTreeMap<String, T> {
    fn fresh() -> Self {
        BTreeMap::new()
    }
}

impl<T> FreshTarget for Option<T> {
    fn fresh() -> Self {
        None
    }
}

/// Implement [`RecordTarget`], [`MapTarget`] and [`FreshTarget`] for a
/// struct from a table of `"property" => field` bindings.
///
/// Every field must itself implement [`MapTarget`], which is checked at
/// compile time. The struct must implement `Default`.
#[macro_export]
macro_rules! record_target {
    ($ty:ty { $($name:literal => $field:ident),* $(,)? }) => {
        impl $crate::RecordTarget for $ty {
            fn fields(&self) -> &'static [&'static str] {
                &[$($name),*]
            }

            fn field(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<&mut dyn $crate::MapTarget> {
                match name {
                    $($name => ::core::option::Option::Some(&mut self.$field),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl $crate::MapTarget for $ty {
            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Record(self)
            }
        }

        impl $crate::FreshTarget for $ty {
            fn fresh() -> Self {
                <$ty as ::core::default::Default>::default()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sample {
        count: i16,
        name: Option<String>,
        extra: Value,
    }

    record_target!(Sample {
        "count" => count,
        "name" => name,
        "weird key" => extra,
    });

    #[test]
    fn test_int_slot_bounds() {
        let mut a = 0i8;
        assert_eq!(IntSlot::I8(&mut a).bounds(), (-128, 127));
        let mut b = 0u32;
        assert_eq!(IntSlot::U32(&mut b).bounds(), (0, i128::from(u32::MAX)));
    }

    #[test]
    fn test_int_slot_store_rejects_overflow() {
        let mut a = 0i8;
        assert!(!IntSlot::I8(&mut a).store(300));
        assert_eq!(a, 0);
        assert!(IntSlot::I8(&mut a).store(-7));
        assert_eq!(a, -7);
    }

    #[test]
    fn test_slot_type_names() {
        let mut v = 0u16;
        assert_eq!(v.slot().type_name(), "u16");
        let mut s = String::new();
        assert_eq!(s.slot().type_name(), "String");
        let mut list: Vec<i32> = Vec::new();
        assert_eq!(list.slot().type_name(), "sequence");
        let mut record = Sample::default();
        assert_eq!(record.slot().type_name(), "record");
    }

    #[test]
    fn test_option_allocates_on_slot() {
        let mut name: Option<String> = None;
        match name.slot() {
            Slot::String(s) => s.push_str("bound"),
            _ => panic!("expected a string slot"),
        }
        assert_eq!(name.as_deref(), Some("bound"));
    }

    #[test]
    fn test_inspecting_an_option_leaves_it_empty() {
        let mut name: Option<String> = None;
        name.inspect_slot(&mut |slot| {
            assert_eq!(slot.type_name(), "String");
            Ok(())
        })
        .unwrap();
        assert_eq!(name, None);

        let mut nested: Option<Option<i8>> = Some(None);
        nested
            .inspect_slot(&mut |slot| {
                assert_eq!(slot.type_name(), "i8");
                Ok(())
            })
            .unwrap();
        assert_eq!(nested, Some(None));
    }

    #[test]
    fn test_float_slot_bounds() {
        let mut narrow = 0f32;
        assert_eq!(FloatSlot::F32(&mut narrow).bounds().1, f64::from(f32::MAX));
        let mut wide = 0f64;
        assert_eq!(FloatSlot::F64(&mut wide).bounds(), (f64::MIN, f64::MAX));
    }

    #[test]
    fn test_record_binding_table() {
        let mut record = Sample::default();
        assert_eq!(record.fields(), &["count", "name", "weird key"]);
        assert!(record.field("missing").is_none());
        match record.field("count").map(|f| f.slot()) {
            Some(Slot::Int(slot)) => assert!(slot.store(12)),
            _ => panic!("expected an integer slot"),
        }
        assert_eq!(record.count, 12);
        assert!(matches!(
            record.field("weird key").map(|f| f.slot()),
            Some(Slot::Dynamic(_))
        ));
    }

    #[test]
    fn test_sequence_fill_is_staged() {
        let mut list = vec![1i32, 2, 3];
        let result = list.bind_elements(3, &mut |i, element| {
            if i == 2 {
                return Err(MapError::mismatch("test", "i32"));
            }
            match element.slot() {
                Slot::Int(slot) => {
                    slot.store(10);
                    Ok(())
                }
                _ => unreachable!(),
            }
        });
        assert!(result.is_err());
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_dictionary_fill_replaces_contents() {
        let mut map: BTreeMap<String, bool> = BTreeMap::new();
        map.insert("old".into(), true);
        map.bind_entries(&["a", "b"], &mut |_, value| match value.slot() {
            Slot::Bool(b) => {
                *b = true;
                Ok(())
            }
            _ => unreachable!(),
        })
        .unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
