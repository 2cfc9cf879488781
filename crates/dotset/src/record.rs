//! Field access for records and mappings.
//!
//! [`FieldAccessible`] is the narrow get-by-name capability shared by every
//! value that has named fields. [`Record`] is implemented by application
//! types that want to take part in extraction without first being converted
//! into a [`Value`].

use std::borrow::Cow;
use std::fmt;

use crate::value::{Mapping, Value};

/// Get-by-name access to a field.
///
/// Returns `None` when the field does not exist. A field that exists but
/// holds null is `Some(Value::Null)`.
pub trait FieldAccessible {
    /// Returns the value of a field.
    fn field(&self, name: &str) -> Option<Cow<'_, Value>>;
}

/// A record-like object with a mapping view.
///
/// Only [`to_mapping`](Record::to_mapping) is required. Attribute lookup
/// defaults to the mapping view; override it when a single field is cheaper
/// to produce than the whole mapping.
///
/// # Manual Implementation
///
/// ```
/// use dotset::{extract, Mapping, Record, Value};
///
/// #[derive(Debug)]
/// struct User {
///     name: String,
///     born: i64,
/// }
///
/// impl Record for User {
///     fn to_mapping(&self) -> Mapping {
///         let mut map = Mapping::new();
///         map.insert("name".into(), Value::from(self.name.as_str()));
///         map.insert("born".into(), Value::from(self.born));
///         map
///     }
///
///     fn accessor(&self, name: &str) -> Option<Value> {
///         match name {
///             "age" => Some(Value::from(2024 - self.born)),
///             _ => None,
///         }
///     }
/// }
///
/// let users = Value::Sequence(vec![Value::record(User { name: "Ada".into(), born: 1990 })]);
/// let names = extract(&users, "{n}.name").unwrap();
/// assert_eq!(names, vec![Value::from("Ada")]);
/// ```
pub trait Record: fmt::Debug + Send + Sync {
    /// Converts the record into a mapping of its attributes.
    fn to_mapping(&self) -> Mapping;

    /// Returns a stored attribute.
    fn attribute(&self, name: &str) -> Option<Value> {
        self.to_mapping().shift_remove(name)
    }

    /// Returns a computed field that is not part of the mapping view.
    ///
    /// Consulted only when [`attribute`](Record::attribute) finds nothing.
    fn accessor(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl<R: Record + ?Sized> FieldAccessible for R {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.attribute(name)
            .or_else(|| self.accessor(name))
            .map(Cow::Owned)
    }
}

impl FieldAccessible for Mapping {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl FieldAccessible for Value {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        match self {
            Value::Mapping(map) => map.field(name),
            Value::Sequence(items) => sequence_index(name)
                .and_then(|index| items.get(index))
                .map(Cow::Borrowed),
            Value::Record(record) => record.field(name),
            _ => None,
        }
    }
}

/// Parses a canonical decimal sequence index.
///
/// `"01"` and `"+1"` are not indices, matching how they would be distinct
/// keys in a mapping.
pub(crate) fn sequence_index(name: &str) -> Option<usize> {
    let index: usize = name.parse().ok()?;
    let canonical = name.len() == 1 || !name.starts_with('0');
    (canonical && name.bytes().all(|b| b.is_ascii_digit())).then_some(index)
}
