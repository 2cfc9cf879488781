//! The extraction engine.
//!
//! [`get`] descends along literal keys and returns at most one value.
//! [`extract`] evaluates a full [`Path`] breadth-first: each segment expands
//! the current candidates into their entries, keeps the entries whose key
//! matches the token, and filters the survivors by the segment's condition.
//!
//! Both work on borrowed input and never recurse, so deeply nested
//! collections cannot exhaust the stack.

use std::borrow::Cow;

use crate::error::Result;
use crate::number::NumberFormat;
use crate::path::{Path, Token};
use crate::record::{sequence_index, FieldAccessible};
use crate::value::{Mapping, Value};

/// Looks up a single value along a dot-separated path of literal keys.
///
/// Mappings are indexed by exact key, sequences by canonical decimal index
/// and records by attribute. Any miss yields `None`; a present null yields
/// `Some(Value::Null)`. The empty path yields `None`.
///
/// ```
/// use dotset::{get, Value};
///
/// let data: Value = serde_json::from_str(r#"{"a": {"b": [10, 20]}, "n": null}"#).unwrap();
/// assert_eq!(get(&data, "a.b.1").as_deref(), Some(&Value::from(20)));
/// assert_eq!(get(&data, "n").as_deref(), Some(&Value::Null));
/// assert_eq!(get(&data, "a.c"), None);
/// ```
pub fn get<'a>(collection: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    if path.is_empty() {
        return None;
    }
    get_segments(collection, path.split('.'))
}

/// Like [`get`], with the path already split into segments.
pub fn get_segments<'a, I, S>(collection: &'a Value, segments: I) -> Option<Cow<'a, Value>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segments = segments.into_iter().peekable();
    segments.peek()?;

    let mut current = Cow::Borrowed(collection);
    for segment in segments {
        current = child(current, segment.as_ref())?;
    }
    Some(current)
}

fn child<'a>(parent: Cow<'a, Value>, key: &str) -> Option<Cow<'a, Value>> {
    match parent {
        Cow::Borrowed(value) => value.field(key),
        Cow::Owned(Value::Mapping(mut map)) => map.shift_remove(key).map(Cow::Owned),
        Cow::Owned(Value::Sequence(mut items)) => sequence_index(key)
            .filter(|&index| index < items.len())
            .map(|index| Cow::Owned(items.swap_remove(index))),
        Cow::Owned(Value::Record(record)) => record.field(key).map(|v| Cow::Owned(v.into_owned())),
        Cow::Owned(_) => None,
    }
}

/// Extracts every value matching `path`.
///
/// The empty path returns the collection itself. Paths without wildcards or
/// conditions are answered by [`get`]. A stage that matches nothing yields
/// an empty result; only a malformed path is an error.
///
/// A condition tests the values its own segment matched: `items[age>=18]`
/// tests `items` itself, while `items.{n}[age>=18]` tests its elements.
///
/// ```
/// use dotset::{extract, Value};
///
/// let data: Value = serde_json::from_str(
///     r#"{"users": [{"name": "Ada", "age": 36}, {"name": "Tim", "age": 15}]}"#,
/// ).unwrap();
///
/// let adults = extract(&data, "users.{n}[age>=18].name").unwrap();
/// assert_eq!(adults, vec![Value::from("Ada")]);
/// ```
pub fn extract(collection: &Value, path: &str) -> Result<Vec<Value>> {
    let path = Path::parse(path)?;
    Ok(extract_path(collection, &path))
}

/// Extracts every value matching an already compiled path.
pub fn extract_path(collection: &Value, path: &Path) -> Vec<Value> {
    if path.is_empty() {
        return vec![collection.clone()];
    }

    if path.is_simple() {
        return get_segments(collection, path.literal_keys())
            .map(Cow::into_owned)
            .into_iter()
            .collect();
    }

    let format = path.format();
    let mut candidates: Vec<Cow<'_, Value>> = vec![Cow::Borrowed(collection)];

    for (depth, segment) in path.segments().iter().enumerate() {
        let mut next = Vec::new();
        for candidate in candidates {
            expand(candidate, segment.token(), format, &mut next);
        }
        if let Some(condition) = segment.condition() {
            next.retain(|value| condition.matches(value, format));
        }

        tracing::trace!(depth, matched = next.len(), "extract stage");
        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }

    candidates.into_iter().map(Cow::into_owned).collect()
}

/// Pushes the entries of `candidate` whose key matches `token`.
fn expand<'a>(
    candidate: Cow<'a, Value>,
    token: &Token,
    format: &NumberFormat,
    next: &mut Vec<Cow<'a, Value>>,
) {
    match candidate {
        Cow::Borrowed(Value::Mapping(map)) => next.extend(
            map.iter()
                .filter(|(key, _)| token.matches_key(key.as_str(), format))
                .map(|(_, value)| Cow::Borrowed(value)),
        ),
        Cow::Borrowed(Value::Sequence(items)) => next.extend(
            items
                .iter()
                .enumerate()
                .filter(|(index, _)| token.matches_index(*index))
                .map(|(_, value)| Cow::Borrowed(value)),
        ),
        Cow::Borrowed(Value::Record(record)) => {
            expand_owned_mapping(record.to_mapping(), token, format, next)
        }
        Cow::Owned(Value::Mapping(map)) => expand_owned_mapping(map, token, format, next),
        Cow::Owned(Value::Sequence(items)) => next.extend(
            items
                .into_iter()
                .enumerate()
                .filter(|(index, _)| token.matches_index(*index))
                .map(|(_, value)| Cow::Owned(value)),
        ),
        Cow::Owned(Value::Record(record)) => {
            expand_owned_mapping(record.to_mapping(), token, format, next)
        }
        // scalars have no entries
        _ => {}
    }
}

fn expand_owned_mapping<'a>(
    map: Mapping,
    token: &Token,
    format: &NumberFormat,
    next: &mut Vec<Cow<'a, Value>>,
) {
    next.extend(
        map.into_iter()
            .filter(|(key, _)| token.matches_key(key, format))
            .map(|(_, value)| Cow::Owned(value)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[derive(Debug)]
    struct Order {
        sku: &'static str,
        total: i64,
    }

    impl Record for Order {
        fn to_mapping(&self) -> Mapping {
            let mut map = Mapping::new();
            map.insert("sku".into(), Value::from(self.sku));
            map.insert("total".into(), Value::from(self.total));
            map
        }
    }

    #[test]
    fn get_descends_mappings_and_sequences() {
        let data = json(r#"{"a": {"b": [{"c": 1}, {"c": 2}]}}"#);
        assert_eq!(get(&data, "a.b.1.c").as_deref(), Some(&Value::from(2)));
    }

    #[test]
    fn get_misses_are_absent() {
        let data = json(r#"{"a": {"b": 1}}"#);
        assert_eq!(get(&data, "a.x"), None);
        assert_eq!(get(&data, "a.b.c"), None);
        assert_eq!(get(&data, ""), None);
    }

    #[test]
    fn get_distinguishes_present_null() {
        let data = json(r#"{"a": null}"#);
        assert_eq!(get(&data, "a").as_deref(), Some(&Value::Null));
        assert_eq!(get(&data, "a.b"), None);
    }

    #[test]
    fn get_borrows_from_the_collection() {
        let data = json(r#"{"a": {"b": 1}}"#);
        assert!(matches!(get(&data, "a.b"), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn get_through_records() {
        let data = Value::Sequence(vec![Value::record(Order {
            sku: "X-1",
            total: 40,
        })]);
        assert_eq!(get(&data, "0.sku").as_deref(), Some(&Value::from("X-1")));
    }

    #[test]
    fn get_segments_allows_dots_in_keys() {
        let data = json(r#"{"a.b": {"c": true}}"#);
        assert_eq!(
            get_segments(&data, ["a.b", "c"]).as_deref(),
            Some(&Value::Bool(true))
        );
        assert_eq!(get_segments(&data, Vec::<&str>::new()), None);
    }

    #[test]
    fn extract_empty_path_is_root() {
        let data = json(r#"{"a": 1}"#);
        assert_eq!(extract(&data, "").unwrap(), vec![data.clone()]);
    }

    #[test]
    fn extract_simple_path_uses_get() {
        let data = json(r#"{"a": {"b": 3}}"#);
        assert_eq!(extract(&data, "a.b").unwrap(), vec![Value::from(3)]);
        assert!(extract(&data, "a.z").unwrap().is_empty());
    }

    #[test]
    fn extract_wildcards_keep_insertion_order() {
        let data = json(r#"{"2": "b", "x": "c", "1": "a"}"#);
        assert_eq!(
            extract(&data, "{n}").unwrap(),
            vec![Value::from("b"), Value::from("a")]
        );
        assert_eq!(extract(&data, "{s}").unwrap(), vec![Value::from("c")]);
    }

    #[test]
    fn extract_condition_filters_expanded_values() {
        let data = json(r#"{"items": [{"age": 30}, {"age": 15}]}"#);
        let result = extract(&data, "items.{n}[age>=18]").unwrap();
        assert_eq!(result, vec![json(r#"{"age": 30}"#)]);
    }

    #[test]
    fn extract_condition_on_literal_segment() {
        let data = json(r#"{"cfg": {"on": true}, "other": {"on": false}}"#);
        assert_eq!(extract(&data, "cfg[on=true]").unwrap().len(), 1);
        assert!(extract(&data, "other[on=true]").unwrap().is_empty());
    }

    #[test]
    fn extract_collapses_on_empty_stage() {
        let data = json(r#"{"a": [1, 2]}"#);
        assert!(extract(&data, "b.{n}.c").unwrap().is_empty());
        assert!(extract(&data, "a.{n}.c").unwrap().is_empty());
    }

    #[test]
    fn extract_through_records() {
        let data = Value::Sequence(vec![
            Value::record(Order {
                sku: "A",
                total: 10,
            }),
            Value::record(Order {
                sku: "B",
                total: 99,
            }),
        ]);
        assert_eq!(
            extract(&data, "{n}[total>50].sku").unwrap(),
            vec![Value::from("B")]
        );
    }

    #[test]
    fn extract_literal_numeric_matches_sequence_index() {
        let data = json(r#"[{"id": "a"}, {"id": "b"}]"#);
        assert_eq!(
            extract(&data, "1[id].id").unwrap(),
            vec![Value::from("b")]
        );
    }

    #[test]
    fn extract_deeply_nested_without_recursion() {
        let mut value = Value::from("leaf");
        for _ in 0..10_000 {
            let mut map = Mapping::new();
            map.insert("k".into(), value);
            value = Value::Mapping(map);
        }
        let path = vec!["{s}"; 10_000].join(".");
        assert_eq!(extract(&value, &path).unwrap(), vec![Value::from("leaf")]);
        // Drop the nested structure iteratively to keep the test itself stack-safe.
        let mut current = value;
        while let Value::Mapping(mut map) = current {
            current = map.shift_remove("k").unwrap_or_default();
        }
    }

    #[test]
    fn extract_rejects_malformed_paths() {
        let data = Value::Null;
        assert!(extract(&data, "a[b").is_err());
    }
}
