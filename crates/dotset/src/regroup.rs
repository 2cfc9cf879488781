//! Nesting a collection by field values.

use std::borrow::Cow;

use crate::record::FieldAccessible;
use crate::value::{Mapping, Value};

/// Groups `items` into nested mappings keyed by the text of each of `fields`.
///
/// Each item lands at `result[field0][field1]...[fieldN]`. The stored value
/// is the item itself, with records converted to mappings, or only the value
/// of its `only` field (null when missing). Items missing a grouping field,
/// or holding a container there, are grouped under `""`. When two items land
/// at the same position the later one wins. Empty `fields` yields an empty
/// mapping.
///
/// ```
/// use dotset::{regroup, Value};
///
/// let rows: Vec<Value> = serde_json::from_str(r#"[
///     {"team": "red", "name": "ada", "score": 3},
///     {"team": "blue", "name": "tim", "score": 5}
/// ]"#).unwrap();
///
/// let by_team = regroup(&rows, &["team", "name"], Some("score"));
/// assert_eq!(by_team["red"].as_mapping().unwrap()["ada"], Value::from(3));
/// ```
pub fn regroup<'a, I, K>(items: I, fields: &[K], only: Option<&str>) -> Mapping
where
    I: IntoIterator<Item = &'a Value>,
    K: AsRef<str>,
{
    let mut grouped = Mapping::new();
    if fields.is_empty() {
        return grouped;
    }

    let mut placed = 0usize;
    for item in items {
        let keys: Vec<String> = fields
            .iter()
            .map(|field| group_key(item, field.as_ref()))
            .collect();
        let payload = match only {
            Some(key) => item.field(key).map(Cow::into_owned).unwrap_or_default(),
            None => whole(item),
        };
        insert_at(&mut grouped, &keys, payload);
        placed += 1;
    }

    tracing::debug!(items = placed, groups = grouped.len(), "regrouped");
    grouped
}

fn group_key(item: &Value, field: &str) -> String {
    item.field(field)
        .and_then(|value| value.scalar_text().map(Cow::into_owned))
        .unwrap_or_default()
}

fn whole(item: &Value) -> Value {
    match item {
        Value::Record(record) => Value::Mapping(record.to_mapping()),
        other => other.clone(),
    }
}

fn insert_at(root: &mut Mapping, keys: &[String], payload: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut level = root;
    for key in parents {
        let slot = level
            .entry(key.clone())
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !matches!(slot, Value::Mapping(_)) {
            *slot = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(next) = slot else {
            return;
        };
        level = next;
    }
    level.insert(last.clone(), payload);
}
