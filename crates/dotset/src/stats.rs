//! Frequency tables and descriptive statistics.
//!
//! [`count_by_value`] counts the distinct values of one field across a
//! collection. [`statistics_for_keys`] does that for several fields and, for
//! fields whose every value is numeric, adds the average, median, minimum
//! and maximum of the weighted population.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use crate::number::{Number, NumberFormat};
use crate::record::FieldAccessible;

/// Distinct values and how often each occurred.
///
/// Values are keyed by their canonical text, so `1` and `"1"` are the same
/// entry. Entries start out in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        FrequencyTable::default()
    }

    /// Counts one more occurrence of `value`.
    pub fn increment(&mut self, value: impl Into<String>) {
        *self.counts.entry(value.into()).or_insert(0) += 1;
    }

    /// Returns the count of `value`, if it occurred.
    pub fn get(&self, value: &str) -> Option<usize> {
        self.counts.get(value).copied()
    }

    /// Returns the number of distinct values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no value occurred.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterates over `(value, count)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(value, count)| (value.as_str(), *count))
    }

    /// Iterates over the values in table order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Sorts by descending count. Ties keep their relative order.
    pub fn sort_by_count_desc(&mut self) {
        self.counts.sort_by(|_, a, _, b| b.cmp(a));
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        FrequencyTable {
            counts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Statistics for one field.
///
/// The numeric fields are present only when every counted value was numeric
/// and more than one value was counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Frequency of each distinct value.
    ///
    /// Ascending by value for numeric fields, descending by count otherwise.
    pub count_per_value: FrequencyTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
}

impl Statistics {
    fn frequencies_only(count_per_value: FrequencyTable) -> Self {
        Statistics {
            count_per_value,
            average: None,
            median: None,
            min: None,
            max: None,
        }
    }

    /// Returns `true` if the numeric fields were computed.
    pub fn is_numeric(&self) -> bool {
        self.average.is_some()
    }
}

/// Occurrences of one distinct value and its numeric reading.
#[derive(Debug, Clone, Copy)]
struct Tally {
    count: usize,
    number: Option<Number>,
}

/// Outcome of reading a frequency table as numbers.
enum Classification {
    /// Every value parsed; entries keep table order.
    Numeric(Vec<(String, Number, usize)>),
    /// At least one value did not parse.
    NonNumeric,
}

/// Computes frequency tables and statistics with a given [`NumberFormat`].
///
/// ```
/// use dotset::{NumberFormat, Reducer, Value};
///
/// let rows: Vec<Value> = serde_json::from_str(
///     r#"[{"w": "1,5"}, {"w": "2,5"}, {"w": "2,5"}]"#,
/// ).unwrap();
///
/// let stats = Reducer::with_format(NumberFormat::new(',')).statistics_for_keys(&rows, &["w"]);
/// assert_eq!(stats["w"].median, Some(2.5));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Reducer {
    format: NumberFormat,
}

impl Reducer {
    /// Creates a reducer with the default number format.
    pub fn new() -> Self {
        Reducer::default()
    }

    /// Creates a reducer reading numbers with `format`.
    pub fn with_format(format: NumberFormat) -> Self {
        Reducer { format }
    }

    /// Counts the distinct values of `key` across `items`.
    ///
    /// Items without the field, and fields holding null, the empty string
    /// or a container, are not counted.
    pub fn count_by_value<'a, I, T>(&self, items: I, key: &str) -> FrequencyTable
    where
        I: IntoIterator<Item = &'a T>,
        T: FieldAccessible + ?Sized + 'a,
    {
        self.tally(items, key)
            .into_iter()
            .map(|(text, entry)| (text, entry.count))
            .collect()
    }

    /// Counts like [`Reducer::count_by_value`], keeping the numeric reading
    /// of every entry. Native numbers are taken as they are; only text goes
    /// through the format. An entry is numeric only if each of its
    /// occurrences was.
    fn tally<'a, I, T>(&self, items: I, key: &str) -> IndexMap<String, Tally>
    where
        I: IntoIterator<Item = &'a T>,
        T: FieldAccessible + ?Sized + 'a,
    {
        let mut tally: IndexMap<String, Tally> = IndexMap::new();
        for item in items {
            let Some(value) = item.field(key) else {
                continue;
            };
            let text = match value.scalar_text() {
                Some(text) if !text.is_empty() => text.into_owned(),
                Some(_) => continue,
                None => {
                    tracing::trace!(key, kind = value.kind(), "skipping non-scalar value");
                    continue;
                }
            };
            let number = value.as_number(&self.format);
            tally
                .entry(text)
                .and_modify(|entry| {
                    entry.count += 1;
                    entry.number = entry.number.filter(|_| number.is_some());
                })
                .or_insert(Tally { count: 1, number });
        }
        tally
    }

    /// Computes [`Statistics`] for each of `keys`, in the order given.
    pub fn statistics_for_keys<'a, I, T, K>(
        &self,
        items: I,
        keys: &[K],
    ) -> IndexMap<String, Statistics>
    where
        I: IntoIterator<Item = &'a T>,
        T: FieldAccessible + ?Sized + 'a,
        K: AsRef<str>,
    {
        let items: Vec<&'a T> = items.into_iter().collect();
        keys.iter()
            .map(|key| {
                let key = key.as_ref();
                let tally = self.tally(items.iter().copied(), key);
                (key.to_string(), summarize(key, tally))
            })
            .collect()
    }
}

fn classify(tally: &IndexMap<String, Tally>) -> Classification {
    let mut entries = Vec::with_capacity(tally.len());
    for (text, entry) in tally {
        match entry.number {
            Some(number) => entries.push((text.clone(), number, entry.count)),
            None => return Classification::NonNumeric,
        }
    }
    Classification::Numeric(entries)
}

fn summarize(key: &str, tally: IndexMap<String, Tally>) -> Statistics {
    let mut entries = match classify(&tally) {
        Classification::Numeric(entries) => entries,
        Classification::NonNumeric => {
            tracing::debug!(key, "non-numeric value found, reporting frequencies only");
            let mut table = frequencies(tally);
            table.sort_by_count_desc();
            return Statistics::frequencies_only(table);
        }
    };

    let total: usize = entries.iter().map(|(_, _, count)| count).sum();
    if total <= 1 {
        return Statistics::frequencies_only(frequencies(tally));
    }

    entries.sort_by(|a, b| a.1.compare(b.1).unwrap_or(Ordering::Equal));

    let weighted: f64 = entries
        .iter()
        .map(|(_, number, count)| number.to_f64() * *count as f64)
        .sum();
    let middle = total / 2;
    let median = if total % 2 == 1 {
        weighted_nth(&entries, middle)
    } else {
        (weighted_nth(&entries, middle - 1) + weighted_nth(&entries, middle)) / 2.0
    };
    let min = entries.first().map(|(_, number, _)| *number);
    let max = entries.last().map(|(_, number, _)| *number);

    Statistics {
        count_per_value: entries
            .into_iter()
            .map(|(text, _, count)| (text, count))
            .collect(),
        average: Some(weighted / total as f64),
        median: Some(median),
        min,
        max,
    }
}

fn frequencies(tally: IndexMap<String, Tally>) -> FrequencyTable {
    tally.into_iter().map(|(text, entry)| (text, entry.count)).collect()
}

/// Returns the `n`th element of the population the sorted entries describe.
fn weighted_nth(entries: &[(String, Number, usize)], n: usize) -> f64 {
    let mut seen = 0;
    for (_, number, count) in entries {
        seen += count;
        if n < seen {
            return number.to_f64();
        }
    }
    entries.last().map_or(f64::NAN, |(_, number, _)| number.to_f64())
}

/// Counts the distinct values of `key` with the default [`Reducer`].
pub fn count_by_value<'a, I, T>(items: I, key: &str) -> FrequencyTable
where
    I: IntoIterator<Item = &'a T>,
    T: FieldAccessible + ?Sized + 'a,
{
    Reducer::new().count_by_value(items, key)
}

/// Computes statistics for `keys` with the default [`Reducer`].
///
/// ```
/// use dotset::{statistics_for_keys, Number, Value};
///
/// let rows: Vec<Value> = serde_json::from_str(
///     r#"[{"v": 1}, {"v": 2}, {"v": 3}, {"v": 4}]"#,
/// ).unwrap();
///
/// let stats = statistics_for_keys(&rows, &["v"]);
/// assert_eq!(stats["v"].median, Some(2.5));
/// assert_eq!(stats["v"].max, Some(Number::I64(4)));
/// ```
pub fn statistics_for_keys<'a, I, T, K>(items: I, keys: &[K]) -> IndexMap<String, Statistics>
where
    I: IntoIterator<Item = &'a T>,
    T: FieldAccessible + ?Sized + 'a,
    K: AsRef<str>,
{
    Reducer::new().statistics_for_keys(items, keys)
}

/// Median of an unweighted list of numbers.
///
/// Even-length lists average the two middle values. NaN values sort as
/// equal to everything. Returns `None` for an empty list.
pub fn median(values: &[Number]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().map(|n| n.to_f64()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Some(sorted[middle])
    }
}

/// Arithmetic mean of a list of numbers, or `None` for an empty list.
pub fn average(values: &[Number]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|n| n.to_f64()).sum();
    Some(sum / values.len() as f64)
}
