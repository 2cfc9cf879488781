//! Dotset - dotted-path extraction and statistics over nested collections.
//!
//! Dotset evaluates compact path expressions against trees of mappings,
//! sequences and user records, and reduces the results into frequency
//! tables and descriptive statistics. It supports:
//!
//! - Literal keys, and the `{n}` / `{s}` wildcards for numeric and string keys
//! - Attribute conditions: presence, `=`, `!=`, `>`, `<`, `>=`, `<=`, and
//!   `/regex/flags` matches, chained as `[a][b>1]`
//! - User records through the [`Record`] trait
//! - Per-field counts, average, median, min and max
//! - Nesting a collection by field values with [`regroup`]
//!
//! # Quick Start
//!
//! ```rust
//! use dotset::{extract, statistics_for_keys, Value};
//!
//! let data: Value = serde_json::from_str(r#"{
//!     "orders": [
//!         {"sku": "A-1", "qty": 2, "status": "paid"},
//!         {"sku": "B-7", "qty": 5, "status": "paid"},
//!         {"sku": "C-3", "qty": 1, "status": "open"}
//!     ]
//! }"#).unwrap();
//!
//! let paid = extract(&data, "orders.{n}[status=paid]").unwrap();
//! assert_eq!(paid.len(), 2);
//!
//! let stats = statistics_for_keys(&paid, &["qty", "status"]);
//! assert_eq!(stats["qty"].average, Some(3.5));
//! assert_eq!(stats["status"].count_per_value.get("paid"), Some(2));
//! ```
//!
//! # Path Semantics
//!
//! A path is evaluated one segment at a time. Each stage replaces every
//! candidate by those of its entries whose key matches the segment's token,
//! then keeps the entries that satisfy the segment's condition:
//!
//! ```text
//! users.{n}[age>=18][name=/^a/i].email
//! ```
//!
//! - Conditions filter the values matched by their own segment
//! - A stage with no survivors ends evaluation with an empty result
//! - Paths without wildcards or conditions are plain lookups ([`get`])
//!
//! Comparisons are numeric when both sides parse as numbers under the
//! active [`NumberFormat`], and textual otherwise.

mod condition;
mod error;
mod extract;
mod number;
mod op;
mod path;
mod record;
mod regroup;
mod stats;
mod value;

pub use condition::{AttrTest, Condition, Operand, Predicate};
pub use error::{DotsetError, PatternError, Result};
pub use extract::{extract, extract_path, get, get_segments};
pub use number::{Number, NumberFormat};
pub use op::Op;
pub use path::{Path, Segment, Token};
pub use record::{FieldAccessible, Record};
pub use regroup::regroup;
pub use stats::{
    average, count_by_value, median, statistics_for_keys, FrequencyTable, Reducer, Statistics,
};
pub use value::{Mapping, Members, Value};
