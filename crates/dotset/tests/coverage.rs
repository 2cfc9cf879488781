//! End-to-end scenarios over the public API.

use std::borrow::Cow;

use dotset::{
    count_by_value, extract, extract_path, get, regroup, statistics_for_keys, DotsetError,
    FieldAccessible, Mapping, Number, NumberFormat, Path, PatternError, Record, Reducer, Value,
};

fn json(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

fn rows(text: &str) -> Vec<Value> {
    serde_json::from_str(text).unwrap()
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn literal_path_agrees_with_get() {
    let data = json(r#"{"a": {"b": [{"c": 1}, {"c": null}]}}"#);
    for path in ["a", "a.b", "a.b.0.c", "a.b.1.c", "a.b.2", "a.x.y", "a.b.0.c.d"] {
        let extracted = extract(&data, path).unwrap();
        let got: Vec<Value> = get(&data, path).map(Cow::into_owned).into_iter().collect();
        assert_eq!(extracted, got, "path {path}");
        assert!(extracted.len() <= 1);
    }
}

#[test]
fn empty_path_returns_root() {
    for text in [r#"{"a": 1}"#, "[1, 2]", "null", r#""x""#] {
        let data = json(text);
        assert_eq!(extract(&data, "").unwrap(), vec![data.clone()]);
    }
}

#[test]
fn repeated_extraction_is_identical() {
    let data = json(r#"{"x": [{"k": "b"}, {"k": "a"}, {"k": "c"}], "y": {"k": "d"}}"#);
    let path = Path::parse("{s}.{n}.k").unwrap();
    let first = extract_path(&data, &path);
    for _ in 0..5 {
        assert_eq!(extract_path(&data, &path), first);
    }
    assert_eq!(first, vec![Value::from("b"), Value::from("a"), Value::from("c")]);
}

#[test]
fn wildcard_classes() {
    let data = json(r#"{"1": "a", "2": "b", "x": "c"}"#);
    assert_eq!(
        extract(&data, "{n}").unwrap(),
        vec![Value::from("a"), Value::from("b")]
    );
    assert_eq!(extract(&data, "{s}").unwrap(), vec![Value::from("c")]);
}

#[test]
fn condition_filters_records_below_a_key() {
    let data = json(r#"{"items": [{"age": 30}, {"age": 15}]}"#);
    assert_eq!(
        extract(&data, "items.{n}[age>=18]").unwrap(),
        vec![json(r#"{"age": 30}"#)]
    );
    // the condition applies to the sequence itself, which has no `age`
    assert!(extract(&data, "items[age>=18]").unwrap().is_empty());
}

#[test]
fn condition_on_keyed_records() {
    let data = json(r#"{"items": {"age": 30}, "other": {"age": 15}}"#);
    assert_eq!(
        extract(&data, "items[age>=18]").unwrap(),
        vec![json(r#"{"age": 30}"#)]
    );
    assert_eq!(extract(&data, "{s}[age<18]").unwrap(), vec![json(r#"{"age": 15}"#)]);
}

#[test]
fn dots_inside_conditions_do_not_split() {
    let data = json(r#"{"items": [{"price": 1.25}, {"price": 1.75}, {"price": "2.5"}]}"#);
    let result = extract(&data, "items.{n}[price>1.5].price").unwrap();
    assert_eq!(result, vec![Value::from(1.75), Value::from("2.5")]);
}

#[test]
fn chained_tests_are_a_conjunction() {
    let data = json(
        r#"[
            {"name": "ada", "admin": true, "age": 36},
            {"name": "bob", "admin": true, "age": 17},
            {"name": "cy", "age": 40}
        ]"#,
    );
    assert_eq!(
        extract(&data, "{n}[admin][age>18].name").unwrap(),
        vec![Value::from("ada")]
    );
    assert_eq!(extract(&data, "{n}[admin].name").unwrap().len(), 2);
}

#[test]
fn pattern_conditions() {
    let data = json(r#"[{"mail": "Ada@Example.org"}, {"mail": "tim@test.net"}]"#);
    assert_eq!(
        extract(&data, "{n}[mail=/example\\.org$/i].mail").unwrap(),
        vec![Value::from("Ada@Example.org")]
    );
    assert!(extract(&data, "{n}[mail=/example\\.org$/].mail")
        .unwrap()
        .is_empty());
}

#[test]
fn pattern_may_contain_brackets_and_dots() {
    let data = json(r#"[{"v": "a.b"}, {"v": "ab"}, {"v": "]"}]"#);
    assert_eq!(
        extract(&data, "{n}[v=/^a\\.b$/].v").unwrap(),
        vec![Value::from("a.b")]
    );
    assert_eq!(extract(&data, "{n}[v=/^[\\]]$/].v").unwrap(), vec![Value::from("]")]);
}

#[test]
fn not_equal_and_textual_comparison() {
    let data = json(r#"[{"s": "apple"}, {"s": "pear"}, {"s": "fig"}]"#);
    assert_eq!(
        extract(&data, "{n}[s!=pear].s").unwrap(),
        vec![Value::from("apple"), Value::from("fig")]
    );
    assert_eq!(
        extract(&data, "{n}[s<g].s").unwrap(),
        vec![Value::from("apple"), Value::from("fig")]
    );
}

#[test]
fn numeric_comparison_uses_numbers_not_text() {
    let data = json(r#"[{"n": "9"}, {"n": 10}, {"n": "100"}]"#);
    assert_eq!(
        extract(&data, "{n}[n>9].n").unwrap(),
        vec![Value::from(10), Value::from("100")]
    );
}

#[test]
fn unbalanced_brackets_are_malformed() {
    let data = Value::Null;
    for path in ["a[b", "a]b", "a[b[c]]", "a[b]c", "a[=1]"] {
        match extract(&data, path) {
            Err(DotsetError::MalformedPath { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected malformed path for {path}, got {other:?}"),
        }
    }
}

#[test]
fn invalid_pattern_is_reported() {
    let err = extract(&Value::Null, "{n}[a=/(/]").unwrap_err();
    assert!(matches!(err, DotsetError::InvalidPattern { .. }));

    let err = extract(&Value::Null, "{n}[a=/x/g]").unwrap_err();
    assert!(matches!(
        err,
        DotsetError::InvalidPattern {
            source: PatternError::UnknownFlag('g'),
            ..
        }
    ));
}

#[test]
fn slash_operand_without_closing_slash_is_text() {
    let data = json(r#"[{"dir": "/tmp"}, {"dir": "/var"}]"#);
    assert_eq!(
        extract(&data, "{n}[dir=/tmp].dir").unwrap(),
        vec![Value::from("/tmp")]
    );
    assert_eq!(
        extract(&data, "{n}[dir!=/tmp].dir").unwrap(),
        vec![Value::from("/var")]
    );
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug)]
struct Invoice {
    number: u32,
    customer: &'static str,
    amount: f64,
}

impl Record for Invoice {
    fn to_mapping(&self) -> Mapping {
        let mut map = Mapping::new();
        map.insert("number".into(), Value::from(u64::from(self.number)));
        map.insert("customer".into(), Value::from(self.customer));
        map.insert("amount".into(), Value::from(self.amount));
        map
    }

    fn accessor(&self, name: &str) -> Option<Value> {
        match name {
            "label" => Some(Value::from(format!("INV-{}", self.number))),
            _ => None,
        }
    }
}

fn invoices() -> Vec<Invoice> {
    vec![
        Invoice {
            number: 1,
            customer: "acme",
            amount: 10.0,
        },
        Invoice {
            number: 2,
            customer: "acme",
            amount: 30.0,
        },
        Invoice {
            number: 3,
            customer: "globex",
            amount: 20.0,
        },
    ]
}

#[test]
fn records_resolve_attributes_before_accessors() {
    let invoice = &invoices()[0];
    assert_eq!(invoice.field("customer").as_deref(), Some(&Value::from("acme")));
    assert_eq!(invoice.field("label").as_deref(), Some(&Value::from("INV-1")));
    assert_eq!(invoice.field("missing"), None);
}

#[test]
fn statistics_over_plain_records() {
    let list = invoices();
    let stats = statistics_for_keys(&list, &["amount", "customer", "label"]);
    assert_eq!(stats["amount"].median, Some(20.0));
    // 10.0 reads back as the integer 10
    assert_eq!(stats["amount"].min, Some(Number::I64(10)));
    assert_eq!(
        stats["customer"].count_per_value.values().collect::<Vec<_>>(),
        vec!["acme", "globex"]
    );
    assert_eq!(stats["label"].count_per_value.len(), 3);
}

#[test]
fn extraction_through_record_values() {
    let data: Value = invoices().into_iter().map(Value::record).collect();
    assert_eq!(
        extract(&data, "{n}[customer=acme].number").unwrap(),
        vec![Value::from(1), Value::from(2)]
    );
    assert_eq!(get(&data, "2.customer").as_deref(), Some(&Value::from("globex")));
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn median_of_even_population() {
    let data = rows(r#"[{"v": 1}, {"v": 2}, {"v": 3}, {"v": 4}]"#);
    let stats = &statistics_for_keys(&data, &["v"])["v"];
    assert_eq!(stats.median, Some(2.5));
    assert_eq!(stats.average, Some(2.5));
    assert_eq!(stats.min, Some(Number::I64(1)));
    assert_eq!(stats.max, Some(Number::I64(4)));
}

#[test]
fn median_of_odd_population() {
    let data = rows(r#"[{"v": 1}, {"v": 2}, {"v": 3}]"#);
    assert_eq!(statistics_for_keys(&data, &["v"])["v"].median, Some(2.0));
}

#[test]
fn non_numeric_values_report_counts_only() {
    let data = rows(r#"[{"color": "red"}, {"color": "blue"}, {"color": "red"}]"#);
    let stats = statistics_for_keys(&data, &["color"]);
    let color = &stats["color"];
    assert_eq!(
        color.count_per_value.iter().collect::<Vec<_>>(),
        vec![("red", 2), ("blue", 1)]
    );
    let json = serde_json::to_value(color).unwrap();
    assert_eq!(json, serde_json::json!({"countPerValue": {"red": 2, "blue": 1}}));
}

#[test]
fn single_value_is_not_summarized() {
    let data = rows(r#"[{"v": 42}, {"w": 1}]"#);
    let stats = &statistics_for_keys(&data, &["v"])["v"];
    assert_eq!(stats.count_per_value.len(), 1);
    assert_eq!(stats.average, None);
    assert_eq!(stats.median, None);
    assert_eq!(stats.min, None);
    assert_eq!(stats.max, None);
}

#[test]
fn null_and_empty_values_are_never_counted() {
    let data = rows(r#"[{"v": null}, {"v": ""}, {"v": 3}, {"v": 5}, {}]"#);
    let table = count_by_value(&data, "v");
    assert_eq!(table.get(""), None);
    assert_eq!(table.get("null"), None);
    assert_eq!(table.total(), 2);

    let stats = &statistics_for_keys(&data, &["v"])["v"];
    assert_eq!(stats.average, Some(4.0));
}

#[test]
fn comma_decimal_separator() {
    let data = rows(r#"[{"v": "2,5"}, {"v": "1,5"}, {"v": "1.000,5"}]"#);
    let reducer = Reducer::with_format(NumberFormat::new(',').with_thousands('.'));
    let stats = &reducer.statistics_for_keys(&data, &["v"])["v"];
    assert_eq!(stats.min, Some(Number::F64(1.5)));
    assert_eq!(stats.median, Some(2.5));
    assert_eq!(stats.max, Some(Number::F64(1000.5)));
    assert_eq!(
        stats.count_per_value.values().collect::<Vec<_>>(),
        vec!["1,5", "2,5", "1.000,5"]
    );
}

#[test]
fn statistics_on_extracted_items() {
    let data = json(
        r#"{"runs": [
            {"ok": true, "ms": 12},
            {"ok": false, "ms": 900},
            {"ok": true, "ms": 20}
        ]}"#,
    );
    let ok = extract(&data, "runs.{n}[ok=true]").unwrap();
    let stats = statistics_for_keys(&ok, &["ms", "ok"]);
    assert_eq!(stats["ms"].average, Some(16.0));
    assert_eq!(stats["ok"].count_per_value.get("true"), Some(2));
}

// ============================================================================
// Regroup
// ============================================================================

#[test]
fn regroup_two_levels() {
    let data = rows(
        r#"[
            {"dept": "ops", "role": "lead", "name": "kim"},
            {"dept": "ops", "role": "dev", "name": "lee"},
            {"dept": "qa", "role": "dev", "name": "ray"}
        ]"#,
    );
    let grouped = Value::Mapping(regroup(&data, &["dept", "role"], Some("name")));
    assert_eq!(
        grouped,
        json(r#"{"ops": {"lead": "kim", "dev": "lee"}, "qa": {"dev": "ray"}}"#)
    );
    assert_eq!(get(&grouped, "ops.dev").as_deref(), Some(&Value::from("lee")));
}
