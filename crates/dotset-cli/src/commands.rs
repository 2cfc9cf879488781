//! Subcommands and their results.

use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dotset::{
    extract_path, get, regroup, FrequencyTable, Mapping, NumberFormat, Path, Reducer,
    Statistics, Value,
};
use indexmap::IndexMap;
use serde::Serialize;

use crate::output::OutputMode;
use crate::serialize::{serialize, RenderError};
use crate::settings::Settings;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up one value along dot-separated literal keys
    Get {
        /// Dot-separated keys, e.g. `users.0.name`
        path: String,
        /// Input document (default: stdin)
        file: Option<PathBuf>,
    },
    /// Extract every value matching a path expression
    Extract {
        /// Path expression, e.g. `users.{n}[age>=18].name`
        path: String,
        /// Input document (default: stdin)
        file: Option<PathBuf>,
    },
    /// Count the distinct values of a field across the items
    Count {
        /// Field to count
        key: String,
        /// Input document (default: stdin)
        file: Option<PathBuf>,
        #[command(flatten)]
        items: ItemsArgs,
    },
    /// Frequency tables and numeric statistics for fields
    Stats {
        /// Fields, separated by commas or spaces
        keys: String,
        /// Input document (default: stdin)
        file: Option<PathBuf>,
        #[command(flatten)]
        items: ItemsArgs,
    },
    /// Nest the items by the values of one or more fields
    Regroup {
        /// Grouping fields, separated by commas or spaces
        fields: String,
        /// Input document (default: stdin)
        file: Option<PathBuf>,
        /// Store only this field of each item
        #[arg(long, value_name = "KEY")]
        only: Option<String>,
        #[command(flatten)]
        items: ItemsArgs,
    },
}

/// Selection of the item collection for reducing commands.
#[derive(Debug, Clone, Default, Args)]
pub struct ItemsArgs {
    /// Path to the items. A literal path names a collection whose members
    /// are the items; a wildcard or conditional path yields the items
    /// directly. Default: the members of the document root.
    #[arg(long, value_name = "PATH")]
    pub at: Option<String>,
}

/// Result of a command, before rendering.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Single(Option<Value>),
    Values(Vec<Value>),
    Counts(FrequencyTable),
    Stats(IndexMap<String, Statistics>),
    Groups(Mapping),
}

impl Command {
    /// The input file named on the command line, if any.
    pub fn file(&self) -> Option<&FsPath> {
        match self {
            Command::Get { file, .. }
            | Command::Extract { file, .. }
            | Command::Count { file, .. }
            | Command::Stats { file, .. }
            | Command::Regroup { file, .. } => file.as_deref(),
        }
    }

    /// Runs the command against `document`.
    pub fn execute(&self, document: &Value, settings: &Settings) -> Result<Report> {
        let format = settings.number;
        let reducer = Reducer::with_format(format);
        let report = match self {
            Command::Get { path, .. } => {
                Report::Single(get(document, path).map(std::borrow::Cow::into_owned))
            }
            Command::Extract { path, .. } => {
                let path = compile(path, format)?;
                Report::Values(extract_path(document, &path))
            }
            Command::Count { key, items, .. } => {
                let items = select_items(document, items, format)?;
                Report::Counts(reducer.count_by_value(&items, key))
            }
            Command::Stats { keys, items, .. } => {
                let keys = split_list(keys);
                let items = select_items(document, items, format)?;
                Report::Stats(reducer.statistics_for_keys(&items, &keys))
            }
            Command::Regroup {
                fields,
                only,
                items,
                ..
            } => {
                let fields = split_list(fields);
                let items = select_items(document, items, format)?;
                Report::Groups(regroup(&items, &fields, only.as_deref()))
            }
        };
        Ok(report)
    }
}

fn compile(path: &str, format: NumberFormat) -> Result<Path> {
    Path::parse_with(path, format).with_context(|| format!("invalid path '{}'", path))
}

fn select_items(document: &Value, args: &ItemsArgs, format: NumberFormat) -> Result<Vec<Value>> {
    let items = match args.at.as_deref() {
        None => document.members().cloned().collect(),
        Some(at) => {
            let path = compile(at, format)?;
            let matched = extract_path(document, &path);
            if path.is_simple() {
                matched
                    .first()
                    .map(|collection| collection.members().cloned().collect())
                    .unwrap_or_default()
            } else {
                matched
            }
        }
    };
    tracing::debug!(items = items.len(), "selected items");
    Ok(items)
}

/// Splits a comma or whitespace separated list, dropping empty entries.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders a report in the given mode.
pub fn render(report: &Report, mode: OutputMode) -> Result<String, RenderError> {
    let mode = mode.resolve_auto();
    if mode.is_structured() {
        serialize(report, mode)
    } else {
        report.to_text()
    }
}

impl Report {
    /// Plain text rendering: one line per value, scalars unquoted.
    pub fn to_text(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        match self {
            Report::Single(None) => {}
            Report::Single(Some(value)) => out.push_str(&text_line(value)?),
            Report::Values(values) => {
                for value in values {
                    out.push_str(&text_line(value)?);
                    out.push('\n');
                }
            }
            Report::Counts(table) => push_counts(&mut out, table, ""),
            Report::Stats(stats) => {
                for (key, stat) in stats {
                    out.push_str(key);
                    if let (Some(avg), Some(median), Some(min), Some(max)) =
                        (stat.average, stat.median, stat.min, stat.max)
                    {
                        out.push_str(&format!(
                            ": average={} median={} min={} max={}",
                            avg, median, min, max
                        ));
                    }
                    out.push('\n');
                    push_counts(&mut out, &stat.count_per_value, "  ");
                }
            }
            Report::Groups(groups) => out.push_str(&serde_yaml::to_string(groups)?),
        }
        Ok(out)
    }
}

fn text_line(value: &Value) -> Result<String, RenderError> {
    match value.scalar_text() {
        Some(text) => Ok(text.into_owned()),
        None => Ok(serde_json::to_string(value)?),
    }
}

fn push_counts(out: &mut String, table: &FrequencyTable, indent: &str) {
    for (value, count) in table.iter() {
        out.push_str(&format!("{}{}\t{}\n", indent, value, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    fn run(command: Command, document: &Value) -> Report {
        command.execute(document, &Settings::default()).unwrap()
    }

    const PEOPLE: &str = r#"{
        "people": [
            {"name": "ada", "team": "red", "age": 36},
            {"name": "bo", "team": "blue", "age": 17},
            {"name": "cy", "team": "red", "age": 40}
        ]
    }"#;

    #[test]
    fn split_list_accepts_commas_and_spaces() {
        assert_eq!(split_list("a,b c,, d"), vec!["a", "b", "c", "d"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn get_and_extract() {
        let document = doc(PEOPLE);
        let report = run(
            Command::Get {
                path: "people.1.name".into(),
                file: None,
            },
            &document,
        );
        assert_eq!(report.to_text().unwrap(), "bo");

        let report = run(
            Command::Extract {
                path: "people.{n}[age>18].name".into(),
                file: None,
            },
            &document,
        );
        assert_eq!(report.to_text().unwrap(), "ada\ncy\n");
    }

    #[test]
    fn get_missing_renders_nothing_or_null() {
        let report = run(
            Command::Get {
                path: "nope".into(),
                file: None,
            },
            &doc(PEOPLE),
        );
        assert_eq!(report.to_text().unwrap(), "");
        assert_eq!(render(&report, OutputMode::Json).unwrap(), "null");
    }

    #[test]
    fn malformed_path_is_an_error() {
        let command = Command::Extract {
            path: "people[".into(),
            file: None,
        };
        let err = command
            .execute(&doc(PEOPLE), &Settings::default())
            .unwrap_err();
        assert!(err.to_string().contains("invalid path 'people['"));
    }

    #[test]
    fn count_with_literal_at() {
        let report = run(
            Command::Count {
                key: "team".into(),
                file: None,
                items: ItemsArgs {
                    at: Some("people".into()),
                },
            },
            &doc(PEOPLE),
        );
        assert_eq!(report.to_text().unwrap(), "red\t2\nblue\t1\n");
    }

    #[test]
    fn stats_with_conditional_at() {
        let report = run(
            Command::Stats {
                keys: "age,team".into(),
                file: None,
                items: ItemsArgs {
                    at: Some("people.{n}[team=red]".into()),
                },
            },
            &doc(PEOPLE),
        );
        assert_eq!(
            report.to_text().unwrap(),
            "age: average=38 median=38 min=36 max=40\n  36\t1\n  40\t1\nteam\n  red\t2\n"
        );
        let json = render(&report, OutputMode::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["age"]["median"], serde_json::json!(38.0));
        assert!(parsed["team"].get("median").is_none());
    }

    #[test]
    fn items_default_to_root_members() {
        let document = doc(r#"[{"v": "1,5"}, {"v": "2,5"}]"#);
        let settings = Settings::default().apply(crate::settings::Overrides {
            decimal: Some(','),
            ..Default::default()
        });
        let command = Command::Stats {
            keys: "v".into(),
            file: None,
            items: ItemsArgs::default(),
        };
        let Report::Stats(stats) = command.execute(&document, &settings).unwrap() else {
            panic!("expected statistics");
        };
        assert_eq!(stats["v"].average, Some(2.0));
    }

    #[test]
    fn json_numbers_keep_their_value_under_a_comma_format() {
        let document = doc(r#"[{"price": 2.5}, {"price": 1.5}]"#);
        let settings = Settings::default().apply(crate::settings::Overrides {
            decimal: Some(','),
            thousands: Some('.'),
            ..Default::default()
        });
        let command = Command::Stats {
            keys: "price".into(),
            file: None,
            items: ItemsArgs::default(),
        };
        let report = command.execute(&document, &settings).unwrap();
        assert_eq!(
            report.to_text().unwrap(),
            "price: average=2 median=2 min=1.5 max=2.5\n  1.5\t1\n  2.5\t1\n"
        );
    }

    #[test]
    fn regroup_renders_yaml_text() {
        let report = run(
            Command::Regroup {
                fields: "team name".into(),
                file: None,
                only: Some("age".into()),
                items: ItemsArgs {
                    at: Some("people".into()),
                },
            },
            &doc(PEOPLE),
        );
        assert_eq!(
            report.to_text().unwrap(),
            "red:\n  ada: 36\n  cy: 40\nblue:\n  bo: 17\n"
        );
    }

    #[test]
    fn csv_of_extracted_records() {
        let report = run(
            Command::Extract {
                path: "people.{n}[team=blue]".into(),
                file: None,
            },
            &doc(PEOPLE),
        );
        assert_eq!(
            render(&report, OutputMode::Csv).unwrap(),
            "name,team,age\nbo,blue,17\n"
        );
    }

    #[test]
    fn containers_render_as_compact_json() {
        let report = Report::Values(vec![doc(r#"{"a": [1, 2]}"#), Value::Null]);
        assert_eq!(report.to_text().unwrap(), "{\"a\":[1,2]}\n\n");
    }
}
