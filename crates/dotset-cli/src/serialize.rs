//! JSON, YAML and CSV encodings of command results.

use serde::Serialize;
use serde_json::Value as Json;
use thiserror::Error;

use crate::output::OutputMode;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot encode result as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode result as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot encode result as CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot flush CSV output: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0:?} is not a data encoding")]
    NotStructured(OutputMode),
}

/// Encodes `data` in a structured mode. Text and Auto are rejected.
pub fn serialize<T: Serialize>(data: &T, mode: OutputMode) -> Result<String, RenderError> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputMode::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputMode::Csv => Table::from_json(&serde_json::to_value(data)?).to_csv(),
        other => Err(RenderError::NotStructured(other)),
    }
}

/// Rows and columns derived from a JSON shape.
///
/// A sequence of objects gets one column per key, in first-seen order.
/// Any other sequence is a single `value` column, an object becomes
/// `key,value` pairs and a scalar is one `value` cell.
#[derive(Debug, PartialEq)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn from_json(value: &Json) -> Table {
        match value {
            Json::Array(items) if !items.is_empty() && items.iter().all(Json::is_object) => {
                let objects: Vec<_> = items.iter().filter_map(Json::as_object).collect();
                let mut headers: Vec<String> = Vec::new();
                for key in objects.iter().flat_map(|o| o.keys()) {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
                let rows = objects
                    .iter()
                    .map(|o| headers.iter().map(|h| o.get(h).map(cell).unwrap_or_default()).collect())
                    .collect();
                Table { headers, rows }
            }
            Json::Array(items) => Table::column(items.iter().map(cell)),
            Json::Object(map) => Table {
                headers: vec!["key".into(), "value".into()],
                rows: map.iter().map(|(k, v)| vec![k.clone(), cell(v)]).collect(),
            },
            scalar => Table::column(std::iter::once(cell(scalar))),
        }
    }

    fn column(cells: impl Iterator<Item = String>) -> Table {
        Table {
            headers: vec!["value".into()],
            rows: cells.map(|c| vec![c]).collect(),
        }
    }

    fn to_csv(&self) -> Result<String, RenderError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn cell(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(text) => text.clone(),
        other => other.to_string(),
    }
}
