//! JSON records.
//!
//! Accepted layouts:
//! - `[{"col": value, ...}, ...]`
//! - `{"anything": [{"col": value, ...}, ...]}` (single-key envelope, may be empty)
//! - `{"col": [value, ...], ...}` (column-oriented, equal lengths)

use super::FormatReader;
use crate::dataset::{Dataset, Value};
use crate::error::{Result, TabmergeError};
use serde_json::Map;
use std::io::Read;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordReader;

impl FormatReader for RecordReader {
    fn read(&self, source: &mut dyn Read) -> Result<Dataset> {
        let value: Value = serde_json::from_reader(source)?;
        decode(value)
    }
}

fn decode(value: Value) -> Result<Dataset> {
    match value {
        Value::Array(items) => decode_records(items),
        Value::Object(map) if is_envelope(&map) => {
            let inner = map.into_iter().next().map(|(_, v)| v).unwrap_or_default();
            decode(inner)
        }
        Value::Object(map) => decode_columns(map),
        other => Err(TabmergeError::Parse(format!(
            "expected an array of records or an object, found {}",
            kind(&other)
        ))),
    }
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    if map.len() != 1 {
        return false;
    }
    matches!(
        map.values().next(),
        Some(Value::Array(items)) if items.iter().all(Value::is_object)
    )
}

fn decode_records(items: Vec<Value>) -> Result<Dataset> {
    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record),
            other => {
                return Err(TabmergeError::Parse(format!(
                    "record {idx} is {}, expected an object",
                    kind(&other)
                )));
            }
        }
    }
    Dataset::from_records(records)
}

fn decode_columns(map: Map<String, Value>) -> Result<Dataset> {
    let mut columns = Vec::with_capacity(map.len());
    let mut cells = Vec::with_capacity(map.len());
    let mut height = None;

    for (name, value) in map {
        let values = match value {
            Value::Array(values) => values,
            other => {
                return Err(TabmergeError::Parse(format!(
                    "column '{name}' is {}, expected an array",
                    kind(&other)
                )));
            }
        };
        match height {
            None => height = Some(values.len()),
            Some(h) if h != values.len() => {
                return Err(TabmergeError::Parse(format!(
                    "column '{name}' has {} values, expected {h}",
                    values.len()
                )));
            }
            Some(_) => {}
        }
        columns.push(name);
        cells.push(values.into_iter());
    }

    let rows = (0..height.unwrap_or(0))
        .map(|_| {
            cells
                .iter_mut()
                .map(|col| col.next().unwrap_or_default())
                .collect()
        })
        .collect();

    Dataset::new(columns, rows)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(text: &str) -> Result<Dataset> {
        RecordReader.read(&mut text.as_bytes())
    }

    #[test]
    fn test_array_of_records() {
        let ds = read(
            r#"[
                {"Nome do Produto": "Caneta", "Preço do Produto (R$)": 2.5, "Filial": "Centro"},
                {"Nome do Produto": "Caderno", "Preço do Produto (R$)": 12.0, "Filial": "Norte"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            ds.column_names(),
            ["Nome do Produto", "Preço do Produto (R$)", "Filial"]
        );
        assert_eq!(ds.row_count(), 2);
        assert_eq!(
            ds.record(0).unwrap().get("Preço do Produto (R$)"),
            Some(&json!(2.5))
        );
    }

    #[test]
    fn test_envelope() {
        let ds = read(r#"{"dados": [{"a": 1, "b": 2}, {"a": 3, "b": 4}]}"#).unwrap();
        assert_eq!(ds.column_names(), ["a", "b"]);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_column_oriented() {
        let ds = read(r#"{"a": [1, 2, 3], "b": ["x", "y", "z"]}"#).unwrap();
        assert_eq!(ds.column_names(), ["a", "b"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.record(2).unwrap().get("b"), Some(&json!("z")));
    }

    #[test]
    fn test_single_column_is_not_an_envelope() {
        let ds = read(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(ds.column_names(), ["a"]);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_empty_array() {
        let ds = read("[]").unwrap();
        assert_eq!(ds.column_count(), 0);
        assert!(ds.is_empty());
    }

    #[test]
    fn test_empty_envelope() {
        let ds = read(r#"{"dados": []}"#).unwrap();
        assert_eq!(ds.column_count(), 0);
        assert!(ds.is_empty());
    }

    #[test]
    fn test_records_without_keys_fail() {
        let err = read("[{}, {}, {}]").unwrap_err();
        assert!(matches!(err, TabmergeError::Parse(_)), "{err}");

        let err = read(r#"{"dados": [{}, {}]}"#).unwrap_err();
        assert!(matches!(err, TabmergeError::Parse(_)), "{err}");
    }

    #[test]
    fn test_rejected_layouts() {
        for bad in [
            r#"[{"a": 1}, 2]"#,
            r#"[{"a": 1}, {"b": 1}]"#,
            r#"{"a": [1, 2], "b": [1]}"#,
            r#"{"a": 1}"#,
            r#""texto""#,
            r#"[{"a": 1}"#,
        ] {
            let err = read(bad).unwrap_err();
            assert!(matches!(err, TabmergeError::Parse(_)), "{bad}: {err}");
        }
    }
}
