//! Comma-delimited text with a header row.

use super::FormatReader;
use crate::dataset::{Dataset, Value, cell_text};
use crate::error::{Result, TabmergeError};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Read, Write};

const DELIMITER: u8 = b',';
const TERMINATOR: u8 = b'\n';

/// Reads CSV. Every cell loads as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedReader;

impl FormatReader for DelimitedReader {
    fn read(&self, source: &mut dyn Read) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(false)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let mut seen = HashSet::with_capacity(headers.len());
        let mut columns = Vec::with_capacity(headers.len());
        for name in &headers {
            if !seen.insert(name) {
                return Err(TabmergeError::Parse(format!(
                    "duplicate header '{name}'"
                )));
            }
            columns.push(name.to_owned());
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| Value::String(field.to_owned()))
                    .collect(),
            );
        }

        Dataset::new(columns, rows)
    }
}

/// Write `dataset` as CSV: header line, then one line per row.
///
/// A dataset without columns writes nothing.
///
/// # Errors
///
/// Returns [`TabmergeError::Io`] if the sink fails.
pub fn write_delimited<W: Write>(dataset: &Dataset, sink: W) -> Result<()> {
    if dataset.column_count() == 0 {
        return Ok(());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(csv::Terminator::Any(TERMINATOR))
        .from_writer(sink);

    writer.write_record(dataset.column_names())?;
    for record in dataset.records() {
        let fields: Vec<Cow<'_, str>> = record.values().iter().map(cell_text).collect();
        writer.write_record(fields.iter().map(|f| f.as_bytes()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(text: &[u8]) -> Result<Dataset> {
        DelimitedReader.read(&mut &text[..])
    }

    fn write(dataset: &Dataset) -> String {
        let mut out = Vec::new();
        write_delimited(dataset, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_header_and_rows() {
        let ds = read(
            "Nome da Loja,Data da Venda\nFilial 1,2023-01-01\nFilial 2,2023-01-02\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(ds.column_names(), ["Nome da Loja", "Data da Venda"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(
            ds.record(1).unwrap().get("Nome da Loja"),
            Some(&json!("Filial 2"))
        );
    }

    #[test]
    fn test_read_quoted_fields() {
        let ds = read(b"nome,descricao\n\"Caneta, azul\",\"linha\nquebrada\"\n").unwrap();
        let row = ds.record(0).unwrap();
        assert_eq!(row.get("nome"), Some(&json!("Caneta, azul")));
        assert_eq!(row.get("descricao"), Some(&json!("linha\nquebrada")));
    }

    #[test]
    fn test_read_ragged_row_fails() {
        let err = read(b"a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, TabmergeError::Parse(_)), "{err}");
    }

    #[test]
    fn test_read_duplicate_header_fails() {
        let err = read(b"a,b,a\n1,2,3\n").unwrap_err();
        assert!(matches!(err, TabmergeError::Parse(msg) if msg.contains("'a'")));
    }

    #[test]
    fn test_read_invalid_utf8_fails() {
        let err = read(b"nome\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, TabmergeError::Parse(_)), "{err}");
    }

    #[test]
    fn test_read_empty_input() {
        let ds = read(b"").unwrap();
        assert_eq!(ds.column_count(), 0);
        assert_eq!(ds.row_count(), 0);
    }

    #[test]
    fn test_write_layout() {
        let ds = Dataset::new(
            vec!["Nome do Produto".to_owned(), "Preço do Produto (R$)".to_owned(), "Obs".to_owned()],
            vec![
                vec![json!("Caneta, azul"), json!(2.5), Value::Null],
                vec![json!("Caderno"), json!(12), json!("capa \"dura\"")],
            ],
        )
        .unwrap();

        assert_eq!(
            write(&ds),
            "Nome do Produto,Preço do Produto (R$),Obs\n\
             \"Caneta, azul\",2.5,\n\
             Caderno,12,\"capa \"\"dura\"\"\"\n"
        );
    }

    #[test]
    fn test_write_without_columns_is_empty() {
        assert_eq!(write(&Dataset::default()), "");
    }
}
