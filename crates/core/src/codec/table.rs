//! CSV implementation of [`TableCodec`].

use std::iter;

use super::{CodecError, TableCodec};
use crate::types::{Row, Table};

/// CSV codec backed by the `csv` crate.
///
/// Rows may be shorter or longer than the header: missing trailing fields read
/// as empty and surplus fields are dropped. Blank lines are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl TableCodec for CsvCodec {
    fn decode(&self, text: &str) -> Result<Table, CodecError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                tracing::debug!(
                    line = record.position().map(csv::Position::line),
                    fields = record.len(),
                    columns = headers.len(),
                    "Dropping fields beyond the header"
                );
            }
            let fields = record.iter().chain(iter::repeat(""));
            rows.push(headers.iter().zip(fields).collect::<Row>());
        }

        let columns = headers.iter().map(str::to_string).collect();
        Ok(Table::new(columns, rows))
    }

    fn encode(&self, table: &Table) -> Result<String, CodecError> {
        let header = table.header();
        if header.is_empty() {
            return Ok(String::new());
        }

        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(header.iter().copied())?;
        for row in &table.rows {
            writer.write_record(
                header
                    .iter()
                    .map(|column| row.get(column).unwrap_or_default()),
            )?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CodecError::Io(e.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tagging::{RowGate, TagAssignment, apply_tags};

    #[test]
    fn test_decode_indexes_by_header() {
        let table = CsvCodec
            .decode("Handle,Title,Tags\nmug-01,Mug,featured\nmug-01,,\n")
            .unwrap();
        assert_eq!(table.columns, vec!["Handle", "Title", "Tags"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Handle"), Some("mug-01"));
        assert_eq!(table.rows[0].title(), "Mug");
        assert_eq!(table.rows[1].title(), "");
    }

    #[test]
    fn test_decode_handles_quoted_commas_and_newlines() {
        let text = "Handle,Body (HTML),Tags\nmug-01,\"<p>Big, bold\nmug</p>\",\"a, b\"\n";
        let rows = CsvCodec.decode(text).unwrap().rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Body (HTML)"), Some("<p>Big, bold\nmug</p>"));
        assert_eq!(rows[0].tags(), "a, b");
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let rows = CsvCodec.decode("Handle\nmug-01\n\nmug-02\n\n").unwrap().rows;
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_decode_pads_short_rows_to_header() {
        let rows = CsvCodec.decode("Handle,Title,Tags\nmug-01,Mug\n").unwrap().rows;
        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(columns, vec!["Handle", "Title", "Tags"]);
        assert_eq!(rows[0].get("Tags"), Some(""));
    }

    #[test]
    fn test_decode_drops_fields_beyond_header() {
        let rows = CsvCodec.decode("Handle,Title\nmug-01,Mug,extra\n").unwrap().rows;
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].title(), "Mug");
    }

    #[test]
    fn test_decode_empty_text() {
        let table = CsvCodec.decode("").unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(CsvCodec.encode(&table).unwrap(), "");
    }

    #[test]
    fn test_short_row_keeps_columns_on_export() {
        let table = CsvCodec.decode("Handle,Title,Tags,Vendor\nmug-01,Mug\n").unwrap();
        assert_eq!(
            CsvCodec.encode(&table).unwrap(),
            "Handle,Title,Tags,Vendor\nmug-01,Mug,,\n"
        );
    }

    #[test]
    fn test_tagged_short_row_keeps_column_order() {
        let table = CsvCodec
            .decode("Handle,Title,Body,Tags,Vendor\nmug-01,Mug\nmug-02,Mug 2,<p>x</p>,,Acme\n")
            .unwrap();
        let mut assignment = TagAssignment::new();
        assignment.insert("mug-01", "cus-sale");

        let outcome = apply_tags(table.rows, &assignment, RowGate::TitleOrTags);
        assert_eq!(outcome.updated_count, 1);
        let tagged = Table::new(table.columns, outcome.rows);

        assert_eq!(
            CsvCodec.encode(&tagged).unwrap(),
            "Handle,Title,Body,Tags,Vendor\nmug-01,Mug,,cus-sale,\nmug-02,Mug 2,<p>x</p>,,Acme\n"
        );
    }

    #[test]
    fn test_header_only_file_keeps_header() {
        let table = CsvCodec.decode("Handle,Title,Tags\n").unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(CsvCodec.encode(&table).unwrap(), "Handle,Title,Tags\n");
    }

    #[test]
    fn test_encode_appends_columns_rows_add() {
        let mut row: Row = [("Handle", "b")].into_iter().collect();
        row.set("Tags", "x, y");
        let table = Table::new(
            vec!["Handle".into(), "Title".into()],
            vec![[("Handle", "a"), ("Title", "A")].into_iter().collect(), row],
        );
        let text = CsvCodec.encode(&table).unwrap();
        assert_eq!(text, "Handle,Title,Tags\na,A,\nb,,\"x, y\"\n");
    }

    #[test]
    fn test_encode_empty_table_is_empty() {
        assert_eq!(CsvCodec.encode(&Table::default()).unwrap(), "");
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let text = "Handle,Title,Body (HTML),Tags,Variant Price\n\
                    mug-01,Mug,\"<p>Say \"\"hi\"\"</p>\",\"featured, sale\",12.00\n\
                    mug-01,,,,14.00\n";
        let table = CsvCodec.decode(text).unwrap();
        let encoded = CsvCodec.encode(&table).unwrap();
        assert_eq!(CsvCodec.decode(&encoded).unwrap(), table);
    }
}
