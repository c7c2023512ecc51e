//! Tabular view of a record set and its `.xlsx` serialization

use crate::error::{ReportError, ReportResult};
use crate::record::RecordSet;
use mongodb::bson::Bson;
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::{Cursor, Read};

/// Worksheet every report is written to
pub const SHEET_NAME: &str = "Sheet1";

/// MIME type of the serialized workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Convert a BSON value into the cell that represents it
    pub fn from_bson(value: &Bson) -> Self {
        match value {
            Bson::Null | Bson::Undefined => Cell::Empty,
            Bson::String(s) => Cell::Text(s.clone()),
            Bson::Boolean(b) => Cell::Bool(*b),
            // xlsx has no NaN or infinity number values
            Bson::Double(n) if n.is_nan() => Cell::Empty,
            Bson::Double(n) if n.is_infinite() => {
                Cell::Text(if *n > 0.0 { "inf" } else { "-inf" }.to_string())
            }
            Bson::Double(n) => Cell::Number(*n),
            Bson::Int32(n) => Cell::Number(f64::from(*n)),
            Bson::Int64(n) => Cell::Number(*n as f64),
            Bson::Decimal128(d) => {
                let text = d.to_string();
                match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => Cell::Number(n),
                    _ => Cell::Text(text),
                }
            }
            Bson::ObjectId(oid) => Cell::Text(oid.to_hex()),
            Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
                Ok(s) => Cell::Text(s),
                Err(_) => Cell::Text(value.clone().into_relaxed_extjson().to_string()),
            },
            other => Cell::Text(other.clone().into_relaxed_extjson().to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Header plus rows, one row per record
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Flatten a record set into a table.
    ///
    /// Columns are the union of all field names in first-seen order. A record that lacks a
    /// column gets an empty cell there. Fails with [`ReportError::EmptyInput`] on an empty set.
    pub fn from_records(records: &RecordSet) -> ReportResult<Self> {
        if records.is_empty() {
            return Err(ReportError::EmptyInput);
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key) {
                    columns.push(key.to_string());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map_or(Cell::Empty, Cell::from_bson))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Serialize into an in-memory workbook with a bold header row and no index column
    pub fn to_xlsx(&self) -> ReportResult<SpreadsheetBuffer> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, name) in self.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, column_index(col)?, name, &header_format)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            // Row 0 is the header
            let row_num = u32::try_from(index + 1).map_err(|_| {
                ReportError::SpreadsheetFailed(format!("row {} exceeds sheet limits", index + 1))
            })?;

            for (col, cell) in row.iter().enumerate() {
                let col_num = column_index(col)?;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row_num, col_num, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                }
            }
        }

        let bytes = workbook.save_to_buffer()?;
        Ok(SpreadsheetBuffer::new(bytes))
    }
}

fn column_index(col: usize) -> ReportResult<u16> {
    u16::try_from(col)
        .map_err(|_| ReportError::SpreadsheetFailed(format!("column {} exceeds sheet limits", col)))
}

/// In-memory serialized workbook, handed from the builder to the uploader
#[derive(Debug, Clone)]
pub struct SpreadsheetBuffer {
    cursor: Cursor<Vec<u8>>,
}

impl SpreadsheetBuffer {
    /// Wrap serialized bytes; the read position starts at the beginning
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }

    /// Rewind, then read the whole buffer
    pub fn read_all(&mut self) -> ReportResult<Vec<u8>> {
        self.rewind();
        let mut contents = Vec::with_capacity(self.len());
        self.cursor.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Hex SHA-256 of the full contents, independent of the read position
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.cursor.get_ref());
        hex::encode(hasher.finalize())
    }
}

impl Read for SpreadsheetBuffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    fn books() -> RecordSet {
        RecordSet::from(vec![
            doc! { "department": "Books", "title": "A" },
            doc! { "department": "Books", "title": "B" },
        ])
    }

    #[test]
    fn test_table_columns_and_rows() {
        let table = Table::from_records(&books()).unwrap();
        assert_eq!(table.columns(), &["department", "title"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1][1], Cell::Text("B".to_string()));
    }

    #[test]
    fn test_table_union_of_fields() {
        let records = RecordSet::from(vec![
            doc! { "title": "A", "price": 12 },
            doc! { "title": "B", "author": "X" },
            doc! { "isbn": "123", "price": 7.5 },
        ]);
        let table = Table::from_records(&records).unwrap();

        assert_eq!(table.columns(), &["title", "price", "author", "isbn"]);
        assert_eq!(table.row_count(), 3);

        // Missing fields become empty cells
        assert!(table.rows()[0][2].is_empty());
        assert!(table.rows()[2][0].is_empty());
        assert_eq!(table.rows()[2][1], Cell::Number(7.5));
    }

    #[test]
    fn test_table_empty_input() {
        let result = Table::from_records(&RecordSet::default());
        assert!(matches!(result, Err(ReportError::EmptyInput)));
    }

    #[test]
    fn test_cell_from_bson() {
        assert_eq!(Cell::from_bson(&Bson::Null), Cell::Empty);
        assert_eq!(Cell::from_bson(&Bson::Int32(3)), Cell::Number(3.0));
        assert_eq!(Cell::from_bson(&Bson::Int64(4)), Cell::Number(4.0));
        assert_eq!(Cell::from_bson(&Bson::Boolean(true)), Cell::Bool(true));

        let oid = ObjectId::new();
        assert_eq!(Cell::from_bson(&Bson::ObjectId(oid)), Cell::Text(oid.to_hex()));

        match Cell::from_bson(&Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)])) {
            Cell::Text(s) => assert_eq!(s, "[1,2]"),
            other => panic!("Expected text cell, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_from_non_finite_double() {
        assert_eq!(Cell::from_bson(&Bson::Double(f64::NAN)), Cell::Empty);
        assert_eq!(
            Cell::from_bson(&Bson::Double(f64::INFINITY)),
            Cell::Text("inf".to_string())
        );
        assert_eq!(
            Cell::from_bson(&Bson::Double(f64::NEG_INFINITY)),
            Cell::Text("-inf".to_string())
        );
        assert_eq!(Cell::from_bson(&Bson::Double(2.5)), Cell::Number(2.5));
    }

    #[test]
    fn test_to_xlsx_produces_zip() {
        let table = Table::from_records(&books()).unwrap();
        let mut buffer = table.to_xlsx().unwrap();

        assert!(!buffer.is_empty());
        assert_eq!(buffer.position(), 0);

        let bytes = buffer.read_all().unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_read_all_rewinds() {
        let mut buffer = SpreadsheetBuffer::new(b"abcdef".to_vec());
        let mut head = [0u8; 3];
        buffer.read_exact(&mut head).unwrap();
        assert_eq!(buffer.position(), 3);

        assert_eq!(buffer.read_all().unwrap(), b"abcdef");
    }

    #[test]
    fn test_sha256_hex() {
        let buffer = SpreadsheetBuffer::new(b"test data".to_vec());
        assert_eq!(
            buffer.sha256_hex(),
            "916f0027a575074ce72a331777c3478d6513f786a591bd892da1a577bf2335f9"
        );
    }
}
