//! Excel file parser (xlsx, xlsm, xls, xlsb, ods)

use std::borrow::Cow;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::Timelike;

use crate::model::{CellValue, Column, Table};

use super::Parser;

/// Parser for Excel workbooks. Only the first sheet is read.
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes)).context("Failed to open workbook")?;
        read_first_sheet(workbook)
    }

    fn parse_path(&self, path: &Path) -> Result<Table> {
        let workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
        read_first_sheet(workbook)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(
            ext.to_lowercase().as_str(),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods"
        )
    }
}

fn read_first_sheet<RS: Read + Seek>(mut workbook: Sheets<RS>) -> Result<Table> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("No sheets found in workbook")?;

    let range: Range<Data> = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    Ok(parse_range(&range))
}

fn parse_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();

    // First row is header; a blank sheet has none
    let Some(header_row) = rows.next() else {
        return Table::default();
    };

    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell);
            Column::new(if name.is_empty() { format!("Column{}", i + 1) } else { name }, i)
        })
        .collect();
    let col_count = columns.len();

    let mut table = Table::new(columns);

    for (line_num, row) in rows.enumerate() {
        let cells: Vec<CellValue> = row.iter().take(col_count).map(convert_cell).collect();
        table.add_row(cells, line_num + 2); // +2 for 1-indexing and header
    }

    table.infer_column_types();
    table
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => convert_cell(cell).display().into_owned(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::Float(f) => {
            // Check if it's actually an integer
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return CellValue::Float(dt.as_f64());
            }
            match dt.as_datetime() {
                Some(datetime) if datetime.num_seconds_from_midnight() == 0 => {
                    CellValue::Date(datetime.date())
                }
                Some(datetime) => CellValue::DateTime(datetime),
                None => CellValue::Float(dt.as_f64()),
            }
        }
        Data::DateTimeIso(s) => {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                CellValue::DateTime(dt)
            } else if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                CellValue::Date(d)
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}
