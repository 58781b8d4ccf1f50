//! Excel writer

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::model::{CellValue, Table};

use super::TableWriter;

/// Writes the table to a single worksheet with a bold header row
pub struct XlsxWriter;

struct Formats {
    header: Format,
    date: Format,
    datetime: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

impl TableWriter for XlsxWriter {
    fn write(&self, table: &Table, out: &mut Vec<u8>) -> Result<()> {
        let formats = Formats::new();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col_idx, column) in table.columns.iter().enumerate() {
            let col = column_number(col_idx)?;
            sheet
                .write_string_with_format(0, col, &column.name, &formats.header)
                .with_context(|| format!("Failed to write header {}", column.name))?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let sheet_row = u32::try_from(row_idx + 1).context("Too many rows for a worksheet")?;
            for (col_idx, cell) in row.cells.iter().enumerate() {
                write_cell(sheet, sheet_row, column_number(col_idx)?, cell, &formats)
                    .with_context(|| format!("Failed to write row {}", row.source_line))?;
            }
        }

        let buffer = workbook
            .save_to_buffer()
            .context("Failed to build workbook")?;
        out.extend_from_slice(&buffer);
        Ok(())
    }
}

fn column_number(col_idx: usize) -> Result<u16> {
    u16::try_from(col_idx).context("Too many columns for a worksheet")
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    formats: &Formats,
) -> Result<()> {
    match cell {
        CellValue::Null => {}
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Int(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            sheet.write_number(row, col, *f)?;
        }
        CellValue::String(s) => {
            sheet.write_string(row, col, s.as_ref())?;
        }
        CellValue::Date(d) => {
            sheet.write_datetime_with_format(row, col, d, &formats.date)?;
        }
        CellValue::DateTime(dt) => {
            sheet.write_datetime_with_format(row, col, dt, &formats.datetime)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::Column;
    use crate::parser::{ExcelParser, Parser};

    #[test]
    fn test_workbook_reads_back() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut table = Table::new(vec![
            Column::new("name", 0),
            Column::new("qty", 1),
            Column::new("shipped", 2),
            Column::new("paid", 3),
        ]);
        table.add_row(
            vec!["bolt".into(), CellValue::Int(12), CellValue::Date(day), CellValue::Bool(true)],
            2,
        );
        table.add_row(vec!["nut".into(), CellValue::Float(0.5)], 3);

        let mut out = Vec::new();
        XlsxWriter.write(&table, &mut out).unwrap();
        let back = ExcelParser.parse_bytes(&out).unwrap();

        assert_eq!(back.column_names().collect::<Vec<_>>(), ["name", "qty", "shipped", "paid"]);
        assert_eq!(back.row_count(), 2);
        assert_eq!(back.rows[0].cells[1], CellValue::Int(12));
        assert_eq!(back.rows[0].cells[2], CellValue::Date(day));
        assert_eq!(back.rows[0].cells[3], CellValue::Bool(true));
        assert!(back.rows[1].cells[2].is_null());
    }
}
