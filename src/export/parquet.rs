//! Parquet writer

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::model::{CellType, CellValue, Table};

use super::TableWriter;

/// Days between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Writes the table as a single Parquet row group, one typed column per
/// table column
pub struct ParquetWriter;

impl TableWriter for ParquetWriter {
    fn write(&self, table: &Table, out: &mut Vec<u8>) -> Result<()> {
        let fields: Vec<Field> = table
            .columns
            .iter()
            .map(|col| Field::new(col.name.clone(), arrow_type(col.inferred_type), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let arrays: Vec<ArrayRef> = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| build_array(table, idx, col.inferred_type))
            .collect();

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(&mut *out, schema.clone(), Some(props))
            .context("Failed to create Parquet writer")?;

        if !table.is_empty() {
            let batch = RecordBatch::try_new(schema, arrays)
                .context("Failed to assemble Parquet record batch")?;
            writer.write(&batch).context("Failed to write Parquet batch")?;
        }

        writer.close().context("Failed to finish Parquet file")?;
        Ok(())
    }
}

fn arrow_type(cell_type: CellType) -> DataType {
    match cell_type {
        CellType::Bool => DataType::Boolean,
        CellType::Int => DataType::Int64,
        CellType::Float => DataType::Float64,
        CellType::Date => DataType::Date32,
        CellType::DateTime => DataType::Timestamp(TimeUnit::Microsecond, None),
        CellType::Null | CellType::String | CellType::Mixed => DataType::Utf8,
    }
}

fn build_array(table: &Table, col_idx: usize, cell_type: CellType) -> ArrayRef {
    let values = table.column_values(col_idx);

    match cell_type {
        CellType::Bool => Arc::new(
            values
                .map(|v| match v {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        CellType::Int => Arc::new(
            values
                .map(|v| match v {
                    CellValue::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        CellType::Float => Arc::new(
            values
                .map(|v| match v {
                    CellValue::Int(i) => Some(*i as f64),
                    CellValue::Float(f) => Some(*f),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        CellType::Date => Arc::new(
            values
                .map(|v| match v {
                    CellValue::Date(d) => Some(days_since_epoch(d)),
                    _ => None,
                })
                .collect::<Date32Array>(),
        ),
        CellType::DateTime => Arc::new(
            values
                .map(|v| match v {
                    CellValue::Date(d) => d
                        .and_hms_opt(0, 0, 0)
                        .map(|dt| dt.and_utc().timestamp_micros()),
                    CellValue::DateTime(dt) => Some(dt.and_utc().timestamp_micros()),
                    _ => None,
                })
                .collect::<TimestampMicrosecondArray>(),
        ),
        CellType::Null | CellType::String | CellType::Mixed => Arc::new(
            values
                .map(|v| (!v.is_null()).then(|| v.display().into_owned()))
                .collect::<StringArray>(),
        ),
    }
}

fn days_since_epoch(date: &NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::parser::{ParquetParser, Parser};

    #[test]
    fn test_typed_columns_read_back() {
        let day = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let mut table = Table::new(vec![
            Column::new("id", 0),
            Column::new("score", 1),
            Column::new("label", 2),
            Column::new("seen", 3),
        ]);
        table.add_row(
            vec![CellValue::Int(1), CellValue::Float(9.5), "a".into(), CellValue::Date(day)],
            2,
        );
        table.add_row(vec![CellValue::Int(2), CellValue::Int(7), CellValue::Int(3)], 3);
        table.infer_column_types();

        let mut out = Vec::new();
        ParquetWriter.write(&table, &mut out).unwrap();
        assert_eq!(&out[0..4], b"PAR1");

        let back = ParquetParser.parse_bytes(&out).unwrap();
        assert_eq!(back.row_count(), 2);
        assert_eq!(back.columns[0].inferred_type, CellType::Int);
        assert_eq!(back.rows[1].cells[1], CellValue::Float(7.0));
        // Mixed column is stored as text
        assert_eq!(back.rows[1].cells[2], CellValue::from("3"));
        assert_eq!(back.rows[0].cells[3], CellValue::Date(day));
        assert!(back.rows[1].cells[3].is_null());
    }

    #[test]
    fn test_header_only_table() {
        let table = Table::new(vec![Column::new("a", 0), Column::new("b", 1)]);
        let mut out = Vec::new();
        ParquetWriter.write(&table, &mut out).unwrap();

        let back = ParquetParser.parse_bytes(&out).unwrap();
        assert_eq!(back.column_count(), 2);
        assert!(back.is_empty());
    }
}
