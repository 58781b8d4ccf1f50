//! Parquet parser

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType as ArrowType, Date32Type, Date64Type, Float16Type, Float32Type, Float64Type,
    Int16Type, Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Timelike};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;

use crate::model::{CellValue, Column, Table};

use super::Parser;

/// Days between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        read_parquet(Bytes::copy_from_slice(bytes))
    }

    fn parse_path(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;
        read_parquet(file)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

fn read_parquet<R: ChunkReader + 'static>(input: R) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)
        .context("Failed to create Parquet reader")?;

    let schema = builder.schema().clone();
    let reader = builder.build().context("Failed to build Parquet reader")?;

    let columns: Vec<Column> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| Column::new(field.name().clone(), i))
        .collect();

    let mut table = Table::new(columns);

    let mut line_num = 1usize;
    for batch_result in reader {
        let batch = batch_result.context("Failed to read Parquet batch")?;

        for row_idx in 0..batch.num_rows() {
            line_num += 1;
            let cells: Vec<CellValue> = batch
                .columns()
                .iter()
                .map(|col| extract_cell_value(col, row_idx))
                .collect();

            table.add_row(cells, line_num);
        }
    }

    table.infer_column_types();
    Ok(table)
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    match array.data_type() {
        ArrowType::Boolean => CellValue::Bool(array.as_boolean().value(row_idx)),
        ArrowType::Int8 => CellValue::Int(array.as_primitive::<Int8Type>().value(row_idx) as i64),
        ArrowType::Int16 => CellValue::Int(array.as_primitive::<Int16Type>().value(row_idx) as i64),
        ArrowType::Int32 => CellValue::Int(array.as_primitive::<Int32Type>().value(row_idx) as i64),
        ArrowType::Int64 => CellValue::Int(array.as_primitive::<Int64Type>().value(row_idx)),
        ArrowType::UInt8 => CellValue::Int(array.as_primitive::<UInt8Type>().value(row_idx) as i64),
        ArrowType::UInt16 => {
            CellValue::Int(array.as_primitive::<UInt16Type>().value(row_idx) as i64)
        }
        ArrowType::UInt32 => {
            CellValue::Int(array.as_primitive::<UInt32Type>().value(row_idx) as i64)
        }
        ArrowType::UInt64 => {
            CellValue::Int(array.as_primitive::<UInt64Type>().value(row_idx) as i64)
        }
        ArrowType::Float16 => {
            CellValue::Float(array.as_primitive::<Float16Type>().value(row_idx).to_f64())
        }
        ArrowType::Float32 => {
            CellValue::Float(array.as_primitive::<Float32Type>().value(row_idx) as f64)
        }
        ArrowType::Float64 => CellValue::Float(array.as_primitive::<Float64Type>().value(row_idx)),
        ArrowType::Utf8 => {
            CellValue::String(Cow::Owned(array.as_string::<i32>().value(row_idx).to_string()))
        }
        ArrowType::LargeUtf8 => {
            CellValue::String(Cow::Owned(array.as_string::<i64>().value(row_idx).to_string()))
        }
        ArrowType::Date32 => {
            let days = array.as_primitive::<Date32Type>().value(row_idx);
            NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Int(days as i64))
        }
        ArrowType::Date64 => {
            let millis = array.as_primitive::<Date64Type>().value(row_idx);
            match DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc()) {
                Some(dt) if dt.num_seconds_from_midnight() == 0 => CellValue::Date(dt.date()),
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::Int(millis),
            }
        }
        ArrowType::Timestamp(unit, _) => {
            let (raw, datetime) = match unit {
                TimeUnit::Second => {
                    let v = array.as_primitive::<TimestampSecondType>().value(row_idx);
                    (v, DateTime::from_timestamp(v, 0))
                }
                TimeUnit::Millisecond => {
                    let v = array.as_primitive::<TimestampMillisecondType>().value(row_idx);
                    (v, DateTime::from_timestamp_millis(v))
                }
                TimeUnit::Microsecond => {
                    let v = array.as_primitive::<TimestampMicrosecondType>().value(row_idx);
                    (v, DateTime::from_timestamp_micros(v))
                }
                TimeUnit::Nanosecond => {
                    let v = array.as_primitive::<TimestampNanosecondType>().value(row_idx);
                    let secs = v.div_euclid(1_000_000_000);
                    let nanos = v.rem_euclid(1_000_000_000) as u32;
                    (v, DateTime::from_timestamp(secs, nanos))
                }
            };
            datetime
                .map(|dt| CellValue::DateTime(dt.naive_utc()))
                .unwrap_or(CellValue::Int(raw))
        }
        _ => {
            // Fallback: convert to string
            let formatter = arrow::util::display::ArrayFormatter::try_new(
                array.as_ref(),
                &arrow::util::display::FormatOptions::default(),
            );
            match formatter {
                Ok(fmt) => CellValue::String(Cow::Owned(fmt.value(row_idx).to_string())),
                Err(_) => CellValue::Null,
            }
        }
    }
}
