//! CSV writer

use anyhow::{Context, Result};

use crate::model::Table;

use super::TableWriter;

/// Writes a header record followed by one record per row; nulls are empty
pub struct CsvWriter;

impl TableWriter for CsvWriter {
    fn write(&self, table: &Table, out: &mut Vec<u8>) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);

        if table.column_count() > 0 {
            writer
                .write_record(table.column_names())
                .context("Failed to write CSV header")?;
        }

        for row in &table.rows {
            writer
                .write_record(row.cells.iter().map(|c| c.display().into_owned()))
                .with_context(|| format!("Failed to write CSV row {}", row.source_line))?;
        }

        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}
