//! Terminal table preview

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::model::Table;

/// Prints a table to a terminal, truncated to a row limit
pub struct TerminalOutput {
    limit: usize,
}

impl TerminalOutput {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn render(&self, table: &Table, path: &Path, writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            "{} ({} rows, {} columns)",
            path.display(),
            table.row_count(),
            table.column_count()
        )?;

        if table.is_empty() {
            writeln!(writer, "No data to display")?;
            return Ok(());
        }

        writeln!(writer, "{}", build_table(table, self.limit))?;

        if table.row_count() > self.limit {
            writeln!(writer, "... {} more rows", table.row_count() - self.limit)?;
        }
        Ok(())
    }
}

/// Build a formatted table from the first `limit` rows
fn build_table(table: &Table, limit: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.column_names().map(str::to_string));
    for row in table.rows.iter().take(limit) {
        builder.push_record(row.cells.iter().map(|c| c.display().into_owned()));
    }

    let mut display = builder.build();
    display.with(Style::rounded());
    display.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Column};

    #[test]
    fn test_render_truncates() {
        let mut table = Table::new(vec![Column::new("n", 0), Column::new("sq", 1)]);
        for i in 0..5i64 {
            table.add_row(vec![CellValue::Int(i), CellValue::Int(i * i)], i as usize + 2);
        }

        let mut out = Vec::new();
        TerminalOutput::new(2)
            .render(&table, Path::new("squares.csv"), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("squares.csv (5 rows, 2 columns)"));
        assert!(text.contains("sq"));
        assert!(text.contains("... 3 more rows"));
        assert!(!text.contains("16"));
    }

    #[test]
    fn test_render_empty() {
        let mut out = Vec::new();
        TerminalOutput::new(20)
            .render(&Table::default(), Path::new("blank.xlsx"), &mut out)
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No data to display"));
    }
}
