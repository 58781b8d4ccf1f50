//! Writers that serialize a Table into downloadable files

mod csv;
mod parquet;
mod xlsx;

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use crate::error::AppError;
use crate::model::Table;

pub use self::csv::CsvWriter;
pub use self::parquet::ParquetWriter;
pub use self::xlsx::XlsxWriter;

/// Target format for an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
    Columnar,
}

impl ExportFormat {
    /// Every export format, in the order the page shows them
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::Csv,
        ExportFormat::Spreadsheet,
        ExportFormat::Columnar,
    ];

    /// Tag the browser sends for this format
    pub fn tag(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "excel",
            ExportFormat::Columnar => "parquet",
        }
    }

    /// File extension of the exported file
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Columnar => "parquet",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Columnar => "application/octet-stream",
        }
    }

    /// Human label used on the page buttons
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Spreadsheet => "Excel",
            ExportFormat::Columnar => "Parquet",
        }
    }

    fn writer(self) -> Box<dyn TableWriter> {
        match self {
            ExportFormat::Csv => Box::new(CsvWriter),
            ExportFormat::Spreadsheet => Box::new(XlsxWriter),
            ExportFormat::Columnar => Box::new(ParquetWriter),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Spreadsheet),
            "parquet" => Ok(ExportFormat::Columnar),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Trait for table serializers
pub trait TableWriter {
    /// Serialize the table into `out`
    fn write(&self, table: &Table, out: &mut Vec<u8>) -> Result<()>;
}

/// A finished export, ready to be sent or saved
#[derive(Debug)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize `table` in `format`, naming the file after `source_name`
pub fn export_table(
    table: &Table,
    format: ExportFormat,
    source_name: Option<&str>,
    default_base: &str,
) -> Result<ExportedFile> {
    let mut bytes = Vec::new();
    format.writer().write(table, &mut bytes)?;

    Ok(ExportedFile {
        file_name: export_file_name(source_name, format, default_base),
        content_type: format.content_type(),
        bytes,
    })
}

/// `<stem>_exported.<ext>`, where stem is the source file name without its
/// extension, or `default_base` when no source name is known.
pub fn export_file_name(source_name: Option<&str>, format: ExportFormat, default_base: &str) -> String {
    let stem = source_name
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(default_base);

    format!("{}_exported.{}", stem, format.extension())
}
