//! Parser layer for reading uploaded tabular data

mod csv;
mod excel;
mod fallback;
mod parquet;

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::fallback::read_with_fallback;
pub use self::parquet::ParquetParser;

/// Trait for parsing tabular data
pub trait Parser: Send + Sync {
    /// Parse an in-memory payload and return a Table
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Table>;

    /// Parse a file on disk and return a Table
    fn parse_path(&self, path: &Path) -> Result<Table> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        self.parse_bytes(&bytes)
    }

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Picks a parser from a file name, defaulting to the spreadsheet reader
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
    spreadsheet: ExcelParser,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ParquetParser)],
            spreadsheet: ExcelParser,
        }
    }

    /// Get the parser for a file name.
    ///
    /// CSV and Parquet files get their own readers so exported files can be
    /// loaded back; every other name goes to the spreadsheet reader, which
    /// sniffs the workbook flavour from the content.
    pub fn for_file_name(&self, file_name: &str) -> &dyn Parser {
        let ext = extension_of(file_name).unwrap_or_default();

        self.parsers
            .iter()
            .find(|parser| parser.supports_extension(&ext))
            .map(|parser| parser.as_ref())
            .unwrap_or(&self.spreadsheet)
    }

    /// Parse a file using the appropriate parser
    pub fn parse_path(&self, path: &Path) -> Result<Table> {
        let name = path.to_string_lossy();
        self.for_file_name(&name).parse_path(path)
    }
}

/// Lowercased extension of a file name, if it has one
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Detect file format from content
pub fn detect_format(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }

    match &bytes[0..4] {
        b"PAR1" => Some("parquet"),
        b"PK\x03\x04" => Some("xlsx"),
        b"\xD0\xCF\x11\xE0" => Some("xls"),
        _ => None,
    }
}
