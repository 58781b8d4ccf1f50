//! sheetview - Browser viewer and converter for spreadsheet data
//!
//! Loads an uploaded workbook into memory, renders it as an HTML table and
//! exports the loaded table as CSV, Excel or Parquet.

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod output;
pub mod parser;
pub mod server;

pub use config::Config;
pub use error::AppError;
pub use model::Table;
