//! One-shot disk fallback for payloads the in-memory reader rejects

use std::io::Write;

use anyhow::{Context, Result};

use crate::error::AppError;
use crate::model::Table;

use super::{detect_format, extension_of, Parser};

/// Read `bytes` with `parser`, retrying once from a temporary file.
///
/// The temporary file is named with the upload's extension so readers that
/// dispatch on the path see the same format hint the user's file had. It is
/// removed before this function returns, whatever the outcome.
pub fn read_with_fallback(
    parser: &dyn Parser,
    bytes: &[u8],
    file_name: &str,
) -> std::result::Result<Table, AppError> {
    let primary = match parser.parse_bytes(bytes) {
        Ok(table) => return Ok(table),
        Err(e) => e,
    };

    log::warn!(
        "In-memory read of {} failed, retrying from disk: {:#}",
        file_name,
        primary
    );

    read_via_temp_file(parser, bytes, file_name).map_err(|fallback| AppError::Decode {
        primary: format!("{:#}", primary),
        fallback: format!("{:#}", fallback),
    })
}

fn read_via_temp_file(parser: &dyn Parser, bytes: &[u8], file_name: &str) -> Result<Table> {
    let suffix = format!(".{}", temp_suffix(bytes, file_name));
    let mut file = tempfile::Builder::new()
        .prefix("sheetview-")
        .suffix(&suffix)
        .tempfile()
        .context("Failed to create temporary file")?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .context("Failed to write temporary file")?;

    parser.parse_path(file.path())
}

fn temp_suffix(bytes: &[u8], file_name: &str) -> String {
    extension_of(file_name)
        .or_else(|| detect_format(bytes).map(str::to_string))
        .unwrap_or_else(|| "xlsx".to_string())
}
