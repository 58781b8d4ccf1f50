//! The loaded-table slot shared by the upload and export handlers

use std::sync::Arc;

use crate::error::AppError;
use crate::model::Table;

/// Most recently uploaded table and the name of the file it came from.
///
/// Empty until the first successful upload; every later upload replaces
/// both fields together.
#[derive(Debug, Default, Clone)]
pub struct Session {
    table: Option<Arc<Table>>,
    source_name: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded table
    pub fn replace(&mut self, table: Table, source_name: impl Into<String>) {
        self.table = Some(Arc::new(table));
        self.source_name = Some(source_name.into());
    }

    /// The loaded table and its source name, or an error when nothing is loaded
    pub fn current(&self) -> Result<(Arc<Table>, Option<String>), AppError> {
        let table = self.table.clone().ok_or(AppError::NoTableLoaded)?;
        Ok((table, self.source_name.clone()))
    }
}
