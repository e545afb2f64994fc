// File I/O operations

pub mod csv;
pub mod error;
pub mod xlsx;

pub use error::IoError;

use std::path::Path;

use rosterdiff_recon::ResultTable;

/// Export formats for result tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Write `table` to `path` in the given format.
pub fn export_table(table: &ResultTable, path: &Path, format: ExportFormat) -> Result<(), IoError> {
    match format {
        ExportFormat::Csv => crate::csv::export(table, path),
        ExportFormat::Xlsx => crate::xlsx::export(table, path),
    }
}
