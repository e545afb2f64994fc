use thiserror::Error;

use crate::model::Snapshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty column name, bad width, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// The two snapshots do not expose the same columns. Both lists are sorted.
    #[error(
        "snapshots have different columns\n  old: {}\n  new: {}",
        old_columns.join(", "),
        new_columns.join(", ")
    )]
    SchemaMismatch {
        old_columns: Vec<String>,
        new_columns: Vec<String>,
    },
    /// Nothing left to compare once volatile columns are dropped.
    #[error("snapshots have no comparable columns")]
    EmptySchema,
    /// Two headers collapsed to the same name after normalization.
    #[error("{snapshot} snapshot: column '{column}' appears more than once after normalization")]
    DuplicateColumn { snapshot: Snapshot, column: String },
    /// Requested key is not a column common to both snapshots.
    #[error("unknown key '{key}' (available: {})", candidates.join(", "))]
    UnknownKey { key: String, candidates: Vec<String> },
}

impl CompareError {
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}
