use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::CompareError;
use crate::model::RecordSet;

/// Remove every column whose name contains `marker`. Returns the removed names.
pub fn drop_volatile_columns(set: &mut RecordSet, marker: &str) -> Vec<String> {
    let mut dropped = Vec::new();
    while let Some(idx) = set.columns().iter().position(|c| c.contains(marker)) {
        dropped.push(set.columns()[idx].clone());
        set.remove_column(idx);
    }
    if !dropped.is_empty() {
        tracing::debug!(snapshot = %set.snapshot(), ?dropped, "dropped volatile columns");
    }
    dropped
}

/// Columns the operator may join on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCandidates {
    /// Sorted alphabetically.
    pub columns: Vec<String>,
    pub default_key: String,
}

impl KeyCandidates {
    pub fn contains(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c == key)
    }
}

/// Require both snapshots to expose the same column set (order-independent).
pub fn reconcile(
    old: &RecordSet,
    new: &RecordSet,
    identifier_column: &str,
) -> Result<KeyCandidates, CompareError> {
    let old_cols: BTreeSet<&str> = old.columns().iter().map(String::as_str).collect();
    let new_cols: BTreeSet<&str> = new.columns().iter().map(String::as_str).collect();

    if old_cols != new_cols {
        return Err(CompareError::SchemaMismatch {
            old_columns: old_cols.iter().map(|c| c.to_string()).collect(),
            new_columns: new_cols.iter().map(|c| c.to_string()).collect(),
        });
    }

    let columns: Vec<String> = old_cols.iter().map(|c| c.to_string()).collect();
    let default_key = if old_cols.contains(identifier_column) {
        identifier_column.to_string()
    } else {
        columns.first().cloned().ok_or(CompareError::EmptySchema)?
    };

    Ok(KeyCandidates { columns, default_key })
}
