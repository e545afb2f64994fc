use crate::aligner::Alignment;
use crate::model::{ChangeSet, DiffField, DiffRecord, FieldValue};

/// Compare every non-key field of every aligned pair.
///
/// A [`DiffRecord`] is emitted only when at least one trimmed value differs.
/// No case, punctuation or numeric normalization is applied here.
pub fn detect_changes(alignment: &Alignment<'_>) -> ChangeSet {
    // (name, old idx, new idx) for each non-key column, old snapshot order.
    let layout: Vec<(&str, usize, usize)> = alignment
        .old
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| **name != alignment.key)
        .filter_map(|(old_idx, name)| {
            alignment
                .new
                .column_index(name)
                .map(|new_idx| (name.as_str(), old_idx, new_idx))
        })
        .collect();

    let mut records = Vec::new();

    for pair in &alignment.pairs {
        let mut changed = false;
        let mut fields = Vec::with_capacity(layout.len());

        for &(column, old_idx, new_idx) in &layout {
            let old_value = pair.old.get(old_idx).trim();
            let new_value = pair.new.get(new_idx).trim();

            let value = if old_value != new_value {
                changed = true;
                FieldValue::Changed { old: old_value.to_string(), new: new_value.to_string() }
            } else {
                FieldValue::Unchanged { value: new_value.to_string() }
            };
            fields.push(DiffField { column: column.to_string(), value });
        }

        if changed {
            records.push(DiffRecord { key: pair.key.to_string(), fields });
        }
    }

    tracing::debug!(key = %alignment.key, changed = records.len(), "change detection done");

    ChangeSet {
        key: alignment.key.clone(),
        columns: layout.iter().map(|(name, _, _)| name.to_string()).collect(),
        records,
    }
}
