use std::collections::{BTreeSet, HashMap};

use crate::model::{IdentifierSwapRecord, Record, RecordSet, SwapSet};

/// Identifiers and rows carrying one name.
#[derive(Default)]
struct NameGroup<'a> {
    identifiers: BTreeSet<&'a str>,
    records: Vec<&'a Record>,
}

/// Names mapped to their group, with names in first-appearance order.
struct NameGroups<'a> {
    order: Vec<&'a str>,
    groups: HashMap<&'a str, NameGroup<'a>>,
}

fn group_by_name<'a>(set: &'a RecordSet, name_idx: usize, id_idx: usize) -> NameGroups<'a> {
    let mut order = Vec::new();
    let mut groups: HashMap<&str, NameGroup<'a>> = HashMap::new();
    for record in set.records() {
        let name = record.get(name_idx);
        let group = groups.entry(name).or_insert_with(|| {
            order.push(name);
            NameGroup::default()
        });
        group.identifiers.insert(record.get(id_idx));
        group.records.push(record);
    }
    NameGroups { order, groups }
}

/// Flag names whose identifier set differs between snapshots.
///
/// Only runs when `key` is the name column and both snapshots carry the
/// identifier column. Works on the full record sets, not the key-deduplicated
/// view, so one name mapping to several identifiers is visible here.
pub fn detect_identifier_swaps(
    old: &RecordSet,
    new: &RecordSet,
    key: &str,
    name_column: &str,
    identifier_column: &str,
) -> SwapSet {
    let mut swaps = SwapSet {
        checked: false,
        identifier_column: identifier_column.to_string(),
        columns: new.columns().to_vec(),
        records: Vec::new(),
    };

    if key != name_column {
        return swaps;
    }
    let (Some(old_name), Some(old_id), Some(new_name), Some(new_id)) = (
        old.column_index(name_column),
        old.column_index(identifier_column),
        new.column_index(name_column),
        new.column_index(identifier_column),
    ) else {
        tracing::debug!(identifier_column, "identifier column missing, swap check skipped");
        return swaps;
    };
    swaps.checked = true;

    let old_groups = group_by_name(old, old_name, old_id);
    let new_groups = group_by_name(new, new_name, new_id);

    for name in &old_groups.order {
        let Some(new_group) = new_groups.groups.get(name) else {
            continue;
        };
        let old_ids = &old_groups.groups[name].identifiers;
        if *old_ids == new_group.identifiers {
            continue;
        }

        let previous: Vec<String> = old_ids.iter().map(|id| id.to_string()).collect();
        for record in &new_group.records {
            swaps.records.push(IdentifierSwapRecord {
                name: name.to_string(),
                values: record.values().to_vec(),
                previous: previous.clone(),
                current: record.get(new_id).to_string(),
            });
        }
    }

    if !swaps.records.is_empty() {
        tracing::info!(rows = swaps.records.len(), "identifier changes detected for unchanged names");
    }
    swaps
}
