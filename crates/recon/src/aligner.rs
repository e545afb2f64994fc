use std::collections::{HashMap, HashSet};

use crate::error::CompareError;
use crate::model::{Record, RecordSet};

/// Two snapshots joined on one key column.
#[derive(Debug)]
pub struct Alignment<'a> {
    pub key: String,
    pub old: &'a RecordSet,
    pub new: &'a RecordSet,
    /// Records whose key appears in both snapshots, in old-snapshot order.
    pub pairs: Vec<AlignedPair<'a>>,
    pub old_duplicates: usize,
    pub new_duplicates: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AlignedPair<'a> {
    pub key: &'a str,
    pub old: &'a Record,
    pub new: &'a Record,
}

/// Keep the first record for each key value, in source order. Returns the
/// survivors and the number of records dropped.
pub fn dedupe_by_key<'a>(set: &'a RecordSet, key_idx: usize) -> (Vec<&'a Record>, usize) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(set.len());
    let mut kept = Vec::with_capacity(set.len());
    for record in set.records() {
        if seen.insert(record.get(key_idx)) {
            kept.push(record);
        }
    }
    let dropped = set.len() - kept.len();
    (kept, dropped)
}

/// Join `old` and `new` on `key`. Keys present on one side only are left out.
pub fn align<'a>(
    old: &'a RecordSet,
    new: &'a RecordSet,
    key: &str,
) -> Result<Alignment<'a>, CompareError> {
    let unknown = || CompareError::UnknownKey {
        key: key.to_string(),
        candidates: old.columns().to_vec(),
    };
    let old_key_idx = old.column_index(key).ok_or_else(unknown)?;
    let new_key_idx = new.column_index(key).ok_or_else(unknown)?;

    let (old_kept, old_duplicates) = dedupe_by_key(old, old_key_idx);
    let (new_kept, new_duplicates) = dedupe_by_key(new, new_key_idx);

    for (snapshot, dropped) in [(old.snapshot(), old_duplicates), (new.snapshot(), new_duplicates)] {
        if dropped > 0 {
            tracing::warn!(%snapshot, key, dropped, "duplicate key values, keeping first occurrence");
        }
    }

    let (old_unique, new_unique) = (old_kept.len(), new_kept.len());

    let new_index: HashMap<&'a str, &'a Record> =
        new_kept.into_iter().map(|r| (r.get(new_key_idx), r)).collect();

    let pairs: Vec<AlignedPair<'a>> = old_kept
        .into_iter()
        .filter_map(|old_rec| {
            let k = old_rec.get(old_key_idx);
            new_index.get(k).map(|new_rec| AlignedPair { key: k, old: old_rec, new: *new_rec })
        })
        .collect();

    tracing::debug!(
        key,
        old_unique,
        new_unique,
        common = pairs.len(),
        "aligned snapshots"
    );

    Ok(Alignment {
        key: key.to_string(),
        old,
        new,
        pairs,
        old_duplicates,
        new_duplicates,
    })
}
