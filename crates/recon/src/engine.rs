use crate::aligner::align;
use crate::changes::detect_changes;
use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::identifier::{canonicalize_column, CanonicalizationReport};
use crate::model::{
    ComparisonMeta, ComparisonResult, ComparisonSummary, Outcome, RecordSet, SnapshotStats,
};
use crate::normalize::{normalize_column_name, normalize_headers};
use crate::schema::{drop_volatile_columns, reconcile, KeyCandidates};
use crate::swap::detect_identifier_swaps;

/// Two snapshots that passed header normalization, volatile-column removal,
/// identifier repair and the schema gate. Ready to be compared on any key
/// in [`PreparedComparison::key_candidates`].
#[derive(Debug)]
pub struct PreparedComparison {
    config: CompareConfig,
    old: RecordSet,
    new: RecordSet,
    candidates: KeyCandidates,
    old_report: CanonicalizationReport,
    new_report: CanonicalizationReport,
}

/// Normalize both snapshots and check their schemas match.
pub fn prepare(
    mut old: RecordSet,
    mut new: RecordSet,
    config: &CompareConfig,
) -> Result<PreparedComparison, CompareError> {
    normalize_headers(&mut old)?;
    normalize_headers(&mut new)?;

    drop_volatile_columns(&mut old, &config.volatile_marker);
    drop_volatile_columns(&mut new, &config.volatile_marker);

    let old_report = canonicalize_column(&mut old, &config.identifier_column, config.identifier_width);
    let new_report = canonicalize_column(&mut new, &config.identifier_column, config.identifier_width);

    let candidates = reconcile(&old, &new, &config.identifier_column)?;

    tracing::debug!(
        old_rows = old.len(),
        new_rows = new.len(),
        columns = candidates.columns.len(),
        default_key = %candidates.default_key,
        "snapshots prepared"
    );

    Ok(PreparedComparison {
        config: config.clone(),
        old,
        new,
        candidates,
        old_report,
        new_report,
    })
}

impl PreparedComparison {
    pub fn key_candidates(&self) -> &KeyCandidates {
        &self.candidates
    }

    pub fn old_snapshot(&self) -> &RecordSet {
        &self.old
    }

    pub fn new_snapshot(&self) -> &RecordSet {
        &self.new
    }

    /// Compare on `key`, or on the default key when `None`.
    pub fn run(&self, key: Option<&str>) -> Result<ComparisonResult, CompareError> {
        let key = match key {
            Some(k) => {
                let k = normalize_column_name(k);
                if !self.candidates.contains(&k) {
                    return Err(CompareError::UnknownKey {
                        key: k,
                        candidates: self.candidates.columns.clone(),
                    });
                }
                k
            }
            None => self.candidates.default_key.clone(),
        };

        let alignment = align(&self.old, &self.new, &key)?;
        let changed = detect_changes(&alignment);
        let swaps = detect_identifier_swaps(
            &self.old,
            &self.new,
            &key,
            &self.config.name_column,
            &self.config.identifier_column,
        );

        let changed_fields: usize = changed
            .records
            .iter()
            .map(|r| r.changed_columns().count())
            .sum();
        let outcome = if changed.records.is_empty() && swaps.records.is_empty() {
            Outcome::Clean
        } else {
            Outcome::ChangesFound
        };

        let summary = ComparisonSummary {
            outcome,
            common_keys: alignment.pairs.len(),
            changed_records: changed.records.len(),
            changed_fields,
            identifier_swaps: swaps.records.len(),
            old: SnapshotStats {
                rows: self.old.len(),
                duplicates_dropped: alignment.old_duplicates,
                identifier_fallbacks: self.old_report.fallback,
            },
            new: SnapshotStats {
                rows: self.new.len(),
                duplicates_dropped: alignment.new_duplicates,
                identifier_fallbacks: self.new_report.fallback,
            },
        };

        tracing::info!(
            key = %key,
            changed = summary.changed_records,
            swaps = summary.identifier_swaps,
            "comparison finished"
        );

        Ok(ComparisonResult {
            meta: ComparisonMeta {
                key,
                identifier_column: self.config.identifier_column.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            changed,
            swaps,
        })
    }
}

/// Prepare and run in one step.
pub fn compare(
    old: RecordSet,
    new: RecordSet,
    config: &CompareConfig,
    key: Option<&str>,
) -> Result<ComparisonResult, CompareError> {
    prepare(old, new, config)?.run(key)
}
