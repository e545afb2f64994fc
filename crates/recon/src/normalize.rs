use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::CompareError;
use crate::model::RecordSet;

/// Canonical form of a column header: NFKD, combining marks stripped,
/// trimmed, lower-cased. Idempotent.
///
/// `" Competência "` and `"COMPETENCIA"` both become `"competencia"`.
pub fn normalize_column_name(name: &str) -> String {
    let stripped: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.trim().to_lowercase()
}

/// Normalize every header of `set` in place.
pub fn normalize_headers(set: &mut RecordSet) -> Result<(), CompareError> {
    let snapshot = set.snapshot();
    let mut seen = HashSet::new();
    for col in set.columns_mut().iter_mut() {
        let normalized = normalize_column_name(col);
        if !seen.insert(normalized.clone()) {
            return Err(CompareError::DuplicateColumn { snapshot, column: normalized });
        }
        *col = normalized;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snapshot;

    #[test]
    fn strips_accents_case_and_whitespace() {
        assert_eq!(normalize_column_name("  Competência "), "competencia");
        assert_eq!(normalize_column_name("NOME"), "nome");
        assert_eq!(normalize_column_name("Descrição CBO"), "descricao cbo");
        assert_eq!(normalize_column_name("Ç"), "c");
    }

    #[test]
    fn normalized_name_is_fixed_point() {
        let once = normalize_column_name("Órgão Emissor");
        assert_eq!(normalize_column_name(&once), once);
    }

    #[test]
    fn headers_rewritten_in_place() {
        let mut set = RecordSet::new(
            Snapshot::Old,
            vec!["CNS".into(), " Nome".into()],
            vec![vec!["1".into(), "Ana".into()]],
        );
        normalize_headers(&mut set).unwrap();
        assert_eq!(set.columns(), &["cns", "nome"]);
    }

    #[test]
    fn colliding_headers_rejected() {
        let mut set = RecordSet::new(
            Snapshot::New,
            vec!["Nome".into(), "nome ".into()],
            vec![],
        );
        let err = normalize_headers(&mut set).unwrap_err();
        assert_eq!(
            err,
            CompareError::DuplicateColumn { snapshot: Snapshot::New, column: "nome".into() }
        );
    }
}
