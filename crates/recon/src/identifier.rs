use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::RecordSet;

/// Width of a CNS number.
pub const DEFAULT_IDENTIFIER_WIDTH: usize = 15;

/// Outcome of repairing one identifier value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Canonicalized {
    /// Digits, zero-padded to the configured width.
    Canonical(String),
    /// Value could not be read as a number; trimmed original kept.
    Fallback(String),
}

impl Canonicalized {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Canonical(v) | Self::Fallback(v) => v,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Canonical(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Repair an identifier mangled by spreadsheet round-tripping.
///
/// Handles plain digits (`"700123456789010"`), comma decimals
/// (`"700123456789010,0"`), exponent forms (`"7,0012345678901E+14"`) and
/// stray spaces. Anything else, including negative numbers and plain decimals
/// with a fractional part, falls back to the trimmed input.
pub fn canonicalize_identifier(raw: &str, width: usize) -> Canonicalized {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    let fallback = || Canonicalized::Fallback(raw.trim().to_string());

    if cleaned.is_empty() {
        return fallback();
    }

    if cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Canonicalized::Canonical(zero_pad(cleaned, width));
    }

    let has_exponent = cleaned.contains(|c: char| c == 'e' || c == 'E');
    if !has_exponent && !cleaned.contains('.') {
        return fallback();
    }

    let parsed = if has_exponent {
        Decimal::from_scientific(cleaned)
    } else {
        Decimal::from_str(cleaned)
    };

    match parsed {
        Ok(value) => {
            if value.is_sign_negative() && !value.is_zero() {
                return fallback();
            }
            // A plain decimal must be integral; only exponent forms lost digits to rounding.
            if !has_exponent && !value.fract().is_zero() {
                return fallback();
            }
            let integral = value.round().normalize();
            let digits = integral.abs().to_string();
            if digits.bytes().all(|b| b.is_ascii_digit()) {
                Canonicalized::Canonical(zero_pad(&digits, width))
            } else {
                fallback()
            }
        }
        Err(_) => fallback(),
    }
}

fn zero_pad(digits: &str, width: usize) -> String {
    format!("{digits:0>width$}")
}

/// Counts from canonicalizing one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalizationReport {
    pub canonical: usize,
    pub fallback: usize,
}

/// Rewrite `column` of `set` with canonical identifiers. No-op when the
/// column is absent.
pub fn canonicalize_column(set: &mut RecordSet, column: &str, width: usize) -> CanonicalizationReport {
    let mut report = CanonicalizationReport::default();
    let Some(idx) = set.column_index(column) else {
        return report;
    };
    let snapshot = set.snapshot();

    for record in set.records_mut().iter_mut() {
        let values = record.values_mut();
        let outcome = canonicalize_identifier(&values[idx], width);
        if outcome.is_fallback() {
            report.fallback += 1;
            tracing::debug!(%snapshot, value = outcome.as_str(), "identifier kept as-is");
        } else {
            report.canonical += 1;
        }
        values[idx] = outcome.into_string();
    }

    if report.fallback > 0 {
        tracing::warn!(
            %snapshot,
            column,
            fallbacks = report.fallback,
            "some identifiers could not be read as numbers"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snapshot;

    fn canon(raw: &str) -> Canonicalized {
        canonicalize_identifier(raw, DEFAULT_IDENTIFIER_WIDTH)
    }

    #[test]
    fn plain_digits_are_padded() {
        assert_eq!(canon("1"), Canonicalized::Canonical("000000000000001".into()));
        assert_eq!(canon(" 700123456789010 "), Canonicalized::Canonical("700123456789010".into()));
    }

    #[test]
    fn scientific_notation_recovered() {
        let expected = Canonicalized::Canonical("700123456789010".into());
        assert_eq!(canon("7,0012345678901E+14"), expected);
        assert_eq!(canon("7.0012345678901e14"), expected);
        assert_eq!(canon("700123456789010,0"), expected);
        assert_eq!(canon("700 123 456 789 010"), expected);
    }

    #[test]
    fn short_exponent_is_padded() {
        assert_eq!(canon("1.5e3"), Canonicalized::Canonical("000000000001500".into()));
    }

    #[test]
    fn garbage_falls_back_trimmed() {
        assert_eq!(canon("  abc  "), Canonicalized::Fallback("abc".into()));
        assert_eq!(canon("12-34"), Canonicalized::Fallback("12-34".into()));
        assert_eq!(canon("e"), Canonicalized::Fallback("e".into()));
        assert_eq!(canon("-5"), Canonicalized::Fallback("-5".into()));
        assert_eq!(canon(""), Canonicalized::Fallback("".into()));
    }

    #[test]
    fn fractional_decimals_fall_back() {
        assert_eq!(canon("1.4"), Canonicalized::Fallback("1.4".into()));
        assert_eq!(canon("700123456789010,5"), Canonicalized::Fallback("700123456789010,5".into()));
        assert_eq!(canon("1,000"), Canonicalized::Canonical("000000000000001".into()));
        assert_ne!(canon("1.4"), canon("1"));
    }

    #[test]
    fn negative_values_fall_back_before_rounding() {
        assert_eq!(canon("-0.4"), Canonicalized::Fallback("-0.4".into()));
        assert_eq!(canon("-4e-1"), Canonicalized::Fallback("-4e-1".into()));
        assert_eq!(canon("-5,0"), Canonicalized::Fallback("-5,0".into()));
    }

    #[test]
    fn long_values_not_truncated() {
        assert_eq!(
            canon("12345678901234567"),
            Canonicalized::Canonical("12345678901234567".into())
        );
    }

    #[test]
    fn column_rewritten_and_counted() {
        let mut set = RecordSet::new(
            Snapshot::Old,
            vec!["cns".into(), "nome".into()],
            vec![
                vec!["1".into(), "Ana".into()],
                vec!["n/a".into(), "Bia".into()],
            ],
        );
        let report = canonicalize_column(&mut set, "cns", 15);
        assert_eq!(report, CanonicalizationReport { canonical: 1, fallback: 1 });
        assert_eq!(set.records()[0].get(0), "000000000000001");
        assert_eq!(set.records()[1].get(0), "n/a");
        assert_eq!(set.records()[1].get(1), "Bia");
    }

    #[test]
    fn missing_column_is_noop() {
        let mut set = RecordSet::new(Snapshot::New, vec!["nome".into()], vec![vec!["Ana".into()]]);
        assert_eq!(canonicalize_column(&mut set, "cns", 15), CanonicalizationReport::default());
    }
}
