use rosterdiff_recon::config::CompareConfig;
use rosterdiff_recon::engine::{compare, prepare};
use rosterdiff_recon::model::{FieldValue, Outcome, RecordSet, Snapshot};
use rosterdiff_recon::CompareError;

/// Build a snapshot from semicolon text; first line is the header.
fn snapshot(which: Snapshot, text: &str) -> RecordSet {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines
        .next()
        .map(|h| h.split(';').map(String::from).collect())
        .unwrap_or_default();
    let rows = lines.map(|l| l.split(';').map(String::from).collect()).collect();
    RecordSet::new(which, header, rows)
}

// -------------------------------------------------------------------------
// Changed-field table
// -------------------------------------------------------------------------

#[test]
fn cargo_change_keyed_by_cns() {
    let old = snapshot(Snapshot::Old, "cns;nome;cargo\n000000000000001;Ana;Enfermeira");
    let new = snapshot(Snapshot::New, "cns;nome;cargo\n000000000000001;Ana;Tecnica");

    let result = compare(old, new, &CompareConfig::default(), None).unwrap();

    assert_eq!(result.meta.key, "cns");
    assert_eq!(result.outcome(), Outcome::ChangesFound);
    assert_eq!(result.summary.changed_records, 1);
    assert_eq!(result.summary.changed_fields, 1);

    let table = result.changed_table();
    assert_eq!(table.index.as_deref(), Some("cns"));
    assert_eq!(table.columns, vec!["cns", "nome", "cargo"]);
    assert_eq!(table.rows, vec![vec!["000000000000001", "Ana", "Enfermeira ➜ Tecnica"]]);

    // Keyed by cns, the swap check never runs.
    assert!(!result.swaps.checked);
    assert!(result.swap_table().is_empty());
}

#[test]
fn realistic_export_with_accents_and_competencia() {
    let old = snapshot(
        Snapshot::Old,
        "\
Competência;CNS;Nome;CBO;Descrição CBO
202401;700123456789010;Ana Souza;223505;Enfermeiro
202401;7,0012345678902E+14;Bruno Lima;225125;Médico clínico
202401;700123456789030;Carla Dias;322205;Técnico de enfermagem",
    );
    let new = snapshot(
        Snapshot::New,
        "\
COMPETENCIA;cns;nome;cbo;descricao cbo
202402;700123456789010;Ana Souza;223505;Enfermeiro
202402;700123456789020;Bruno Lima;225142;Médico da estratégia de saúde da família
202402;700123456789040;Davi Rocha;515105;Agente comunitário de saúde",
    );

    let result = compare(old, new, &CompareConfig::default(), None).unwrap();

    assert_eq!(result.summary.common_keys, 2);
    assert_eq!(result.changed.records.len(), 1);
    let bruno = &result.changed.records[0];
    assert_eq!(bruno.key, "700123456789020");
    assert_eq!(
        bruno.field("cbo"),
        Some(&FieldValue::Changed { old: "225125".into(), new: "225142".into() })
    );
    assert_eq!(bruno.field("nome"), Some(&FieldValue::Unchanged { value: "Bruno Lima".into() }));
    assert_eq!(result.summary.old.identifier_fallbacks, 0);
}

#[test]
fn departures_and_arrivals_not_reported() {
    let old = snapshot(Snapshot::Old, "cns;nome\n1;Ana\n2;Bia");
    let new = snapshot(Snapshot::New, "cns;nome\n1;Ana\n3;Caio");
    let result = compare(old, new, &CompareConfig::default(), None).unwrap();
    assert_eq!(result.outcome(), Outcome::Clean);
    assert_eq!(result.summary.common_keys, 1);
}

#[test]
fn duplicate_keys_keep_first_and_are_counted() {
    let old = snapshot(Snapshot::Old, "cns;cargo\n1;A\n1;B");
    let new = snapshot(Snapshot::New, "cns;cargo\n1;A");
    let result = compare(old, new, &CompareConfig::default(), None).unwrap();
    assert_eq!(result.outcome(), Outcome::Clean);
    assert_eq!(result.summary.old.duplicates_dropped, 1);
    assert_eq!(result.summary.new.duplicates_dropped, 0);
}

// -------------------------------------------------------------------------
// Identifier swaps
// -------------------------------------------------------------------------

#[test]
fn swap_detected_when_keyed_by_name() {
    let old = snapshot(Snapshot::Old, "cns;nome\n1;Ana");
    let new = snapshot(Snapshot::New, "cns;nome\n2;Ana");

    let result = compare(old, new, &CompareConfig::default(), Some("nome")).unwrap();

    // The name-keyed diff sees a plain identifier change...
    assert_eq!(result.changed.records.len(), 1);
    assert_eq!(
        result.changed.records[0].field("cns").unwrap().to_string(),
        "000000000000001 ➜ 000000000000002"
    );

    // ...and the swap check reports it separately.
    assert!(result.swaps.checked);
    let table = result.swap_table();
    assert_eq!(table.columns, vec!["cns", "nome", "cns_antigo(s)", "cns_novo"]);
    assert_eq!(
        table.rows,
        vec![vec!["000000000000002", "Ana", "000000000000001", "000000000000002"]]
    );
}

#[test]
fn swap_sees_rows_hidden_by_key_dedup() {
    // Ana has two identifiers in the new snapshot. Keyed by name, the aligner
    // keeps only the first row and finds no change; the swap check still fires.
    let old = snapshot(Snapshot::Old, "cns;nome\n1;Ana");
    let new = snapshot(Snapshot::New, "cns;nome\n1;Ana\n2;Ana");

    let result = compare(old, new, &CompareConfig::default(), Some("nome")).unwrap();

    assert!(result.changed.records.is_empty());
    assert_eq!(result.summary.new.duplicates_dropped, 1);
    assert_eq!(result.swaps.records.len(), 2);
    assert_eq!(result.outcome(), Outcome::ChangesFound);
}

#[test]
fn key_given_with_different_casing_is_normalized() {
    let old = snapshot(Snapshot::Old, "cns;nome\n1;Ana");
    let new = snapshot(Snapshot::New, "cns;nome\n2;Ana");
    let result = compare(old, new, &CompareConfig::default(), Some(" Nome ")).unwrap();
    assert_eq!(result.meta.key, "nome");
    assert_eq!(result.swaps.records.len(), 1);
}

// -------------------------------------------------------------------------
// Schema gate + config
// -------------------------------------------------------------------------

#[test]
fn schema_mismatch_halts_comparison() {
    let old = snapshot(Snapshot::Old, "competencia;cns;nome;cargo\n1;1;Ana;A");
    let new = snapshot(Snapshot::New, "cns;nome;cbo\n1;Ana;B");

    let err = prepare(old, new, &CompareConfig::default()).unwrap_err();
    assert!(err.is_schema_mismatch());
    assert_eq!(
        err,
        CompareError::SchemaMismatch {
            old_columns: vec!["cargo".into(), "cns".into(), "nome".into()],
            new_columns: vec!["cbo".into(), "cns".into(), "nome".into()],
        }
    );
}

#[test]
fn custom_columns_from_config() {
    let config = CompareConfig::from_toml(
        r#"
identifier_column = "Cartão SUS"
name_column = "Profissional"
"#,
    )
    .unwrap();
    let old = snapshot(Snapshot::Old, "Cartão SUS;Profissional\n1;Ana");
    let new = snapshot(Snapshot::New, "cartao sus;profissional\n1,0;Ana\n3;Ana");

    let prepared = prepare(old, new, &config).unwrap();
    assert_eq!(prepared.key_candidates().default_key, "cartao sus");

    let result = prepared.run(Some("profissional")).unwrap();
    assert_eq!(result.swap_table().columns.last().map(String::as_str), Some("cartao sus_novo"));
    assert_eq!(result.swaps.records.len(), 2);
    assert_eq!(result.swaps.records[0].current, "000000000000001");
}
