// compare / keys subcommands

use std::path::{Path, PathBuf};

use rosterdiff_io::csv::read_snapshot;
use rosterdiff_io::{export_table, ExportFormat};
use rosterdiff_recon::{prepare, CompareConfig, Outcome, PreparedComparison, ResultTable, Snapshot};

use crate::exit_codes::{EXIT_CHANGES, EXIT_OUTPUT};
use crate::{CliError, OutputFormat};

/// Base file name of the changed-field table.
pub const CHANGED_FILE_STEM: &str = "dados_alterados";
/// Base file name of the identifier-swap table.
pub const SWAP_FILE_STEM: &str = "cns_alterado";

pub struct CompareArgs {
    pub config: CompareConfig,
    pub old: PathBuf,
    pub new: PathBuf,
    pub key: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub json: bool,
    pub strict_exit: bool,
    pub quiet: bool,
}

fn load_and_prepare(config: &CompareConfig, old: &Path, new: &Path) -> Result<PreparedComparison, CliError> {
    let delimiter = config.delimiter_byte().map_err(CliError::compare)?;
    let old = read_snapshot(old, Snapshot::Old, delimiter).map_err(CliError::io)?;
    let new = read_snapshot(new, Snapshot::New, delimiter).map_err(CliError::io)?;
    prepare(old, new, config).map_err(CliError::compare)
}

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let prepared = load_and_prepare(&args.config, &args.old, &args.new)?;
    let result = prepared.run(args.key.as_deref()).map_err(CliError::compare)?;

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir).map_err(|e| CliError {
            code: EXIT_OUTPUT,
            message: format!("cannot create {}: {e}", dir.display()),
            hint: None,
        })?;
        for format in args.format.formats() {
            write_table(&result.changed_table(), dir, CHANGED_FILE_STEM, *format, args.quiet)?;
            write_table(&result.swap_table(), dir, SWAP_FILE_STEM, *format, args.quiet)?;
        }
    }

    if args.json {
        let json_str = serde_json::to_string_pretty(&result).map_err(|e| CliError {
            code: EXIT_OUTPUT,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    if s.outcome == Outcome::Clean {
        eprintln!("Nenhuma alteração detectada ({} chaves em comum).", s.common_keys);
    } else {
        eprintln!(
            "{} registros com alterações ({} campos, chave {})",
            s.changed_records, s.changed_fields, result.meta.key
        );
        if result.swaps.checked {
            eprintln!(
                "{} profissionais com {} diferente",
                s.identifier_swaps,
                result.meta.identifier_column.to_uppercase()
            );
        }
    }

    if !args.quiet {
        for (label, stats) in [("antigo", &s.old), ("novo", &s.new)] {
            if stats.duplicates_dropped > 0 {
                eprintln!(
                    "  {label}: {} linhas com chave repetida ignoradas",
                    stats.duplicates_dropped
                );
            }
            if stats.identifier_fallbacks > 0 {
                eprintln!(
                    "  {label}: {} valores de {} mantidos como texto",
                    stats.identifier_fallbacks, result.meta.identifier_column
                );
            }
        }
    }

    if args.strict_exit && s.outcome == Outcome::ChangesFound {
        return Err(CliError {
            code: EXIT_CHANGES,
            message: String::new(),
            hint: None,
        });
    }
    Ok(())
}

/// Write `table` as `{stem}.{ext}` in `dir`. An empty table removes any file
/// left there by an earlier run instead.
fn write_table(
    table: &ResultTable,
    dir: &Path,
    stem: &str,
    format: ExportFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let path = dir.join(format!("{stem}.{}", format.extension()));
    if table.is_empty() {
        return match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed stale result file");
                if !quiet {
                    eprintln!("removed {}", path.display());
                }
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(stem, "table empty, nothing written");
                Ok(())
            }
            Err(e) => Err(CliError {
                code: EXIT_OUTPUT,
                message: format!("cannot remove {}: {e}", path.display()),
                hint: None,
            }),
        };
    }
    export_table(table, &path, format).map_err(CliError::io)?;
    if !quiet {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

pub fn cmd_keys(config: &CompareConfig, old: &Path, new: &Path, json: bool) -> Result<(), CliError> {
    let prepared = load_and_prepare(config, old, new)?;
    let candidates = prepared.key_candidates();

    if json {
        let json_str = serde_json::to_string_pretty(candidates).map_err(|e| CliError {
            code: EXIT_OUTPUT,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
        return Ok(());
    }

    for column in &candidates.columns {
        if *column == candidates.default_key {
            println!("{column} (default)");
        } else {
            println!("{column}");
        }
    }
    Ok(())
}
