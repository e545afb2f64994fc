// rosterdiff - compare two snapshots of a professional roster export

mod compare;
mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rosterdiff_recon::{CompareConfig, CompareError};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_CONFIG, EXIT_INPUT_PARSE, EXIT_SCHEMA_MISMATCH, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rosterdiff")]
#[command(about = "Compare two snapshots of a healthcare-professional roster")]
#[command(version)]
struct Cli {
    /// TOML file with column conventions (identifier, name, volatile marker)
    #[arg(long, global = true, env = "ROSTERDIFF_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report changed fields and identifier swaps between two snapshots
    #[command(after_help = "\
Without --key the identifier column (cns) is used when present.
Keying by the name column (nome) also reports names whose CNS set changed.

Examples:
  rosterdiff compare antigo.csv novo.csv
  rosterdiff compare antigo.csv novo.csv --key nome
  rosterdiff compare antigo.csv novo.csv --out-dir resultados --format both
  rosterdiff compare antigo.csv novo.csv --json > resultado.json")]
    Compare {
        /// Old snapshot (CSV)
        old: PathBuf,

        /// New snapshot (CSV)
        new: PathBuf,

        /// Column to join the snapshots on (see `rosterdiff keys`)
        #[arg(long)]
        key: Option<String>,

        /// Input field delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<char>,

        /// Directory to write result tables into
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Format of files written to --out-dir
        #[arg(long, default_value = "both")]
        format: OutputFormat,

        /// Print the full result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Exit 1 when any change is found
        #[arg(long)]
        strict_exit: bool,

        /// Quiet mode - only the summary line and errors
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// List the columns usable as comparison key
    #[command(after_help = "\
Examples:
  rosterdiff keys antigo.csv novo.csv
  rosterdiff keys antigo.csv novo.csv --json")]
    Keys {
        /// Old snapshot (CSV)
        old: PathBuf,

        /// New snapshot (CSV)
        new: PathBuf,

        /// Input field delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<char>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Xlsx,
    Both,
}

impl OutputFormat {
    pub fn formats(&self) -> &'static [rosterdiff_io::ExportFormat] {
        use rosterdiff_io::ExportFormat;
        match self {
            Self::Csv => &[ExportFormat::Csv],
            Self::Xlsx => &[ExportFormat::Xlsx],
            Self::Both => &[ExportFormat::Csv, ExportFormat::Xlsx],
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Compare { quiet: true, .. });
    init_logging(cli.verbose, quiet);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Compare {
            old,
            new,
            key,
            delimiter,
            out_dir,
            format,
            json,
            strict_exit,
            quiet,
        } => compare::cmd_compare(compare::CompareArgs {
            config: with_delimiter(config, delimiter)?,
            old,
            new,
            key,
            out_dir,
            format,
            json,
            strict_exit,
            quiet,
        }),
        Commands::Keys { old, new, delimiter, json } => {
            compare::cmd_keys(&with_delimiter(config, delimiter)?, &old, &new, json)
        }
        Commands::Config => cmd_config(&config),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CompareConfig, CliError> {
    let Some(path) = path else {
        return Ok(CompareConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    let config = CompareConfig::from_toml(&text).map_err(CliError::compare)?;
    tracing::debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}

fn with_delimiter(mut config: CompareConfig, delimiter: Option<char>) -> Result<CompareConfig, CliError> {
    if let Some(d) = delimiter {
        config.delimiter = d.to_string();
        config
            .validate()
            .map_err(|e| CliError::args(e.to_string()).with_hint("use a single ASCII character, e.g. --delimiter ';'"))?;
    }
    Ok(config)
}

fn cmd_config(config: &CompareConfig) -> Result<(), CliError> {
    let text = config.to_toml().map_err(CliError::compare)?;
    print!("{text}");
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Map an engine error to its exit code.
    pub fn compare(err: CompareError) -> Self {
        let (code, hint) = match &err {
            CompareError::SchemaMismatch { .. } => (
                EXIT_SCHEMA_MISMATCH,
                Some("re-export both snapshots with the same columns".to_string()),
            ),
            CompareError::EmptySchema | CompareError::DuplicateColumn { .. } => {
                (EXIT_INPUT_PARSE, Some("check the delimiter and header row".to_string()))
            }
            CompareError::UnknownKey { .. } => (
                EXIT_USAGE,
                Some("list valid keys with: rosterdiff keys OLD NEW".to_string()),
            ),
            CompareError::ConfigParse(_) | CompareError::ConfigValidation(_) => (EXIT_CONFIG, None),
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn io(err: rosterdiff_io::IoError) -> Self {
        use rosterdiff_io::IoError;
        let code = match &err {
            IoError::Read { .. } => EXIT_USAGE,
            IoError::Malformed { .. } => EXIT_INPUT_PARSE,
            IoError::Write { .. } | IoError::Xlsx(_) => exit_codes::EXIT_OUTPUT,
        };
        let hint = match &err {
            IoError::Malformed { .. } => {
                Some("inputs must be semicolon-delimited UTF-8 CSV with a header row".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn schema_mismatch_maps_to_its_exit_code() {
        let err = CliError::compare(CompareError::SchemaMismatch {
            old_columns: vec!["a".into()],
            new_columns: vec!["b".into()],
        });
        assert_eq!(err.code, EXIT_SCHEMA_MISMATCH);
        assert!(err.message.contains("old: a"));
        assert!(err.message.contains("new: b"));
    }

    #[test]
    fn bad_delimiter_is_usage_error() {
        let err = with_delimiter(CompareConfig::default(), Some('ç')).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }
}
