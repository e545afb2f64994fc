//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success (changes may exist unless `--strict-exit`)   |
//! | 1    | Changes found and `--strict-exit` was given          |
//! | 2    | Usage error (bad args, missing file, unknown key)    |
//! | 3    | Snapshots have different columns                     |
//! | 4    | Input file could not be parsed into a table          |
//! | 5    | Result file could not be written                     |
//! | 6    | Invalid configuration file                           |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Changes found. Like `diff(1)`, exit 1 means "files differ."
/// Only returned with `--strict-exit`.
pub const EXIT_CHANGES: u8 = 1;

/// Usage error - bad arguments, missing input file, key not in both snapshots.
pub const EXIT_USAGE: u8 = 2;

/// Column sets differ after dropping volatile columns. Comparison did not run.
pub const EXIT_SCHEMA_MISMATCH: u8 = 3;

/// Malformed input (wrong delimiter, ragged rows, duplicate headers).
pub const EXIT_INPUT_PARSE: u8 = 4;

/// Cannot write CSV/XLSX/JSON output.
pub const EXIT_OUTPUT: u8 = 5;

/// Config file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 6;
