//! `rosterdiff-recon` - snapshot reconciliation engine for professional rosters.
//!
//! Pure engine crate: receives two parsed snapshots, returns the changed-field
//! and identifier-swap tables. No CLI or IO dependencies.

pub mod aligner;
pub mod changes;
pub mod config;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod swap;

pub use config::CompareConfig;
pub use engine::{compare, prepare, PreparedComparison};
pub use error::CompareError;
pub use identifier::{canonicalize_identifier, Canonicalized};
pub use model::{ComparisonResult, Outcome, RecordSet, ResultTable, Snapshot};
pub use normalize::normalize_column_name;
