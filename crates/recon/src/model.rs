use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which export a record set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Snapshot {
    Old,
    New,
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// One row of a snapshot. Values are positional, aligned with the owning
/// [`RecordSet`]'s column list. Every value is text; absent cells are `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> &str {
        self.values.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<String> {
        &mut self.values
    }
}

/// All records of one snapshot, sharing one column list.
#[derive(Debug, Clone)]
pub struct RecordSet {
    snapshot: Snapshot,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Build a record set from a header and rows. Rows are resized to the
    /// header width; missing trailing cells become empty strings.
    pub fn new(snapshot: Snapshot, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let records = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                Record::new(row)
            })
            .collect();
        Self { snapshot, columns, records }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of `column` in `record`, or `None` if the column does not exist.
    pub fn value<'a>(&self, record: &'a Record, column: &str) -> Option<&'a str> {
        self.column_index(column).map(|idx| record.get(idx))
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<String> {
        &mut self.columns
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    pub(crate) fn remove_column(&mut self, idx: usize) {
        self.columns.remove(idx);
        for record in &mut self.records {
            if idx < record.values.len() {
                record.values.remove(idx);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Change detection
// ---------------------------------------------------------------------------

/// Separator used when rendering a changed field.
pub const CHANGE_ARROW: &str = " ➜ ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldValue {
    Unchanged { value: String },
    Changed { old: String, new: String },
}

impl FieldValue {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchanged { value } => write!(f, "{value}"),
            Self::Changed { old, new } => write!(f, "{old}{CHANGE_ARROW}{new}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffField {
    pub column: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

/// A key present in both snapshots whose non-key fields differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    pub key: String,
    pub fields: Vec<DiffField>,
}

impl DiffRecord {
    pub fn field(&self, column: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.column == column).map(|f| &f.value)
    }

    pub fn changed_columns(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.value.is_changed())
            .map(|f| f.column.as_str())
    }
}

/// A new-snapshot row whose name maps to a different identifier set than
/// it did in the old snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierSwapRecord {
    pub name: String,
    /// Full new-snapshot row, aligned with [`SwapSet::columns`].
    pub values: Vec<String>,
    /// Every old identifier seen for the name, sorted.
    pub previous: Vec<String>,
    pub current: String,
}

impl IdentifierSwapRecord {
    pub fn previous_joined(&self) -> String {
        self.previous.join(", ")
    }
}

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// Presentation-neutral table handed to exporters. When `index` is set it
/// names the first column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub index: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeSet {
    pub key: String,
    /// Non-key columns in the old snapshot's order.
    pub columns: Vec<String>,
    pub records: Vec<DiffRecord>,
}

impl ChangeSet {
    pub fn to_table(&self) -> ResultTable {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(self.key.clone());
        columns.extend(self.columns.iter().cloned());

        let rows = self
            .records
            .iter()
            .map(|r| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(r.key.clone());
                row.extend(r.fields.iter().map(|f| f.value.to_string()));
                row
            })
            .collect();

        ResultTable { index: Some(self.key.clone()), columns, rows }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapSet {
    /// Whether the check applied to this run (key was the name column and
    /// both snapshots carried the identifier).
    pub checked: bool,
    pub identifier_column: String,
    /// New snapshot columns.
    pub columns: Vec<String>,
    pub records: Vec<IdentifierSwapRecord>,
}

impl SwapSet {
    pub fn previous_column(&self) -> String {
        format!("{}_antigo(s)", self.identifier_column)
    }

    pub fn current_column(&self) -> String {
        format!("{}_novo", self.identifier_column)
    }

    pub fn to_table(&self) -> ResultTable {
        let mut columns = self.columns.clone();
        columns.push(self.previous_column());
        columns.push(self.current_column());

        let rows = self
            .records
            .iter()
            .map(|r| {
                let mut row = r.values.clone();
                row.push(r.previous_joined());
                row.push(r.current.clone());
                row
            })
            .collect();

        ResultTable { index: None, columns, rows }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The comparison ran and found nothing to report.
    Clean,
    ChangesFound,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotStats {
    pub rows: usize,
    pub duplicates_dropped: usize,
    pub identifier_fallbacks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub outcome: Outcome,
    pub common_keys: usize,
    pub changed_records: usize,
    pub changed_fields: usize,
    pub identifier_swaps: usize,
    pub old: SnapshotStats,
    pub new: SnapshotStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonMeta {
    pub key: String,
    pub identifier_column: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub meta: ComparisonMeta,
    pub summary: ComparisonSummary,
    pub changed: ChangeSet,
    pub swaps: SwapSet,
}

impl ComparisonResult {
    pub fn outcome(&self) -> Outcome {
        self.summary.outcome
    }

    pub fn changed_table(&self) -> ResultTable {
        self.changed.to_table()
    }

    pub fn swap_table(&self) -> ResultTable {
        self.swaps.to_table()
    }
}
