use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::identifier::DEFAULT_IDENTIFIER_WIDTH;
use crate::normalize::normalize_column_name;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column conventions of the roster export. Every field has a default that
/// matches the CNES professional extract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Registry number column, canonicalized and preferred as default key.
    pub identifier_column: String,
    /// Person name column; enables the identifier-swap check when used as key.
    pub name_column: String,
    /// Columns whose name contains this text are dropped before comparing.
    pub volatile_marker: String,
    pub identifier_width: usize,
    /// Input field delimiter.
    pub delimiter: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            identifier_column: "cns".into(),
            name_column: "nome".into(),
            volatile_marker: "competencia".into(),
            identifier_width: DEFAULT_IDENTIFIER_WIDTH,
            delimiter: ";".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, CompareError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| CompareError::ConfigParse(e.to_string()))?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, CompareError> {
        toml::to_string_pretty(self).map_err(|e| CompareError::ConfigParse(e.to_string()))
    }

    /// Column names run through the same normalizer as snapshot headers.
    pub fn normalized(mut self) -> Self {
        self.identifier_column = normalize_column_name(&self.identifier_column);
        self.name_column = normalize_column_name(&self.name_column);
        self.volatile_marker = normalize_column_name(&self.volatile_marker);
        self
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        if self.identifier_column.is_empty() {
            return Err(CompareError::ConfigValidation(
                "identifier_column must not be empty".into(),
            ));
        }
        if self.name_column.is_empty() {
            return Err(CompareError::ConfigValidation("name_column must not be empty".into()));
        }
        if self.volatile_marker.is_empty() {
            // An empty marker would match, and drop, every column.
            return Err(CompareError::ConfigValidation(
                "volatile_marker must not be empty".into(),
            ));
        }
        if !(1..=64).contains(&self.identifier_width) {
            return Err(CompareError::ConfigValidation(format!(
                "identifier_width must be between 1 and 64, got {}",
                self.identifier_width
            )));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, CompareError> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(*b),
            _ => Err(CompareError::ConfigValidation(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}
