//! Error types
//!
//! Every failure here is fatal for a run. Rows dropped by the input filters
//! are not errors and never show up in this module.

/// Schema extraction errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to parse `{table}` columns from schema (table not found or no column lines)")]
    MissingColumns { table: String },

    #[error("invalid table name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Input line errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("line {line}: invalid integer for {field}: {value:?}")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unrecognized input line: {raw:?}")]
    UnsupportedShape { line: usize, raw: String },

    #[error("line {line}: auto-assigned entry id overflowed")]
    EntryOverflow { line: usize },
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Any error a generation run can raise
#[derive(Debug, thiserror::Error)]
pub enum TomeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
