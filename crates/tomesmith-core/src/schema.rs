//! Column extraction from a `CREATE TABLE` block
//!
//! Only column identifiers are needed, so this scans lines with a couple of
//! regexes instead of parsing SQL.

use crate::error::SchemaError;
use crate::text::split_lines;
use regex::Regex;
use std::path::Path;

/// Ordered, non-empty list of column names for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnList {
    table: String,
    columns: Vec<String>,
}

impl ColumnList {
    /// Table the columns belong to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column names in declaration order
    pub fn as_slice(&self) -> &[String] {
        &self.columns
    }

    /// Column names as `&str`, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false; an empty extraction is an error
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether the table declares `name` (case-sensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Searching,
    InTable,
    Done,
}

/// Extracts the column list of a single named table
pub struct ColumnExtractor {
    table: String,
    create_table_re: Regex,
    column_re: Regex,
}

impl ColumnExtractor {
    /// Build the table-start and column regexes once for reuse.
    pub fn new(table: impl Into<String>) -> Result<Self, SchemaError> {
        let table = table.into();
        let create_table_re = Regex::new(&format!(
            r"^\s*CREATE TABLE\s+`{}`\s*\(\s*$",
            regex::escape(&table)
        ))?;
        let column_re = Regex::new(r"^\s*`(?P<name>[^`]+)`\s+")?;
        Ok(Self {
            table,
            create_table_re,
            column_re,
        })
    }

    /// Extract columns from schema text.
    pub fn extract(&self, schema_sql: &str) -> Result<ColumnList, SchemaError> {
        let mut state = ScanState::Searching;
        let mut columns = Vec::new();

        for line in split_lines(schema_sql) {
            match state {
                ScanState::Searching => {
                    if self.create_table_re.is_match(line) {
                        state = ScanState::InTable;
                    }
                }
                ScanState::InTable => {
                    if is_block_end(line) {
                        state = ScanState::Done;
                    } else if let Some(name) =
                        self.column_re.captures(line).and_then(|c| c.name("name"))
                    {
                        columns.push(name.as_str().to_string());
                    }
                }
                ScanState::Done => break,
            }
        }

        if columns.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: self.table.clone(),
            });
        }

        tracing::debug!(table = %self.table, columns = columns.len(), "extracted table columns");

        Ok(ColumnList {
            table: self.table.clone(),
            columns,
        })
    }

    /// Read a schema file (invalid UTF-8 is replaced) and extract columns.
    pub fn extract_file(&self, path: &Path) -> Result<ColumnList, crate::TomeError> {
        let bytes = std::fs::read(path).map_err(|e| {
            crate::error::ConfigError::IoError(format!("{}: {}", path.display(), e))
        })?;
        Ok(self.extract(&String::from_utf8_lossy(&bytes))?)
    }
}

/// Keys, constraints and the closing paren end the column section.
fn is_block_end(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("PRIMARY KEY") || trimmed.starts_with("KEY ") || trimmed.starts_with(')')
}
