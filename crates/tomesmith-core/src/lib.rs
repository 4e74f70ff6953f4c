//! Tomesmith Core
//!
//! Turns a list of spells into SQL that clones a template item row once per
//! spell: extract the table's columns, parse the spell list, render
//! `INSERT ... SELECT` statements.

pub mod config;
pub mod error;
pub mod render;
pub mod schema;
pub mod spec;
pub mod text;

pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, InputError, SchemaError, TomeError};
pub use render::{build_delete_sql, build_insert_sql, render_script, sql_quote, RenderOptions};
pub use schema::{ColumnExtractor, ColumnList};
pub use spec::{
    parse_input_lines, parse_input_text, ParseOutcome, ParserOptions, SkipTally, SpecParser,
    TomeSpec,
};
pub use text::split_lines;
