//! Configuration schema (tomesmith.toml)

use crate::error::ConfigError;
use crate::render::RenderOptions;
use crate::spec::{ParserOptions, DEFAULT_PLACEHOLDER_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "tomesmith.toml";

/// Main configuration structure
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema file holding the table definition
    pub schema_path: PathBuf,

    /// Output script path; `-` writes to stdout
    pub output_path: PathBuf,

    /// Input file; stdin when unset
    pub input_path: Option<PathBuf>,

    /// Target table
    pub table: String,

    /// Key column of the target table
    pub key_column: String,

    /// Entry of the row to clone
    pub template_entry: u32,

    /// First auto-assigned entry
    pub start_entry: u32,

    /// Client-recognized dummy spell used to allow item use
    pub dummy_spell_id: u32,

    /// Item ScriptName that handles teaching
    pub script_name: String,

    /// AllowableClass override (-1 = all classes)
    pub allowable_class: i32,

    /// AllowableRace override
    pub allowable_race: Option<i32>,

    /// RequiredLevel override
    pub required_level: Option<i32>,

    /// Rows whose name starts with this (any case) are dropped
    pub placeholder_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        let render = RenderOptions::default();
        let parser = ParserOptions::default();
        Self {
            schema_path: PathBuf::from("sql/base/mangos.sql"),
            output_path: PathBuf::from("sql/updates/mangos/z2831_01_mangos_mage_tomes.sql"),
            input_path: None,
            table: render.table,
            key_column: render.key_column,
            template_entry: render.template_entry,
            start_entry: parser.start_entry,
            dummy_spell_id: render.dummy_spell_id,
            script_name: render.script_name,
            allowable_class: render.allowable_class,
            allowable_race: render.allowable_race,
            required_level: render.required_level,
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// True when output goes to stdout instead of a file
    pub fn writes_to_stdout(&self) -> bool {
        self.output_path.as_os_str() == "-"
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            start_entry: self.start_entry,
            placeholder_prefix: self.placeholder_prefix.clone(),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            table: self.table.clone(),
            key_column: self.key_column.clone(),
            template_entry: self.template_entry,
            dummy_spell_id: self.dummy_spell_id,
            script_name: self.script_name.clone(),
            allowable_class: self.allowable_class,
            allowable_race: self.allowable_race,
            required_level: self.required_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.template_entry, 18600);
        assert_eq!(config.start_entry, 91000);
        assert_eq!(config.dummy_spell_id, 483);
        assert_eq!(config.script_name, "item_hardcore_ability");
        assert_eq!(config.allowable_class, -1);
        assert_eq!(config.allowable_race, None);
        assert_eq!(config.required_level, None);
        assert!(!config.writes_to_stdout());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            output_path = "-"
            start_entry = 95000
            allowable_race = 1101
            "#,
        )
        .unwrap();

        assert!(config.writes_to_stdout());
        assert_eq!(config.start_entry, 95000);
        assert_eq!(config.allowable_race, Some(1101));
        assert_eq!(config.template_entry, 18600);
        assert_eq!(config.table, "item_template");
    }

    #[test]
    fn options_carry_config_values() {
        let config =
            Config::from_toml("required_level = 20\nplaceholder_prefix = \"old \"").unwrap();
        assert_eq!(config.render_options().required_level, Some(20));
        assert_eq!(config.parser_options().placeholder_prefix, "old ");
        assert_eq!(
            config.render_options(),
            RenderOptions {
                required_level: Some(20),
                ..RenderOptions::default()
            }
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("start_entry = \"ninety\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
