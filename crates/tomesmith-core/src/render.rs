//! SQL rendering
//!
//! Each tome becomes an `INSERT ... SELECT` that copies the template row and
//! substitutes a handful of literal columns.

use crate::schema::ColumnList;
use crate::spec::TomeSpec;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Columns the renderer may override
pub mod columns {
    pub const NAME: &str = "name";
    pub const ALLOWABLE_CLASS: &str = "AllowableClass";
    pub const ALLOWABLE_RACE: &str = "AllowableRace";
    pub const REQUIRED_LEVEL: &str = "RequiredLevel";
    pub const SPELL_ID_1: &str = "spellid_1";
    pub const SPELL_TRIGGER_1: &str = "spelltrigger_1";
    pub const SPELL_CHARGES_1: &str = "spellcharges_1";
    pub const SPELL_ID_2: &str = "spellid_2";
    pub const SPELL_TRIGGER_2: &str = "spelltrigger_2";
    pub const SPELL_CHARGES_2: &str = "spellcharges_2";
    pub const SCRIPT_NAME: &str = "ScriptName";
}

/// Fixed per-run rendering policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Target table
    pub table: String,

    /// Key column; receives each tome's entry
    pub key_column: String,

    /// Row that is cloned
    pub template_entry: u32,

    /// Harmless spell in slot 1 that makes the item usable
    pub dummy_spell_id: u32,

    /// Item script that performs the teaching
    pub script_name: String,

    /// `-1` means all classes
    pub allowable_class: i32,

    /// `None` keeps the template's value
    pub allowable_race: Option<i32>,

    /// Used when a tome carries no level of its own; `None` keeps the template's value
    pub required_level: Option<i32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table: "item_template".to_string(),
            key_column: "entry".to_string(),
            template_entry: 18600,
            dummy_spell_id: 483,
            script_name: "item_hardcore_ability".to_string(),
            allowable_class: -1,
            allowable_race: None,
            required_level: None,
        }
    }
}

impl RenderOptions {
    /// Literal substitutions for one tome, keyed by column name
    pub fn overrides(&self, spec: &TomeSpec) -> HashMap<&str, String> {
        let mut overrides: HashMap<&str, String> = HashMap::new();
        overrides.insert(self.key_column.as_str(), spec.entry.to_string());
        overrides.insert(columns::NAME, sql_quote(&spec.name));
        overrides.insert(columns::ALLOWABLE_CLASS, self.allowable_class.to_string());

        // Slot 1 is a no-op that lets the client use the item; slot 2 teaches.
        overrides.insert(columns::SPELL_ID_1, self.dummy_spell_id.to_string());
        overrides.insert(columns::SPELL_TRIGGER_1, "0".to_string());
        overrides.insert(columns::SPELL_CHARGES_1, "-1".to_string());
        overrides.insert(columns::SPELL_ID_2, spec.spell_id.to_string());
        overrides.insert(columns::SPELL_TRIGGER_2, "0".to_string());
        overrides.insert(columns::SPELL_CHARGES_2, "0".to_string());

        overrides.insert(columns::SCRIPT_NAME, sql_quote(&self.script_name));

        if let Some(race) = self.allowable_race {
            overrides.insert(columns::ALLOWABLE_RACE, race.to_string());
        }
        if let Some(level) = spec.required_level.or(self.required_level) {
            overrides.insert(columns::REQUIRED_LEVEL, level.to_string());
        }

        overrides
    }
}

/// MySQL string literal: backslash and single quote are escaped.
pub fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render one `INSERT ... SELECT` cloning the template row.
pub fn build_insert_sql(cols: &ColumnList, spec: &TomeSpec, options: &RenderOptions) -> String {
    let overrides = options.overrides(spec);

    let insert_cols = cols
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(", ");

    let select_list = cols
        .iter()
        .map(|c| match overrides.get(c) {
            Some(literal) => format!("{} AS `{}`", literal, c),
            None => format!("`{}`", c),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO `{table}` ({insert_cols})\nSELECT {select_list}\nFROM `{table}`\nWHERE `{key}` = {template};",
        table = options.table,
        key = options.key_column,
        template = options.template_entry,
    )
}

/// Render the bulk delete that makes a script re-runnable.
pub fn build_delete_sql(specs: &[TomeSpec], options: &RenderOptions) -> String {
    let entries = specs
        .iter()
        .map(|s| s.entry.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "DELETE FROM `{}` WHERE `{}` IN ({});",
        options.table, options.key_column, entries
    )
}

/// Render the complete script: header, bulk delete, then one insert per tome.
pub fn render_script(
    cols: &ColumnList,
    specs: &[TomeSpec],
    options: &RenderOptions,
    generated_at: DateTime<Utc>,
) -> String {
    warn_missing_overrides(cols, specs, options);

    let mut out = String::new();
    let unchanged =
        |v: Option<i32>| v.map_or_else(|| "(unchanged)".to_string(), |v| v.to_string());

    out.push_str(&format!(
        "-- Generated by tomesmith at {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%SZ")
    ));
    out.push_str(&format!("-- Template entry: {}\n", options.template_entry));
    out.push_str(&format!("-- ScriptName: {}\n", options.script_name));
    out.push_str(&format!("-- Dummy spell: {}\n", options.dummy_spell_id));
    out.push_str(&format!("-- AllowableClass: {}\n", options.allowable_class));
    out.push_str(&format!("-- AllowableRace: {}\n", unchanged(options.allowable_race)));
    out.push_str(&format!("-- RequiredLevel: {}\n", unchanged(options.required_level)));
    out.push('\n');

    out.push_str(&build_delete_sql(specs, options));
    out.push_str("\n\n");

    for spec in specs {
        out.push_str(&format!(
            "-- {}: {} (learns spell {})\n",
            spec.entry, spec.name, spec.spell_id
        ));
        out.push_str(&build_insert_sql(cols, spec, options));
        out.push_str("\n\n");
    }

    out
}

/// Overrides naming a column the table lacks are dropped from the output;
/// surface that once per script.
fn warn_missing_overrides(cols: &ColumnList, specs: &[TomeSpec], options: &RenderOptions) {
    let Some(first) = specs.first() else {
        return;
    };
    let mut missing: Vec<&str> = options
        .overrides(first)
        .into_keys()
        .filter(|c| !cols.contains(c))
        .collect();
    if specs.iter().any(|s| s.required_level.is_some())
        && !cols.contains(columns::REQUIRED_LEVEL)
    {
        missing.push(columns::REQUIRED_LEVEL);
    }
    missing.sort_unstable();
    missing.dedup();
    for column in missing {
        tracing::warn!(
            table = %cols.table(),
            column,
            "override column not in schema; left out of output"
        );
    }
}
