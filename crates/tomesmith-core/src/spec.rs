//! Tome spec records and the line parser
//!
//! Input is one record per line, tab-separated:
//!
//! ```text
//! spell_id
//! spell_id<TAB>name
//! spell_id<TAB>name<TAB>required_level
//! entry<TAB>spell_id<TAB>name<TAB>required_level
//! ```
//!
//! Blank lines and `#` comments are ignored.

use crate::error::InputError;
use crate::text::split_lines;
use std::collections::HashSet;

/// Default name prefix of obsolete placeholder rows
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "tome of zz";

/// One generated item row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TomeSpec {
    /// Item entry id
    pub entry: u32,

    /// Spell taught by the item
    pub spell_id: u32,

    /// Item display name
    pub name: String,

    /// Per-row level gate, wins over the global override
    pub required_level: Option<i32>,
}

/// Counts of rows dropped by the input filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipTally {
    /// Names starting with the placeholder prefix
    pub placeholder_name: usize,

    /// Explicit required level of zero or below
    pub zero_level: usize,

    /// Name already taken by an earlier row
    pub duplicate_name: usize,

    /// Spell already taught by an earlier row
    pub duplicate_spell_id: usize,
}

impl SkipTally {
    /// Rows dropped for any reason
    pub fn total(&self) -> usize {
        self.placeholder_name + self.zero_level + self.duplicate_name + self.duplicate_spell_id
    }

    /// Human-readable summary lines; empty when nothing was skipped.
    pub fn messages(&self, placeholder_prefix: &str) -> Vec<String> {
        let mut lines = Vec::new();
        if self.placeholder_name > 0 || self.duplicate_name > 0 || self.duplicate_spell_id > 0 {
            lines.push(format!(
                "Filtered input: skipped {} '{}*' rows, skipped {} duplicate name rows, \
                 skipped {} duplicate spell_id rows.",
                self.placeholder_name,
                placeholder_prefix,
                self.duplicate_name,
                self.duplicate_spell_id
            ));
        }
        if self.zero_level > 0 {
            lines.push(format!(
                "Filtered input: skipped {} rows with required_level=0.",
                self.zero_level
            ));
        }
        lines
    }
}

/// Accepted records plus what was filtered out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Accepted records in input order
    pub specs: Vec<TomeSpec>,

    /// Dropped rows by reason
    pub skipped: SkipTally,
}

/// A line decoded by its field count
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineShape {
    SpellOnly {
        spell_id: u32,
    },
    SpellName {
        spell_id: u32,
        name: String,
    },
    SpellNameLevel {
        spell_id: u32,
        name: String,
        required_level: Option<i32>,
    },
    Explicit {
        entry: u32,
        spell_id: u32,
        name: String,
        required_level: Option<i32>,
    },
}

impl LineShape {
    fn decode(line_no: usize, line: &str) -> Result<Self, InputError> {
        let parts: Vec<&str> = line.split('\t').map(str::trim).collect();

        let shape = match parts.as_slice() {
            [] => {
                return Err(InputError::UnsupportedShape {
                    line: line_no,
                    raw: line.to_string(),
                })
            }
            [spell] => Self::SpellOnly {
                spell_id: parse_int(line_no, "spell_id", spell)?,
            },
            [spell, name] => Self::SpellName {
                spell_id: parse_int(line_no, "spell_id", spell)?,
                name: name.to_string(),
            },
            [spell, name, level] => Self::SpellNameLevel {
                spell_id: parse_int(line_no, "spell_id", spell)?,
                name: name.to_string(),
                required_level: parse_level(line_no, level)?,
            },
            [entry, spell, name, level, ..] => Self::Explicit {
                entry: parse_int(line_no, "entry", entry)?,
                spell_id: parse_int(line_no, "spell_id", spell)?,
                name: name.to_string(),
                required_level: parse_level(line_no, level)?,
            },
        };

        Ok(shape)
    }
}

fn parse_int<T: std::str::FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<T, InputError> {
    value.parse().map_err(|_| InputError::InvalidInteger {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_level(line: usize, value: &str) -> Result<Option<i32>, InputError> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_int(line, "required_level", value).map(Some)
    }
}

/// Parser settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// First id handed to rows without an explicit entry
    pub start_entry: u32,

    /// Case-insensitive name prefix of rows to drop
    pub placeholder_prefix: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            start_entry: 91000,
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
        }
    }
}

/// Line parser; owns the auto-id counter and dedup sets for one run
pub struct SpecParser {
    next_entry: u32,
    placeholder_prefix: String,
    seen_names: HashSet<String>,
    seen_spell_ids: HashSet<u32>,
    specs: Vec<TomeSpec>,
    skipped: SkipTally,
}

impl SpecParser {
    pub fn new(options: &ParserOptions) -> Self {
        Self {
            next_entry: options.start_entry,
            placeholder_prefix: options.placeholder_prefix.to_lowercase(),
            seen_names: HashSet::new(),
            seen_spell_ids: HashSet::new(),
            specs: Vec::new(),
            skipped: SkipTally::default(),
        }
    }

    /// Parse all lines to completion. The first malformed line aborts.
    pub fn parse<I, S>(mut self, lines: I) -> Result<ParseOutcome, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (idx, raw) in lines.into_iter().enumerate() {
            self.push_line(idx + 1, raw.as_ref())?;
        }

        tracing::debug!(
            accepted = self.specs.len(),
            skipped = self.skipped.total(),
            next_entry = self.next_entry,
            "parsed input lines"
        );

        Ok(ParseOutcome {
            specs: self.specs,
            skipped: self.skipped,
        })
    }

    fn push_line(&mut self, line_no: usize, raw: &str) -> Result<(), InputError> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let candidate = match LineShape::decode(line_no, line)? {
            LineShape::SpellOnly { spell_id } => TomeSpec {
                entry: self.allocate_entry(line_no)?,
                spell_id,
                name: format!("Tome of Spell {}", spell_id),
                required_level: None,
            },
            LineShape::SpellName { spell_id, name } => TomeSpec {
                entry: self.allocate_entry(line_no)?,
                spell_id,
                name,
                required_level: None,
            },
            LineShape::SpellNameLevel { spell_id, name, required_level } => TomeSpec {
                entry: self.allocate_entry(line_no)?,
                spell_id,
                name,
                required_level,
            },
            LineShape::Explicit { entry, spell_id, name, required_level } => TomeSpec {
                entry,
                spell_id,
                name,
                required_level,
            },
        };

        self.accept(candidate);
        Ok(())
    }

    /// Hands out the next auto id. Ids spent on rows that are later
    /// filtered out are not reused.
    fn allocate_entry(&mut self, line_no: usize) -> Result<u32, InputError> {
        let entry = self.next_entry;
        self.next_entry = entry
            .checked_add(1)
            .ok_or(InputError::EntryOverflow { line: line_no })?;
        Ok(entry)
    }

    fn accept(&mut self, spec: TomeSpec) {
        if spec.name.to_lowercase().starts_with(&self.placeholder_prefix) {
            self.skipped.placeholder_name += 1;
            return;
        }

        if matches!(spec.required_level, Some(level) if level <= 0) {
            self.skipped.zero_level += 1;
            return;
        }

        // Name is marked seen even if the spell id check below drops the row.
        if !self.seen_names.insert(spec.name.trim().to_lowercase()) {
            self.skipped.duplicate_name += 1;
            return;
        }

        if !self.seen_spell_ids.insert(spec.spell_id) {
            self.skipped.duplicate_spell_id += 1;
            return;
        }

        self.specs.push(spec);
    }
}

/// Parse lines with the given options.
pub fn parse_input_lines<I, S>(
    lines: I,
    options: &ParserOptions,
) -> Result<ParseOutcome, InputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SpecParser::new(options).parse(lines)
}

/// Parse a whole input text, splitting it with [`split_lines`].
pub fn parse_input_text(text: &str, options: &ParserOptions) -> Result<ParseOutcome, InputError> {
    parse_input_lines(split_lines(text), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(lines: &[&str]) -> ParseOutcome {
        parse_input_lines(lines.iter().copied(), &ParserOptions::default()).unwrap()
    }

    #[test]
    fn single_field_synthesizes_name() {
        let out = parse(&["143"]);
        assert_eq!(
            out.specs,
            vec![TomeSpec {
                entry: 91000,
                spell_id: 143,
                name: "Tome of Spell 143".to_string(),
                required_level: None,
            }]
        );
    }

    #[test]
    fn field_counts_map_to_columns() {
        let out = parse(&[
            "116\tTome of Frostbolt (Rank 1)",
            "205\tTome of Frostbolt (Rank 2)\t8",
            "205\tTome of Frostbolt (Rank 3)\t",
            "95000\t837\tTome of Frostbolt (Rank 4)\t20\textra",
        ]);

        assert_eq!(out.specs.len(), 3);
        assert_eq!(out.specs[0].entry, 91000);
        assert_eq!(out.specs[0].required_level, None);
        assert_eq!(out.specs[1].entry, 91001);
        assert_eq!(out.specs[1].required_level, Some(8));
        // Third line drops on duplicate spell id but still spent 91002.
        assert_eq!(out.skipped.duplicate_spell_id, 1);
        assert_eq!(
            out.specs[2],
            TomeSpec {
                entry: 95000,
                spell_id: 837,
                name: "Tome of Frostbolt (Rank 4)".to_string(),
                required_level: Some(20),
            }
        );
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let out = parse(&["", "   ", "# header", "  # indented comment", "143"]);
        assert_eq!(out.specs.len(), 1);
        assert_eq!(out.specs[0].entry, 91000);
    }

    #[test]
    fn fields_and_lines_are_trimmed() {
        let out = parse(&["  143 \t  Tome of Fireball  \t 5 "]);
        assert_eq!(out.specs[0].spell_id, 143);
        assert_eq!(out.specs[0].name, "Tome of Fireball");
        assert_eq!(out.specs[0].required_level, Some(5));
    }

    #[test]
    fn dropped_duplicate_still_spends_auto_id() {
        let out = parse(&["143", "143", "116"]);
        let entries: Vec<u32> = out.specs.iter().map(|s| s.entry).collect();
        assert_eq!(entries, vec![91000, 91002]);
        assert_eq!(out.skipped.duplicate_name, 1);
    }

    #[test]
    fn placeholder_rows_are_dropped_but_spend_auto_id() {
        let out = parse(&["10\tTOME OF ZZOLD Fireball", "11\tTome of Fireball"]);
        assert_eq!(out.specs.len(), 1);
        assert_eq!(out.specs[0].entry, 91001);
        assert_eq!(out.skipped.placeholder_name, 1);
    }

    #[test]
    fn zero_level_row_does_not_occupy_name_or_spell() {
        let out = parse(&["143\tTome of Fireball\t0", "143\tTome of Fireball\t4"]);
        assert_eq!(out.skipped.zero_level, 1);
        assert_eq!(out.specs.len(), 1);
        assert_eq!(out.specs[0].entry, 91001);
        assert_eq!(out.specs[0].required_level, Some(4));
    }

    #[test]
    fn negative_level_counts_as_zero_level() {
        let out = parse(&["143\tTome of Fireball\t-3"]);
        assert!(out.specs.is_empty());
        assert_eq!(out.skipped.zero_level, 1);
    }

    #[test]
    fn names_dedup_case_insensitively() {
        let out = parse(&["1\tTome of Blink", "2\ttome of blink"]);
        assert_eq!(out.specs.len(), 1);
        assert_eq!(out.skipped.duplicate_name, 1);
    }

    #[test]
    fn duplicate_spell_drop_still_marks_name_seen() {
        let out = parse(&["1\tTome of Blink", "1\tTome of Slow", "2\tTome of Slow"]);
        assert_eq!(out.specs.len(), 1);
        assert_eq!(out.skipped.duplicate_spell_id, 1);
        assert_eq!(out.skipped.duplicate_name, 1);
    }

    #[test]
    fn bad_integer_is_fatal_with_line_number() {
        let err =
            parse_input_lines(["# c", "143", "fireball"], &ParserOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidInteger { line: 3, field: "spell_id", ref value }
                if value == "fireball"
        ));
    }

    #[test]
    fn carriage_return_only_text_splits_into_rows() {
        let out = parse_input_text("143\r116\r", &ParserOptions::default()).unwrap();
        let rows: Vec<(u32, u32)> = out.specs.iter().map(|s| (s.entry, s.spell_id)).collect();
        assert_eq!(rows, vec![(91000, 143), (91001, 116)]);
    }

    #[test]
    fn mixed_line_endings_keep_line_numbers() {
        let err = parse_input_text("143\r\n116\rbad\n", &ParserOptions::default()).unwrap_err();
        assert!(matches!(err, InputError::InvalidInteger { line: 3, .. }));
    }

    #[test]
    fn bad_level_is_fatal() {
        let err = parse_input_lines(["143\tTome\tten"], &ParserOptions::default()).unwrap_err();
        assert!(matches!(err, InputError::InvalidInteger { field: "required_level", .. }));
    }

    #[test]
    fn auto_id_overflow_is_fatal() {
        let options = ParserOptions {
            start_entry: u32::MAX,
            ..ParserOptions::default()
        };
        let err = parse_input_lines(["143"], &options).unwrap_err();
        assert!(matches!(err, InputError::EntryOverflow { line: 1 }));
    }

    #[test]
    fn tally_messages_follow_categories() {
        let none = SkipTally::default();
        assert!(none.messages(DEFAULT_PLACEHOLDER_PREFIX).is_empty());

        let levels_only = SkipTally {
            zero_level: 2,
            ..SkipTally::default()
        };
        assert_eq!(
            levels_only.messages(DEFAULT_PLACEHOLDER_PREFIX),
            vec!["Filtered input: skipped 2 rows with required_level=0.".to_string()]
        );

        let dupes = SkipTally {
            duplicate_name: 1,
            ..SkipTally::default()
        };
        let lines = dupes.messages(DEFAULT_PLACEHOLDER_PREFIX);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("skipped 1 duplicate name rows"));
        assert!(lines[0].contains("'tome of zz*'"));
    }
}
