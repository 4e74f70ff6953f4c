use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tomesmith_core::{
    parse_input_text, render_script, ColumnExtractor, Config, DEFAULT_CONFIG_FILE,
};

/// Exit status when no rows survive parsing and filtering
const EXIT_NO_SPECS: i32 = 2;

/// Tomesmith - generate SQL for learned-spell tome items
///
/// Reads one spell per line (tab-separated) and emits INSERT ... SELECT
/// statements cloning a template item_template row.
#[derive(Parser, Debug)]
#[command(name = "tomesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: tomesmith.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// TSV input file. If omitted, reads from stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output .sql path. Use '-' to write to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to schema file containing the item_template definition
    #[arg(long)]
    schema_sql: Option<PathBuf>,

    /// Existing item_template entry to clone from
    #[arg(long)]
    template_entry: Option<u32>,

    /// Starting entry ID when input lines do not specify one
    #[arg(long)]
    start_entry: Option<u32>,

    /// Client-recognized dummy spell used to allow item use
    #[arg(long)]
    dummy_spell_id: Option<u32>,

    /// Item ScriptName to handle teaching
    #[arg(long)]
    script_name: Option<String>,

    /// AllowableClass override (-1 = all classes)
    #[arg(long, allow_negative_numbers = true)]
    allowable_class: Option<i32>,

    /// AllowableRace override (default: leave unchanged)
    #[arg(long, allow_negative_numbers = true)]
    allowable_race: Option<i32>,

    /// RequiredLevel override (default: leave unchanged)
    #[arg(long, allow_negative_numbers = true)]
    required_level: Option<i32>,
}

impl Cli {
    /// Flags given on the command line win over the config file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input_path = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(schema) = &self.schema_sql {
            config.schema_path = schema.clone();
        }
        if let Some(entry) = self.template_entry {
            config.template_entry = entry;
        }
        if let Some(entry) = self.start_entry {
            config.start_entry = entry;
        }
        if let Some(spell) = self.dummy_spell_id {
            config.dummy_spell_id = spell;
        }
        if let Some(script) = &self.script_name {
            config.script_name = script.clone();
        }
        if let Some(class) = self.allowable_class {
            config.allowable_class = class;
        }
        if self.allowable_race.is_some() {
            config.allowable_race = self.allowable_race;
        }
        if self.required_level.is_some() {
            config.required_level = self.required_level;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load config if specified
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    cli.apply_to(&mut config);

    let written = generate_command(&config, cli.verbose)?;
    if written == 0 {
        std::process::exit(EXIT_NO_SPECS);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Extract columns, parse the input, and write the script.
///
/// Returns the number of INSERT statements written; zero means nothing
/// survived filtering and no output was produced.
fn generate_command(config: &Config, verbose: bool) -> Result<usize> {
    if verbose {
        eprintln!("{} {}", "Reading schema from:".cyan(), config.schema_path.display());
    }
    let columns = ColumnExtractor::new(config.table.as_str())?.extract_file(&config.schema_path)?;
    if verbose {
        eprintln!("  {} columns in `{}`", columns.len(), columns.table());
    }

    let input = read_input(config.input_path.as_deref())?;
    let placeholder_prefix = config.placeholder_prefix.as_str();
    let outcome = parse_input_text(&input, &config.parser_options())?;

    for message in outcome.skipped.messages(placeholder_prefix) {
        eprintln!("{}", message.yellow());
    }

    if outcome.specs.is_empty() {
        eprintln!("{}", "No specs found in input.".red());
        return Ok(0);
    }

    let script = render_script(
        &columns,
        &outcome.specs,
        &config.render_options(),
        chrono::Utc::now(),
    );

    if config.writes_to_stdout() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(script.as_bytes())?;
        stdout.flush()?;
    } else {
        let file = std::fs::File::create(&config.output_path)
            .with_context(|| format!("Failed to create {}", config.output_path.display()))?;
        let mut out = io::BufWriter::new(file);
        out.write_all(script.as_bytes())?;
        out.flush()
            .with_context(|| format!("Failed to write {}", config.output_path.display()))?;
        if verbose {
            eprintln!("{} {}", "Script saved to:".green(), config.output_path.display());
        }
    }

    tracing::debug!(statements = outcome.specs.len(), "generation complete");
    if verbose {
        eprintln!("{} {} INSERT statements", "Wrote".green(), outcome.specs.len());
    }

    Ok(outcome.specs.len())
}

/// Read the whole input; invalid UTF-8 is replaced rather than rejected.
fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read input {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
