// xlbench - time spreadsheet writers on the HLPI dataset

mod bench;
mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use xlbench_config::{BenchSettings, ConfigError, LoadedSettings};
use xlbench_io::inspect::{read_sheets, read_tables};
use xlbench_io::{HlpiRecord, Variant, WriteOptions};

use bench::{render_table, time_variant, BenchReport};
use exit_codes::{EXIT_CONFIG, EXIT_DATA, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "xlbench")]
#[command(about = "Compare spreadsheet writers on a CSV dataset")]
#[command(version)]
struct Cli {
    /// Settings file (default: ./xlbench.toml, then the user config dir)
    #[arg(long, global = true, env = "XLBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time each writer variant over the dataset (quick wall-clock runs)
    #[command(after_help = "\
Examples:
  xlbench run --data benchmarks/fixtures/hlpi.csv
  xlbench run --variant ooxml-table --variant simple --iterations 50
  xlbench run --json > timings.json

Timings are plain mean/min/max over the runs. For statistically sound
measurements use the criterion bench: cargo bench -p xlbench-io --bench writers")]
    Run {
        /// CSV dataset
        #[arg(long)]
        data: Option<PathBuf>,

        /// Timed runs per variant
        #[arg(long, short = 'n')]
        iterations: Option<u32>,

        /// Untimed runs per variant before timing
        #[arg(long)]
        warmup: Option<u32>,

        /// Variant to run (repeatable): ooxml-table, xlsxwriter, xlsxwriter-table, simple
        #[arg(long = "variant")]
        variants: Vec<Variant>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write one variant's workbook to a file
    Export {
        #[arg(long)]
        variant: Variant,

        /// Output .xlsx path
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// CSV dataset
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Show the sheets and table parts of an .xlsx file
    Inspect {
        file: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective settings as TOML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            data,
            iterations,
            warmup,
            variants,
            json,
        } => cmd_run(cli.config.as_deref(), data, iterations, warmup, variants, json),
        Commands::Export {
            variant,
            output,
            data,
        } => cmd_export(cli.config.as_deref(), variant, &output, data),
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Config => cmd_config(cli.config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn cmd_run(
    config: Option<&Path>,
    data: Option<PathBuf>,
    iterations: Option<u32>,
    warmup: Option<u32>,
    variants: Vec<Variant>,
    json: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let data = data.unwrap_or_else(|| settings.data.clone());
    let iterations = iterations.unwrap_or(settings.iterations);
    let warmup = warmup.unwrap_or(settings.warmup);
    if iterations == 0 {
        return Err(CliError::usage("--iterations must be at least 1"));
    }
    let variants = if variants.is_empty() {
        parse_variants(&settings.variants)?
    } else {
        variants
    };
    let options = write_options(&settings);

    let records = load_dataset(&data)?;
    let mut results = Vec::with_capacity(variants.len());
    for variant in variants {
        let timing = time_variant(variant, &records, &options, warmup, iterations)
            .map_err(|e| CliError::write(variant, e))?;
        results.push(timing);
    }

    let report = BenchReport {
        data: data.display().to_string(),
        records: records.len(),
        warmup,
        results,
    };
    if json {
        let text = serde_json::to_string_pretty(&report).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", render_table(&report));
    }
    Ok(())
}

fn cmd_export(
    config: Option<&Path>,
    variant: Variant,
    output: &Path,
    data: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let data = data.unwrap_or_else(|| settings.data.clone());
    let records = load_dataset(&data)?;

    let bytes = variant
        .run(&records, &write_options(&settings))
        .map_err(|e| CliError::write(variant, e))?;
    std::fs::write(output, &bytes)
        .map_err(|e| CliError::general(format!("cannot write {}: {}", output.display(), e)))?;

    eprintln!(
        "{}: wrote {} records ({} bytes) to {}",
        variant,
        records.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}

fn cmd_inspect(file: &Path, json: bool) -> Result<(), CliError> {
    let bytes = std::fs::read(file)
        .map_err(|e| CliError::usage(format!("cannot read {}: {}", file.display(), e)))?;
    let unreadable = |e: xlbench_io::Error| CliError::usage(format!("{}: {}", file.display(), e));
    let sheets = read_sheets(&bytes).map_err(unreadable)?;
    let tables = read_tables(&bytes).map_err(unreadable)?;

    if json {
        let value = serde_json::json!({
            "sheets": sheets.iter().map(|s| serde_json::json!({
                "name": s.name,
                "rows": s.height(),
                "columns": s.rows.first().map_or(0, |r| r.len()),
                "header": s.rows.first(),
            })).collect::<Vec<_>>(),
            "tables": tables.iter().map(|t| serde_json::json!({
                "part": t.part,
                "id": t.id,
                "name": t.name,
                "display_name": t.display_name,
                "ref": t.reference,
                "auto_filter": t.auto_filter,
                "style": t.style,
                "row_stripes": t.row_stripes,
                "columns": t.columns.iter().map(|(_, name)| name).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        });
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    for sheet in &sheets {
        let width = sheet.rows.first().map_or(0, |r| r.len());
        println!("sheet '{}': {} rows x {} columns", sheet.name, sheet.height(), width);
    }
    for table in &tables {
        println!(
            "table {} '{}' ref {} filter {} style {}{}",
            table.id,
            table.name,
            table.reference,
            table.auto_filter.as_deref().unwrap_or("-"),
            table.style.as_deref().unwrap_or("-"),
            if table.row_stripes { " (striped)" } else { "" }
        );
        let names: Vec<&str> = table.columns.iter().map(|(_, n)| n.as_str()).collect();
        println!("  columns: {}", names.join(", "));
    }
    Ok(())
}

fn cmd_config(config: Option<&Path>) -> Result<(), CliError> {
    let LoadedSettings { settings, source } = BenchSettings::load(config).map_err(CliError::config)?;
    match source {
        Some(path) => println!("# from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    print!("{}", settings.to_toml().map_err(CliError::config)?);
    Ok(())
}

fn load_settings(config: Option<&Path>) -> Result<BenchSettings, CliError> {
    let loaded = BenchSettings::load(config).map_err(CliError::config)?;
    if loaded.source.is_none() && config.is_none() {
        log::info!("no settings file, using defaults");
    }
    Ok(loaded.settings)
}

fn parse_variants(names: &[String]) -> Result<Vec<Variant>, CliError> {
    names
        .iter()
        .map(|name| {
            name.parse::<Variant>()
                .map_err(|e| CliError::usage(format!("settings: {}", e)))
        })
        .collect()
}

fn write_options(settings: &BenchSettings) -> WriteOptions {
    WriteOptions {
        table_style: settings.table.style.clone(),
        row_stripes: settings.table.row_stripes,
        filter_button_padding: settings.table.filter_button_padding,
    }
}

fn load_dataset(path: &Path) -> Result<Vec<HlpiRecord>, CliError> {
    xlbench_io::csv::load_records(path).map_err(|e| {
        CliError::data(e.to_string()).with_hint("pass --data or set `data` in xlbench.toml")
    })
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DATA, message: msg.into(), hint: None }
    }

    pub fn write(variant: Variant, err: xlbench_io::Error) -> Self {
        Self { code: EXIT_WRITE, message: format!("{}: {}", variant, err), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
