// cubadiff - compare two versions of a tabular dataset cell by cell

mod exit_codes;
mod logging;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use cubadiff_compare::config::Locale;
use cubadiff_compare::export::{write_changes_csv, write_groups_csv};
use cubadiff_compare::{compare, CompareConfig, CompareError, CompareReport};
use cubadiff_io::{LoadError, LoadOptions};

use exit_codes::{EXIT_CONFIG, EXIT_DIFFERENCES, EXIT_IO, EXIT_LOAD, EXIT_SUCCESS, EXIT_USAGE};
use logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "cubadiff")]
#[command(about = "Compare an old and a new version of a spreadsheet, cell by cell")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only errors on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two tables and report every changed cell
    #[command(after_help = "\
Examples:
  cubadiff compare antigo.xlsx novo.xlsx
  cubadiff compare antigo.csv novo.csv --id route_id --format json
  cubadiff compare antigo.xlsx novo.xlsx --legacy-suppression --locale pt-br \\
      --export-changes log.csv --export-groups grupos.csv
  cubadiff compare antigo.xlsx novo.xlsx --row R2")]
    Compare(CompareArgs),

    /// Print the default configuration as TOML
    #[command(after_help = "\
Examples:
  cubadiff init-config > cubadiff.toml
  cubadiff init-config --legacy-suppression --locale pt-br -o cubadiff.toml")]
    InitConfig {
        /// Include the legacy suppressed column positions
        #[arg(long)]
        legacy_suppression: bool,

        /// Label preset written into the file
        #[arg(long)]
        locale: Option<LocaleArg>,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Old (reference) table: csv, tsv, txt, xlsx, xlsm, xls, xlsb or ods
    old: PathBuf,

    /// New table, same formats
    new: PathBuf,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Identifier column used as the row key
    #[arg(long, value_name = "COLUMN", conflicts_with = "no_id")]
    id: Option<String>,

    /// Key rows by position instead of an identifier column
    #[arg(long)]
    no_id: bool,

    /// Hide the legacy bookkeeping column positions from the change log
    #[arg(long)]
    legacy_suppression: bool,

    /// Original column position (0-based) to hide from the change log. Repeatable.
    #[arg(long, value_name = "POS", value_delimiter = ',')]
    suppress: Vec<usize>,

    /// Label preset for empty cells and categories
    #[arg(long)]
    locale: Option<LocaleArg>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Write the change log CSV to this file
    #[arg(long, value_name = "FILE")]
    export_changes: Option<PathBuf>,

    /// Write the per-row grouped CSV to this file
    #[arg(long, value_name = "FILE")]
    export_groups: Option<PathBuf>,

    /// Write the display table (new table with change markers) as CSV
    #[arg(long, value_name = "FILE")]
    export_display: Option<PathBuf>,

    /// Only report this row key
    #[arg(long, value_name = "KEY")]
    row: Option<String>,

    /// Worksheet name for workbook inputs (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Field delimiter for text inputs (default: detected)
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
    Groups,
}

#[derive(Clone, Copy, ValueEnum)]
enum LocaleArg {
    En,
    PtBr,
}

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::En => Locale::En,
            LocaleArg::PtBr => Locale::PtBr,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet));

    let result = match cli.command {
        Commands::Compare(args) => cmd_compare(args, cli.quiet),
        Commands::InitConfig {
            legacy_suppression,
            locale,
            output,
        } => cmd_init_config(legacy_suppression, locale, output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
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

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Loader failures keep their own exit code: missing files are I/O,
    /// everything else is a load error.
    pub fn load(err: LoadError) -> Self {
        let code = match err {
            LoadError::Io { .. } => EXIT_IO,
            _ => EXIT_LOAD,
        };
        let hint = match &err {
            LoadError::UnsupportedFormat { .. } => {
                Some("convert the file to csv or xlsx first".to_string())
            }
            LoadError::SheetNotFound { .. } => {
                Some("pass one of the listed names with --sheet".to_string())
            }
            LoadError::Csv(_) => {
                Some("check the delimiter; force it with --delimiter".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CompareError> for CliError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::ConfigParse(_) | CompareError::ConfigValidation(_) => {
                Self::config(err.to_string())
            }
            CompareError::Export(_) | CompareError::Io(_) => Self::io(err.to_string()),
        }
    }
}

// ============================================================================
// compare
// ============================================================================

fn cmd_compare(args: CompareArgs, quiet: bool) -> Result<u8, CliError> {
    let config = resolve_config(&args)?;

    let delimiter = match args.delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => {
            return Err(CliError::args(format!("delimiter must be a single ASCII character, got {c:?}")))
        }
        None => None,
    };
    let options = LoadOptions {
        sheet: args.sheet.clone(),
        delimiter,
    };

    let old = cubadiff_io::load(&args.old, &options).map_err(CliError::load)?;
    let new = cubadiff_io::load(&args.new, &options).map_err(CliError::load)?;

    let report = compare(&old, &new, &config);

    let output_bytes = match &args.row {
        Some(key) => render_row(&report, key, args.format, config.locale)?,
        None => render_report(&report, args.format, config.locale)?,
    };
    write_output(args.output.as_deref(), &output_bytes)?;

    export_files(&args, &report, config.locale, quiet)?;

    if report.has_changes() {
        Ok(EXIT_DIFFERENCES)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// File settings first, then command-line overrides.
fn resolve_config(args: &CompareArgs) -> Result<CompareConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            CompareConfig::from_toml(&text).map_err(|e| {
                CliError::from(e).with_hint(format!(
                    "fix {} or regenerate it with `cubadiff init-config`",
                    path.display()
                ))
            })?
        }
        None => CompareConfig::default(),
    };

    if let Some(id) = &args.id {
        if id.trim().is_empty() {
            return Err(CliError::args("--id needs a column name")
                .with_hint("use --no-id to key rows by position"));
        }
        config = config.with_identifier(id.clone());
    }
    if args.no_id {
        config = config.without_identifier();
    }
    if args.legacy_suppression {
        config = config.with_legacy_suppression();
    }
    config.suppressed_positions.extend(args.suppress.iter().copied());
    if let Some(locale) = args.locale {
        config = config.with_locale(locale.into());
    }

    log::debug!(
        "identifier: {:?}, locale: {}, {} suppressed position(s)",
        config.identifier(),
        config.locale,
        config.suppressed_positions.len()
    );
    Ok(config)
}

fn render_report(
    report: &CompareReport,
    format: OutputFormat,
    locale: Locale,
) -> Result<Vec<u8>, CliError> {
    match format {
        OutputFormat::Text => Ok(render::text_report(report).into_bytes()),
        OutputFormat::Json => render::json_report(report),
        OutputFormat::Csv => render::csv_report(&report.changes, locale),
        OutputFormat::Groups => render::groups_report(&report.changes, locale),
    }
}

fn render_row(
    report: &CompareReport,
    key: &str,
    format: OutputFormat,
    locale: Locale,
) -> Result<Vec<u8>, CliError> {
    let focus = report.focus(key).ok_or_else(|| {
        let hint = if report.alignment.fallback_engaged() {
            "rows are keyed by position (0-based) in this run"
        } else {
            "row keys are values of the identifier column"
        };
        CliError::args(format!("row '{key}' is not present in both tables")).with_hint(hint)
    })?;

    match format {
        OutputFormat::Text => Ok(render::text_focus(&focus, locale).into_bytes()),
        OutputFormat::Json => render::json_focus(&focus),
        OutputFormat::Csv => render::csv_report(&render::focus_records(&focus), locale),
        OutputFormat::Groups => render::groups_report(&render::focus_records(&focus), locale),
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e))),
        None => io::stdout()
            .write_all(bytes)
            .map_err(|e| CliError::io(e.to_string())),
    }
}

fn create_file(path: &Path) -> Result<io::BufWriter<std::fs::File>, CliError> {
    std::fs::File::create(path)
        .map(io::BufWriter::new)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

fn export_files(
    args: &CompareArgs,
    report: &CompareReport,
    locale: Locale,
    quiet: bool,
) -> Result<(), CliError> {
    if let Some(path) = &args.export_changes {
        write_changes_csv(create_file(path)?, &report.changes, locale)?;
        if !quiet {
            eprintln!("change log exported to: {}", path.display());
        }
    }
    if let Some(path) = &args.export_groups {
        write_groups_csv(create_file(path)?, &report.groups)?;
        if !quiet {
            eprintln!("grouped changes exported to: {}", path.display());
        }
    }
    if let Some(path) = &args.export_display {
        cubadiff_io::csv::export(&report.display, path).map_err(CliError::load)?;
        if !quiet {
            eprintln!("display table exported to: {}", path.display());
        }
    }
    Ok(())
}

// ============================================================================
// init-config
// ============================================================================

fn cmd_init_config(
    legacy_suppression: bool,
    locale: Option<LocaleArg>,
    output: Option<PathBuf>,
) -> Result<u8, CliError> {
    let mut config = CompareConfig::default();
    if legacy_suppression {
        config = config.with_legacy_suppression();
    }
    if let Some(locale) = locale {
        config = config.with_locale(locale.into());
    }
    let text = config.to_toml()?;
    write_output(output.as_deref(), text.as_bytes())?;
    Ok(EXIT_SUCCESS)
}
