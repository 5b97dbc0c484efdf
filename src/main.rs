//! Purpose: `rowtable` CLI entry point: load a record file and print query results.
//! Role: Binary crate root; parses args, loads the table once, dispatches one command.
//! Invariants: Results go to stdout as JSON lines; diagnostics and logs go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod row_filter;

use rowtable::core::error::{Error, ErrorKind, to_exit_code};
use rowtable::source::SourceFormat;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `rowtable --help`."));
            }
        },
    };

    init_tracing();
    let table = command_dispatch::load_table(cli.file, cli.format.map(SourceFormat::from))?;
    command_dispatch::dispatch_command(cli.command, &table)?;
    Ok(RunOutcome::ok())
}

#[derive(Parser)]
#[command(
    name = "rowtable",
    version,
    about = "Query a CSV or JSON Lines file as an immutable table",
    long_about = None,
    after_help = r#"EXAMPLES
  $ rowtable mean temperature
  $ rowtable --file cities.csv rows --eq country=spain --gt temperature=12
  $ rowtable --file cities.csv rows --select city --select country --limit 5
  $ rowtable nunique country
  $ rowtable report

Without --file, Cities.csv is looked up in ./, $ROWTABLE_DATA_DIR and /content.
Set RUST_LOG=debug to see loading diagnostics on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Record file to load (default: Cities.csv in common locations)",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_enum,
        help = "Input format (default: from the file extension)"
    )]
    format: Option<FormatArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Jsonl,
}

impl From<FormatArg> for SourceFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => SourceFormat::Csv,
            FormatArg::Jsonl => SourceFormat::Jsonl,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Count records")]
    Count,
    #[command(about = "Mean of the numeric values in a column (null when there are none)")]
    Mean { column: String },
    #[command(about = "Distinct values of a column, first spelling wins")]
    Unique { column: String },
    #[command(about = "Number of distinct values in a column")]
    Nunique { column: String },
    #[command(about = "Print records, optionally filtered and projected")]
    Rows(RowsArgs),
    #[command(about = "Summary of a cities file: mean temperature, Germany, warm Spain, countries")]
    Report,
}

#[derive(Args)]
struct RowsArgs {
    #[arg(
        long,
        value_name = "COL=VALUE",
        help = "Keep records whose column equals VALUE (case-insensitive)"
    )]
    eq: Vec<String>,
    #[arg(long, value_name = "COL=NUM", help = "Keep records whose column is a number above NUM")]
    gt: Vec<String>,
    #[arg(long, value_name = "COL=NUM", help = "Keep records whose column is a number below NUM")]
    lt: Vec<String>,
    #[arg(long, value_name = "COL", help = "Only print these columns (repeatable)")]
    select: Vec<String>,
    #[arg(long, help = "Print at most this many records")]
    limit: Option<usize>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Malformed => "malformed input".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    if let Some(line) = err.line() {
        lines.push(format!("line: {line}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
