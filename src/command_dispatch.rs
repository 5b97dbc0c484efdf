//! Purpose: Execute parsed `rowtable` subcommands against a loaded table.
//! Exports: `dispatch_command`, `load_table`.
//! Role: Bridges clap types in `main` to `Table` queries and JSON stdout.
//! Invariants: Every command writes exactly one JSON document per line to stdout.
//! Invariants: Loading happens once per invocation, before any query runs.
use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use rowtable::core::error::{Error, ErrorKind};
use rowtable::source::locate::{DEFAULT_FILE_NAME, locate};
use rowtable::source::{SourceFormat, load_path};
use rowtable::{Record, Table, Value};

use crate::Command;
use crate::row_filter::{RowFilter, apply_filters, parse_filters};

#[derive(Serialize)]
struct CountOutput {
    count: usize,
}

#[derive(Serialize)]
struct MeanOutput<'a> {
    column: &'a str,
    mean: Option<f64>,
}

#[derive(Serialize)]
struct UniqueOutput<'a> {
    column: &'a str,
    values: Vec<Value>,
}

#[derive(Serialize)]
struct NuniqueOutput<'a> {
    column: &'a str,
    nunique: usize,
}

#[derive(Serialize)]
struct Report {
    average_temperature: Option<f64>,
    cities_in_germany: Table,
    spain_above_12: Table,
    unique_countries: usize,
}

pub(crate) fn load_table(
    file: Option<PathBuf>,
    format: Option<SourceFormat>,
) -> Result<Table, Error> {
    let path = match file {
        Some(path) => path,
        None => locate(DEFAULT_FILE_NAME)?,
    };
    load_path(&path, format)
}

pub(crate) fn dispatch_command(command: Command, table: &Table) -> Result<(), Error> {
    debug!(rows = table.len(), "dispatching command");
    match command {
        Command::Count => emit_json(&CountOutput { count: table.len() }),
        Command::Mean { column } => emit_json(&MeanOutput {
            mean: table.mean(&column),
            column: &column,
        }),
        Command::Unique { column } => emit_json(&UniqueOutput {
            values: table.unique(&column),
            column: &column,
        }),
        Command::Nunique { column } => emit_json(&NuniqueOutput {
            nunique: table.nunique(&column),
            column: &column,
        }),
        Command::Rows(args) => {
            let filters = parse_filters(&args.eq, &args.gt, &args.lt)?;
            let mut rows = apply_filters(table, &filters);
            if !args.select.is_empty() {
                rows = rows.select(&args.select);
            }
            if let Some(limit) = args.limit {
                rows = rows.iter().take(limit).cloned().collect();
            }
            emit_records(rows.iter())
        }
        Command::Report => emit_json(&report(table)),
    }
}

fn report(table: &Table) -> Report {
    let germany = [RowFilter::Equals {
        column: "country".to_string(),
        marker: "germany".to_string(),
    }];
    let spain_warm = [
        RowFilter::Equals {
            column: "country".to_string(),
            marker: "spain".to_string(),
        },
        RowFilter::Above {
            column: "temperature".to_string(),
            threshold: 12.0,
        },
    ];
    Report {
        average_temperature: table.mean("temperature"),
        cities_in_germany: apply_filters(table, &germany),
        spain_above_12: apply_filters(table, &spain_warm),
        unique_countries: table.nunique("country"),
    }
}

fn emit_json<T: Serialize>(value: &T) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    write_json_line(&mut stdout, value)
}

fn emit_records<'a>(records: impl Iterator<Item = &'a Record>) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    for record in records {
        write_json_line(&mut stdout, record)?;
    }
    Ok(())
}

fn write_json_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), Error> {
    serde_json::to_writer(&mut *out, value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode JSON output")
            .with_source(err)
    })?;
    writeln!(out).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write stdout")
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{report, write_json_line};
    use rowtable::Table;

    #[test]
    fn report_matches_the_city_summary() {
        let table = Table::new(vec![
            vec![("City", "Madrid"), ("Country", "Spain"), ("Temperature", "15")],
            vec![("City", "Berlin"), ("Country", "Germany"), ("Temperature", "9")],
            vec![("City", "Bilbao"), ("Country", "spain "), ("Temperature", "11")],
            vec![("City", "Munich"), ("Country", "germany"), ("Temperature", "n/a")],
        ]);
        let report = report(&table);
        assert_eq!(report.average_temperature, Some(35.0 / 3.0));
        assert_eq!(report.cities_in_germany.len(), 2);
        assert_eq!(report.spain_above_12.len(), 1);
        assert_eq!(report.unique_countries, 2);
    }

    #[test]
    fn json_lines_keep_record_key_order() {
        let table = Table::new(vec![vec![("Zeta", "1"), ("Alpha", "2")]]);
        let mut out = Vec::new();
        write_json_line(&mut out, table.get(0).unwrap()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"zeta\":\"1\",\"alpha\":\"2\"}\n");
    }
}
