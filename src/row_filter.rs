//! Purpose: Parse and evaluate `rowtable rows --eq/--gt/--lt` filters against records.
//! Exports: `RowFilter`, `parse_filters`, `apply_filters`.
//! Role: Small adapter turning CLI strings into closures for `Table::filter`.
//! Invariants: Malformed `COL=VALUE` arguments are usage errors, reported before any filtering.
//! Invariants: Missing columns and non-numeric values never match; they are not errors.
use rowtable::core::error::{Error, ErrorKind};
use rowtable::{Record, Table, Value, dedup_marker, try_parse_number};

#[derive(Clone, Debug, PartialEq)]
pub enum RowFilter {
    Equals { column: String, marker: String },
    Above { column: String, threshold: f64 },
    Below { column: String, threshold: f64 },
}

impl RowFilter {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RowFilter::Equals { column, marker } => record
                .field(column)
                .is_some_and(|value| dedup_marker(value) == *marker),
            RowFilter::Above { column, threshold } => record
                .field(column)
                .and_then(try_parse_number)
                .is_some_and(|n| n > *threshold),
            RowFilter::Below { column, threshold } => record
                .field(column)
                .and_then(try_parse_number)
                .is_some_and(|n| n < *threshold),
        }
    }
}

pub fn parse_filters(
    eq: &[String],
    gt: &[String],
    lt: &[String],
) -> Result<Vec<RowFilter>, Error> {
    let mut filters = Vec::with_capacity(eq.len() + gt.len() + lt.len());
    for arg in eq {
        let (column, value) = split_assignment("--eq", arg)?;
        filters.push(RowFilter::Equals {
            column: column.to_string(),
            marker: value.trim().to_lowercase(),
        });
    }
    for arg in gt {
        let (column, threshold) = numeric_assignment("--gt", arg)?;
        filters.push(RowFilter::Above { column, threshold });
    }
    for arg in lt {
        let (column, threshold) = numeric_assignment("--lt", arg)?;
        filters.push(RowFilter::Below { column, threshold });
    }
    Ok(filters)
}

/// Chains one `Table::filter` per filter, so each step yields a new table.
pub fn apply_filters(table: &Table, filters: &[RowFilter]) -> Table {
    filters
        .iter()
        .fold(table.clone(), |current, filter| current.filter(|r| filter.matches(r)))
}

fn split_assignment<'a>(flag: &str, arg: &'a str) -> Result<(&'a str, &'a str), Error> {
    match arg.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => Ok((column, value)),
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid {flag} argument `{arg}`"))
            .with_hint(format!("Use {flag} COLUMN=VALUE, for example: {flag} temperature=12"))),
    }
}

fn numeric_assignment(flag: &str, arg: &str) -> Result<(String, f64), Error> {
    let (column, value) = split_assignment(flag, arg)?;
    let threshold = try_parse_number(&Value::from(value)).ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("{flag} needs a numeric threshold, got `{value}`"))
            .with_hint(format!("Example: {flag} {column}=12.5"))
    })?;
    Ok((column.to_string(), threshold))
}
