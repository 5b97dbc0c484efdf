//! Purpose: Turn files and readers into raw records for `Table` construction.
//! Exports: `RecordSource`, `SourceFormat`, `CsvSource`, `JsonlSource`, `load_path`, `locate`.
//! Role: The only I/O boundary of the crate; the query core never sees paths or bytes.
//! Invariants: Sources return raw (unnormalized) records; normalization belongs to `Table::new`.
//! Invariants: Every failure is an `Error` carrying the path and, when known, the line.
use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;
use crate::core::table::Table;

mod delimited;
mod jsonl;
pub mod locate;

pub use self::delimited::CsvSource;
pub use self::jsonl::JsonlSource;

/// Anything that can produce a finite batch of raw records.
pub trait RecordSource {
    fn read_records(self) -> Result<Vec<Record>, Error>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SourceFormat {
    Csv,
    Jsonl,
}

impl SourceFormat {
    /// Guesses the format from the file extension; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jsonl" | "ndjson") => SourceFormat::Jsonl,
            _ => SourceFormat::Csv,
        }
    }
}

impl Table {
    /// Drains `source` and normalizes its records into a table.
    pub fn from_source<S: RecordSource>(source: S) -> Result<Table, Error> {
        Ok(Table::new(source.read_records()?))
    }
}

/// Opens `path` and loads it as `format`, or as the format implied by its extension.
pub fn load_path(path: &Path, format: Option<SourceFormat>) -> Result<Table, Error> {
    let format = format.unwrap_or_else(|| SourceFormat::from_path(path));
    debug!(path = %path.display(), ?format, "loading records");
    let table = match format {
        SourceFormat::Csv => Table::from_source(CsvSource::open(path)?)?,
        SourceFormat::Jsonl => Table::from_source(JsonlSource::open(path)?)?,
    };
    debug!(rows = table.len(), "loaded table");
    Ok(table)
}

fn open_file(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|err| {
        let kind = if err.kind() == io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message("failed to open record source")
            .with_path(path)
            .with_source(err)
    })
}
