//! Purpose: Read delimited text with a header row into raw records.
//! Exports: `CsvSource`.
//! Role: Default loader for the CLI; wraps the `csv` crate behind `RecordSource`.
//! Invariants: Header names become keys verbatim; values stay text (no type inference).
//! Invariants: Short rows yield `Null` for missing columns; long rows key extras by position.
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;
use crate::core::value::{Key, Value};
use crate::source::{RecordSource, open_file};

pub struct CsvSource<R> {
    reader: R,
    path: Option<PathBuf>,
    delimiter: u8,
}

impl CsvSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = open_file(path)?;
        Ok(Self {
            reader: file,
            path: Some(path.to_path_buf()),
            delimiter: b',',
        })
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            path: None,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl<R: Read> RecordSource for CsvSource<R> {
    fn read_records(self) -> Result<Vec<Record>, Error> {
        let CsvSource {
            reader,
            path,
            delimiter,
        } = self;
        let path = path.as_deref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|err| csv_error(err, "failed to read CSV header", path))?
            .clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|err| csv_error(err, "failed to read CSV row", path))?;
            let mut record = Record::with_capacity(headers.len().max(row.len()));
            for (idx, header) in headers.iter().enumerate() {
                record.insert(header, row.get(idx).map_or(Value::Null, Value::from));
            }
            for (idx, field) in row.iter().enumerate().skip(headers.len()) {
                record.insert(Key::from(idx), field);
            }
            records.push(record);
        }
        trace!(rows = records.len(), columns = headers.len(), "read CSV records");
        Ok(records)
    }
}

fn csv_error(err: csv::Error, message: &str, path: Option<&Path>) -> Error {
    let kind = if err.is_io_error() {
        ErrorKind::Io
    } else {
        ErrorKind::Malformed
    };
    let mut out = Error::new(kind).with_message(message);
    if let Some(position) = err.position() {
        out = out.with_line(position.line());
    }
    if let Some(path) = path {
        out = out.with_path(path);
    }
    out.with_source(err)
}
