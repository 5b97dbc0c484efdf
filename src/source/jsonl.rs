//! Purpose: Read line-delimited JSON objects into raw records.
//! Exports: `JsonlSource`.
//! Role: Secondary loader; keeps typed scalars (numbers, booleans, nulls) intact.
//! Invariants: Blank lines are skipped; every other line must hold exactly one JSON object.
//! Invariants: Errors name the 1-based physical line of the offending record.
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;
use crate::source::{RecordSource, open_file};

pub struct JsonlSource<R> {
    reader: R,
    path: Option<PathBuf>,
}

impl JsonlSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = open_file(path)?;
        Ok(Self {
            reader: file,
            path: Some(path.to_path_buf()),
        })
    }
}

impl<R: Read> JsonlSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader, path: None }
    }
}

impl<R: Read> RecordSource for JsonlSource<R> {
    fn read_records(self) -> Result<Vec<Record>, Error> {
        let JsonlSource { reader, path } = self;
        let with_path = |err: Error| match &path {
            Some(path) => err.with_path(path),
            None => err,
        };

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        let mut line_no = 0u64;
        let mut records = Vec::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line).map_err(|err| {
                with_path(
                    Error::new(ErrorKind::Io)
                        .with_message("failed to read JSON lines")
                        .with_source(err),
                )
            })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str::<Record>(trimmed).map_err(|err| {
                with_path(
                    Error::new(ErrorKind::Malformed)
                        .with_message("expected one JSON object per line")
                        .with_hint(err.to_string())
                        .with_line(line_no)
                        .with_source(err),
                )
            })?;
            records.push(record);
        }
        trace!(rows = records.len(), lines = line_no, "read JSON line records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonlSource;
    use crate::core::error::ErrorKind;
    use crate::core::value::{Key, Value};
    use crate::source::RecordSource;

    #[test]
    fn reads_objects_and_skips_blank_lines() {
        let input = concat!(
            "{\"City\":\"Lyon\",\"temp\":11.5}\n",
            "\n",
            "  \r\n",
            "{\"City\":\"Nice\",\"temp\":17,\"coastal\":true}\r\n",
        );
        let records = JsonlSource::from_reader(input.as_bytes())
            .read_records()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(&Key::from("temp")), Some(&Value::Float(11.5)));
        assert_eq!(records[1].get(&Key::from("temp")), Some(&Value::Int(17)));
        assert_eq!(records[1].get(&Key::from("coastal")), Some(&Value::Bool(true)));
    }

    #[test]
    fn non_object_line_reports_its_line_number() {
        let input = "{\"a\":1}\n\n[1,2]\n";
        let err = JsonlSource::from_reader(input.as_bytes())
            .read_records()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn truncated_object_is_malformed() {
        let err = JsonlSource::from_reader("{\"a\":".as_bytes())
            .read_records()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.line(), Some(1));
    }
}
