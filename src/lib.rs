//! Purpose: Library crate behind the `rowtable` CLI: immutable record tables and their loaders.
//! Exports: `core` (values, normalization, records, table queries, errors), `source` (record loaders).
//! Role: The query core stays free of I/O; `source` is the only layer that touches files.
//! Invariants: Table construction and queries never fail on data; only loading returns errors.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
pub mod source;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::normalize::{dedup_marker, normalize_key, normalize_value, try_parse_number};
pub use crate::core::record::Record;
pub use crate::core::table::Table;
pub use crate::core::value::{Key, Value};
pub use crate::source::{CsvSource, JsonlSource, RecordSource, SourceFormat};
