//! Purpose: Immutable, ordered table of normalized records and its query operations.
//! Exports: `Table`.
//! Role: The query core: construction, filter, select, aggregate, mean, unique/nunique, export.
//! Invariants: Every stored record has passed key/value normalization.
//! Invariants: No operation mutates `self`; derived tables own their records outright.
//! Invariants: Missing keys and non-numeric values are data, never errors.
use std::collections::HashSet;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use tracing::trace;

use crate::core::normalize::{
    dedup_marker, normalize_column, normalize_key, normalize_value, try_parse_number,
};
use crate::core::record::Record;
use crate::core::value::{Key, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    rows: Vec<Record>,
}

impl Table {
    /// Builds a table from raw records, normalizing every key and value.
    ///
    /// Accepts anything that iterates key/value pairs per record: `Record`s,
    /// `HashMap`s, vectors of tuples. Records may have different shapes.
    pub fn new<I, R, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        let rows: Vec<Record> = rows
            .into_iter()
            .map(|raw| {
                raw.into_iter()
                    .map(|(key, value)| {
                        (normalize_key(key.into()), normalize_value(value.into()))
                    })
                    .collect()
            })
            .collect();
        trace!(rows = rows.len(), "built table");
        Self { rows }
    }

    /// Wraps records that are already normalized.
    fn from_normalized(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    /// Owned copy of every record, in table order.
    pub fn to_list(&self) -> Vec<Record> {
        self.rows.clone()
    }

    /// Distinct keys across all records, in first-seen order.
    pub fn columns(&self) -> Vec<Key> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for key in self.rows.iter().flat_map(Record::keys) {
            if seen.insert(key) {
                columns.push(key.clone());
            }
        }
        columns
    }

    /// Records for which `predicate` holds, in their original order.
    pub fn filter<P>(&self, mut predicate: P) -> Table
    where
        P: FnMut(&Record) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|record| predicate(*record))
            .cloned()
            .collect();
        Table::from_normalized(rows)
    }

    /// Like [`Table::filter`] but for fallible predicates; the first error is returned as-is.
    pub fn try_filter<P, E>(&self, mut predicate: P) -> Result<Table, E>
    where
        P: FnMut(&Record) -> Result<bool, E>,
    {
        let mut rows = Vec::new();
        for record in &self.rows {
            if predicate(record)? {
                rows.push(record.clone());
            }
        }
        Ok(Table::from_normalized(rows))
    }

    /// Keeps only the requested columns in each record. Unknown columns are ignored.
    pub fn select<I, S>(&self, columns: I) -> Table
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<Key> = columns
            .into_iter()
            .map(|column| normalize_column(column.as_ref()))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|record| {
                let mut projected = record.clone();
                projected.retain(|key| wanted.contains(key));
                projected
            })
            .collect();
        Table::from_normalized(rows)
    }

    /// Applies `agg` to the values of `column`, skipping records that lack it.
    pub fn aggregate<F, T>(&self, column: &str, agg: F) -> T
    where
        F: FnOnce(Vec<&Value>) -> T,
    {
        agg(self.column_values(column).collect())
    }

    /// Arithmetic mean of the numeric values of `column`.
    ///
    /// Values that do not coerce to a number are dropped. Returns `None` when
    /// no numeric value remains, which is distinct from a mean of zero.
    pub fn mean(&self, column: &str) -> Option<f64> {
        let (sum, count) = self
            .column_values(column)
            .filter_map(try_parse_number)
            .fold((0.0, 0usize), |(sum, count), n| (sum + n, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// First-seen value for each distinct dedup marker of `column`, in table order.
    pub fn unique(&self, column: &str) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.column_values(column)
            .filter(|value| seen.insert(dedup_marker(value)))
            .cloned()
            .collect()
    }

    /// Number of distinct dedup markers in `column`.
    pub fn nunique(&self, column: &str) -> usize {
        self.column_values(column)
            .map(dedup_marker)
            .collect::<HashSet<_>>()
            .len()
    }

    fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let key = normalize_column(column);
        self.rows.iter().filter_map(move |record| record.get(&key))
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Table::new(iter)
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for record in &self.rows {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}
