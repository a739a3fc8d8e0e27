//! Result records: ordered column-name to value mappings.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

use super::Value;
use crate::error::{ProbeError, Result};

/// One row of a result set.
///
/// Column names are shared between all records of the same result and are
/// exactly the statement's projected columns, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// Creates a record; fails if the value count does not match the columns.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(ProbeError::execution(format!(
                "Row has {} values but the result set declares {} columns",
                values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Column names in projection order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in projection order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the record, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Looks up a value by position.
    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Iterates `(column, value)` pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Returns the named value or a normalization error if the column is absent.
    pub fn require(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| ProbeError::normalization(column, "column missing from result"))
    }

    /// Reads a non-negative count. NULL counts as zero, which is what `SUM`
    /// returns over no rows.
    pub fn count(&self, column: &str) -> Result<u64> {
        Ok(self.optional_count(column)?.unwrap_or(0))
    }

    /// Reads a non-negative integer, keeping NULL as `None`.
    pub fn optional_count(&self, column: &str) -> Result<Option<u64>> {
        match self.require(column)? {
            Value::Null => Ok(None),
            value => {
                let n = value.as_i64().ok_or_else(|| {
                    ProbeError::normalization(
                        column,
                        format!("expected an integer, found {}", value.type_name()),
                    )
                })?;
                u64::try_from(n).map(Some).map_err(|_| {
                    ProbeError::normalization(column, format!("expected a count, found {n}"))
                })
            }
        }
    }

    /// Reads a float, keeping NULL as `None`. Integers are widened.
    pub fn optional_f64(&self, column: &str) -> Result<Option<f64>> {
        match self.require(column)? {
            Value::Null => Ok(None),
            value => value.as_f64().map(Some).ok_or_else(|| {
                ProbeError::normalization(
                    column,
                    format!("expected a number, found {}", value.type_name()),
                )
            }),
        }
    }

    /// Reads a string payload, or the display form of any non-null value.
    pub fn optional_string(&self, column: &str) -> Result<Option<String>> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Ok(Some(other.to_string())),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
