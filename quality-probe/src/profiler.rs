//! Descriptive statistics over a single column.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::core::{Dialect, QualifiedTable, Statement, TableRef, Value};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::quality::rounded_percentage;
use crate::security::{InputValidator, SqlSecurity};

/// Number of values [`Profiler::distribution`] returns when no limit is given.
pub const DEFAULT_DISTRIBUTION_LIMIT: usize = 10;

/// Summary of a numeric column. Only non-null values are considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    pub count: u64,
    /// Smallest value, in the column's own type. NULL when `count` is 0.
    pub min: Value,
    /// Largest value, in the column's own type. NULL when `count` is 0.
    pub max: Value,
    pub avg: Option<f64>,
    /// Sample standard deviation; `None` with fewer than two values.
    pub stddev: Option<f64>,
    /// Approximate 50th percentile. Not an exact order statistic.
    pub median: Option<f64>,
}

/// Summary of a text column, lengths in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProfile {
    pub count: u64,
    pub distinct_count: u64,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub avg_length: Option<f64>,
}

/// One row of a value distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFrequency {
    pub value: Value,
    pub frequency: u64,
    /// Share of all rows in the table, rounded to two decimals.
    pub percentage: f64,
}

/// Builds and runs profiling queries.
#[derive(Debug, Clone, Copy)]
pub struct Profiler<'a> {
    executor: &'a QueryExecutor,
}

impl<'a> Profiler<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self { executor }
    }

    /// Count, extremes, mean, standard deviation and approximate median.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn profile_numeric(&self, table: &TableRef, column: &str) -> Result<NumericProfile> {
        let table = table.resolve(self.executor.config())?;
        let statement = numeric_statement(self.executor.dialect()?, &table, column)?;
        let record = self
            .executor
            .execute_single(&statement, "profile_numeric")
            .await?;

        Ok(NumericProfile {
            count: record.count("count")?,
            min: record.require("min_value")?.clone(),
            max: record.require("max_value")?.clone(),
            avg: record.optional_f64("avg_value")?,
            stddev: record.optional_f64("std_dev")?,
            median: record.optional_f64("median")?,
        })
    }

    /// Count, distinct count and length statistics.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn profile_text(&self, table: &TableRef, column: &str) -> Result<TextProfile> {
        let table = table.resolve(self.executor.config())?;
        let statement = text_statement(self.executor.dialect()?, &table, column)?;
        let record = self
            .executor
            .execute_single(&statement, "profile_text")
            .await?;

        Ok(TextProfile {
            count: record.count("count")?,
            distinct_count: record.count("distinct_count")?,
            min_length: record.optional_count("min_length")?,
            max_length: record.optional_count("max_length")?,
            avg_length: record.optional_f64("avg_length")?,
        })
    }

    /// The `limit` most frequent values, most frequent first.
    ///
    /// NULL forms its own group. The order among equally frequent values is
    /// whatever the engine produces.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn distribution(
        &self,
        table: &TableRef,
        column: &str,
        limit: usize,
    ) -> Result<Vec<ValueFrequency>> {
        InputValidator::validate_limit(limit)?;
        let table = table.resolve(self.executor.config())?;
        let statement = distribution_statement(&table, column, limit)?;

        self.executor
            .execute_statement(&statement)
            .await?
            .into_iter()
            .map(|record| {
                let frequency = record.count("frequency")?;
                let total = record.count("total_count")?;
                let value = record
                    .into_values()
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                Ok(ValueFrequency {
                    value,
                    frequency,
                    percentage: rounded_percentage(frequency, total),
                })
            })
            .collect()
    }

    /// [`Profiler::distribution`] with [`DEFAULT_DISTRIBUTION_LIMIT`].
    pub async fn top_values(&self, table: &TableRef, column: &str) -> Result<Vec<ValueFrequency>> {
        self.distribution(table, column, DEFAULT_DISTRIBUTION_LIMIT)
            .await
    }
}

fn numeric_statement(dialect: Dialect, table: &QualifiedTable, column: &str) -> Result<Statement> {
    let col = SqlSecurity::quote_identifier(column)?;
    let as_double = format!("CAST({col} AS DOUBLE)");
    let median = dialect.approx_median(&as_double);
    Ok(Statement::new(format!(
        "SELECT COUNT(*) AS \"count\", \
         MIN({col}) AS min_value, \
         MAX({col}) AS max_value, \
         AVG({as_double}) AS avg_value, \
         STDDEV({as_double}) AS std_dev, \
         {median} AS median \
         FROM {table} \
         WHERE {col} IS NOT NULL"
    )))
}

fn text_statement(dialect: Dialect, table: &QualifiedTable, column: &str) -> Result<Statement> {
    let col = SqlSecurity::quote_identifier(column)?;
    let length = dialect.char_length(&col);
    Ok(Statement::new(format!(
        "SELECT COUNT(*) AS \"count\", \
         COUNT(DISTINCT {col}) AS distinct_count, \
         MIN({length}) AS min_length, \
         MAX({length}) AS max_length, \
         AVG(CAST({length} AS DOUBLE)) AS avg_length \
         FROM {table} \
         WHERE {col} IS NOT NULL"
    )))
}

fn distribution_statement(table: &QualifiedTable, column: &str, limit: usize) -> Result<Statement> {
    let col = SqlSecurity::quote_identifier(column)?;
    Ok(Statement::new(format!(
        "SELECT {col}, \
         COUNT(*) AS frequency, \
         SUM(COUNT(*)) OVER () AS total_count \
         FROM {table} \
         GROUP BY {col} \
         ORDER BY frequency DESC \
         LIMIT {limit}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::connection::{ColumnDescriptor, ResultSet};
    use crate::error::ErrorKind;
    use crate::test_utils::{FailingConnection, RecordingConnection};

    fn executor_with(conn: RecordingConnection) -> QueryExecutor {
        QueryExecutor::with_connection(ConnectionConfig::default(), Box::new(conn))
    }

    #[tokio::test]
    async fn test_profile_numeric_uses_dialect_median() {
        let conn = RecordingConnection::new()
            .with_dialect(Dialect::Trino)
            .respond_with_row(&[
                ("count", Value::Int(9)),
                ("min_value", Value::Int(48000)),
                ("max_value", Value::Int(120000)),
                ("avg_value", Value::Float(77666.67)),
                ("std_dev", Value::Float(24315.63)),
                ("median", Value::Float(73000.0)),
            ]);
        let log = conn.log();
        let executor = executor_with(conn);

        let profile = Profiler::new(&executor)
            .profile_numeric(&TableRef::new("users"), "salary")
            .await
            .unwrap();
        assert_eq!(profile.count, 9);
        assert_eq!(profile.min, Value::Int(48000));
        assert_eq!(profile.max, Value::Int(120000));
        assert_eq!(profile.median, Some(73000.0));

        let sql = log.lock().unwrap()[0].sql().to_string();
        assert!(sql.contains("APPROX_PERCENTILE(CAST(\"salary\" AS DOUBLE), 0.5)"));
        assert!(sql.contains("WHERE \"salary\" IS NOT NULL"));
    }

    #[tokio::test]
    async fn test_profile_numeric_on_empty_column() {
        let conn = RecordingConnection::new().respond_with_row(&[
            ("count", Value::Int(0)),
            ("min_value", Value::Null),
            ("max_value", Value::Null),
            ("avg_value", Value::Null),
            ("std_dev", Value::Null),
            ("median", Value::Null),
        ]);
        let executor = executor_with(conn);

        let profile = Profiler::new(&executor)
            .profile_numeric(&TableRef::new("users"), "salary")
            .await
            .unwrap();
        assert_eq!(profile.count, 0);
        assert!(profile.min.is_null());
        assert_eq!(profile.avg, None);
        assert_eq!(profile.stddev, None);
    }

    #[tokio::test]
    async fn test_profile_text_normalizes_lengths() {
        let conn = RecordingConnection::new().respond_with_row(&[
            ("count", Value::Int(2)),
            ("distinct_count", Value::Int(2)),
            ("min_length", Value::Int(2)),
            ("max_length", Value::Int(4)),
            ("avg_length", Value::Float(3.0)),
        ]);
        let executor = executor_with(conn);

        let profile = Profiler::new(&executor)
            .profile_text(&TableRef::new("words"), "word")
            .await
            .unwrap();
        assert_eq!(
            profile,
            TextProfile {
                count: 2,
                distinct_count: 2,
                min_length: Some(2),
                max_length: Some(4),
                avg_length: Some(3.0),
            }
        );
    }

    #[tokio::test]
    async fn test_distribution_computes_rounded_percentages() {
        let conn = RecordingConnection::new().respond_with(ResultSet::new(
            vec![
                ColumnDescriptor::new("grade", "varchar"),
                ColumnDescriptor::new("frequency", "bigint"),
                ColumnDescriptor::new("total_count", "bigint"),
            ],
            vec![
                vec![Value::from("A"), Value::Int(3), Value::Int(6)],
                vec![Value::from("B"), Value::Int(2), Value::Int(6)],
            ],
        ));
        let log = conn.log();
        let executor = executor_with(conn);

        let dist = Profiler::new(&executor)
            .distribution(&TableRef::new("grades"), "grade", 2)
            .await
            .unwrap();
        assert_eq!(
            dist,
            vec![
                ValueFrequency {
                    value: Value::from("A"),
                    frequency: 3,
                    percentage: 50.0
                },
                ValueFrequency {
                    value: Value::from("B"),
                    frequency: 2,
                    percentage: 33.33
                },
            ]
        );
        assert!(log.lock().unwrap()[0].sql().ends_with("LIMIT 2"));
    }

    #[tokio::test]
    async fn test_top_values_uses_default_limit() {
        let conn = RecordingConnection::new();
        let log = conn.log();
        let executor = executor_with(conn);

        let dist = Profiler::new(&executor)
            .top_values(&TableRef::new("users"), "department")
            .await
            .unwrap();
        assert!(dist.is_empty());
        assert!(log.lock().unwrap()[0].sql().ends_with("LIMIT 10"));
    }

    #[tokio::test]
    #[cfg(target_pointer_width = "64")]
    async fn test_distribution_rejects_limit_beyond_i64() {
        let conn = RecordingConnection::new();
        let log = conn.log();
        let executor = executor_with(conn);

        let err = Profiler::new(&executor)
            .distribution(&TableRef::new("users"), "department", usize::MAX)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_columns_are_normalization_errors() {
        let conn = RecordingConnection::new().respond_with_row(&[("count", Value::Int(1))]);
        let executor = executor_with(conn);

        let err = Profiler::new(&executor)
            .profile_text(&TableRef::new("words"), "word")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Normalization);
    }

    #[tokio::test]
    async fn test_execution_errors_propagate_unchanged() {
        let executor = QueryExecutor::with_connection(
            ConnectionConfig::default(),
            Box::new(FailingConnection::execution("Column 'nope' cannot be resolved")),
        );
        let profiler = Profiler::new(&executor);
        let users = TableRef::new("users");

        for err in [
            profiler.profile_numeric(&users, "nope").await.unwrap_err(),
            profiler.profile_text(&users, "nope").await.unwrap_err(),
            profiler.distribution(&users, "nope", 5).await.unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Execution);
            assert!(err.to_string().contains("cannot be resolved"));
        }
    }
}
