//! Data-quality probes: null rate, duplicate values, out-of-range values.
//!
//! Each probe renders one statement against a fully-qualified table, runs it
//! through the [`QueryExecutor`] and normalizes the answer into a small typed
//! result. Errors from the executor are returned unchanged.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::core::{Dialect, QualifiedTable, Statement, StatementBuilder, TableRef, Value};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::security::{InputValidator, SqlSecurity};

/// Outcome of [`QualityProbe::check_nulls`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullCheck {
    pub total_rows: u64,
    pub null_count: u64,
    /// `null_count * 100 / total_rows` rounded to two decimals; 0 for an empty table.
    pub null_percentage: f64,
}

/// A value that occurs more than once, with its number of occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateValue {
    pub value: Value,
    pub count: u64,
}

/// Outcome of [`QualityProbe::check_value_range`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCheck {
    /// Rows with a non-null value.
    pub total_rows: u64,
    /// Non-null values strictly below `min` or strictly above `max`.
    pub out_of_range_count: u64,
}

/// Runs data-quality probes through an executor.
///
/// # Example
///
/// ```rust,no_run
/// use quality_probe::prelude::*;
///
/// # async fn example(executor: &QueryExecutor) -> quality_probe::error::Result<()> {
/// let probe = QualityProbe::new(executor);
/// let users = TableRef::new("users");
///
/// let nulls = probe.check_nulls(&users, "email").await?;
/// println!("{}% of emails are missing", nulls.null_percentage);
///
/// for dup in probe.check_duplicates(&users, "email").await? {
///     println!("{} appears {} times", dup.value, dup.count);
/// }
///
/// let range = probe.check_value_range(&users, "salary", 50000.0, 100000.0).await?;
/// println!("{} of {} salaries out of range", range.out_of_range_count, range.total_rows);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QualityProbe<'a> {
    executor: &'a QueryExecutor,
}

impl<'a> QualityProbe<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self { executor }
    }

    /// Counts rows and NULLs in `column`.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn check_nulls(&self, table: &TableRef, column: &str) -> Result<NullCheck> {
        let table = table.resolve(self.executor.config())?;
        let statement = null_check_statement(&table, column)?;
        let record = self.executor.execute_single(&statement, "check_nulls").await?;

        let total_rows = record.count("total_rows")?;
        let null_count = record.count("null_count")?;
        Ok(NullCheck {
            total_rows,
            null_count,
            null_percentage: rounded_percentage(null_count, total_rows),
        })
    }

    /// Lists every value of `column` that appears more than once.
    ///
    /// NULL is grouped like any other value, so several NULLs show up as one
    /// duplicate entry with [`Value::Null`].
    #[instrument(skip(self), fields(table = %table))]
    pub async fn check_duplicates(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<Vec<DuplicateValue>> {
        let table = table.resolve(self.executor.config())?;
        let statement = duplicates_statement(&table, column)?;

        self.executor
            .execute_statement(&statement)
            .await?
            .into_iter()
            .map(|record| {
                let count = record.count("count")?;
                let value = record
                    .into_values()
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                Ok(DuplicateValue { value, count })
            })
            .collect()
    }

    /// Counts non-null values of `column` outside the inclusive `[min, max]`.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn check_value_range(
        &self,
        table: &TableRef,
        column: &str,
        min: f64,
        max: f64,
    ) -> Result<RangeCheck> {
        InputValidator::validate_range(min, max)?;
        let table = table.resolve(self.executor.config())?;
        let statement = range_statement(self.executor.dialect()?, &table, column, min, max)?;
        let record = self
            .executor
            .execute_single(&statement, "check_value_range")
            .await?;

        Ok(RangeCheck {
            total_rows: record.count("total_rows")?,
            out_of_range_count: record.count("out_of_range_count")?,
        })
    }
}

/// `part * 100 / total` rounded to two decimals, or 0 when `total` is 0.
pub(crate) fn rounded_percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / total as f64)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn null_check_statement(table: &QualifiedTable, column: &str) -> Result<Statement> {
    let col = SqlSecurity::quote_identifier(column)?;
    Ok(Statement::new(format!(
        "SELECT COUNT(*) AS total_rows, \
         SUM(CASE WHEN {col} IS NULL THEN 1 ELSE 0 END) AS null_count \
         FROM {table}"
    )))
}

fn duplicates_statement(table: &QualifiedTable, column: &str) -> Result<Statement> {
    let col = SqlSecurity::quote_identifier(column)?;
    Ok(Statement::new(format!(
        "SELECT {col}, COUNT(*) AS \"count\" \
         FROM {table} \
         GROUP BY {col} \
         HAVING COUNT(*) > 1 \
         ORDER BY \"count\" DESC"
    )))
}

fn range_statement(
    dialect: Dialect,
    table: &QualifiedTable,
    column: &str,
    min: f64,
    max: f64,
) -> Result<Statement> {
    let col = SqlSecurity::quote_identifier(column)?;
    let mut builder = StatementBuilder::new(dialect);
    let min = builder.bind(min);
    let max = builder.bind(max);
    Ok(builder.finish(format!(
        "SELECT COUNT(*) AS total_rows, \
         SUM(CASE WHEN CAST({col} AS DOUBLE) < {min} OR CAST({col} AS DOUBLE) > {max} THEN 1 ELSE 0 END) AS out_of_range_count \
         FROM {table} \
         WHERE {col} IS NOT NULL"
    )))
}
