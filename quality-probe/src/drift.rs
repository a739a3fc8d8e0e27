//! Drift between two catalogs that should hold the same schema.
//!
//! A source catalog (e.g. the operational database) is compared with a
//! target catalog (e.g. a replica or a staging copy) schema by schema:
//! columns that differ in presence, type or nullability, tables that exist on
//! one side only, and tables whose row counts disagree.
//!
//! Column metadata comes from `information_schema.columns` in both dialects.
//! Trino scopes that view per catalog, DataFusion shares one view across all
//! catalogs and filters on `table_catalog`.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::core::{Dialect, QualifiedTable, Record, Statement};
use crate::error::{ErrorKind, ProbeError, Result};
use crate::executor::QueryExecutor;
use crate::quality::round2;
use crate::security::SqlSecurity;

/// How a column differs between source and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaDriftType {
    MissingInSource,
    MissingInTarget,
    TypeMismatch,
    NullabilityMismatch,
}

impl SchemaDriftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaDriftType::MissingInSource => "missing_in_source",
            SchemaDriftType::MissingInTarget => "missing_in_target",
            SchemaDriftType::TypeMismatch => "type_mismatch",
            SchemaDriftType::NullabilityMismatch => "nullability_mismatch",
        }
    }

    /// Missing columns and changed types break readers; nullability does not.
    pub fn is_critical(&self) -> bool {
        !matches!(self, SchemaDriftType::NullabilityMismatch)
    }

    fn parse(label: &str) -> Option<Self> {
        match label {
            "missing_in_source" => Some(SchemaDriftType::MissingInSource),
            "missing_in_target" => Some(SchemaDriftType::MissingInTarget),
            "type_mismatch" => Some(SchemaDriftType::TypeMismatch),
            "nullability_mismatch" => Some(SchemaDriftType::NullabilityMismatch),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaDriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column that differs between the two catalogs.
///
/// The `source_*` fields are `None` when the column is missing in the source,
/// the `target_*` fields when it is missing in the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDrift {
    pub table: String,
    pub column: String,
    pub source_type: Option<String>,
    pub target_type: Option<String>,
    pub source_nullable: Option<bool>,
    pub target_nullable: Option<bool>,
    pub drift_type: SchemaDriftType,
}

/// Which side a table is missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableDriftType {
    /// Present in the source only.
    MissingInTarget,
    /// Present in the target only.
    ExtraInTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTable {
    pub table: String,
    pub drift_type: TableDriftType,
}

/// A table whose row count differs between the two catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCountDrift {
    pub table: String,
    pub source_count: u64,
    pub target_count: u64,
    /// `source_count - target_count`; negative when the target has more rows.
    pub difference: i64,
    /// `difference * 100 / source_count` rounded to two decimals; 0 when the
    /// source is empty.
    pub drift_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriftSummary {
    pub total_drifts: usize,
    /// Schema drifts other than nullability mismatches.
    pub critical_drifts: usize,
    pub tables_missing: usize,
    pub columns_different: usize,
    pub row_count_drifts: usize,
}

/// Everything [`DriftDetector::report`] found for one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub target: String,
    pub schema: String,
    pub missing_tables: Vec<MissingTable>,
    pub schema_drifts: Vec<SchemaDrift>,
    pub row_count_drifts: Vec<RowCountDrift>,
    pub summary: DriftSummary,
}

impl DriftReport {
    pub fn has_drift(&self) -> bool {
        self.summary.total_drifts > 0
    }
}

/// Compares two catalogs through one executor.
///
/// # Example
///
/// ```rust,no_run
/// use quality_probe::prelude::*;
///
/// # async fn example(executor: &QueryExecutor) -> quality_probe::error::Result<()> {
/// let report = DriftDetector::new(executor)
///     .report("mysql", "staging", "test_db")
///     .await?;
/// for drift in &report.schema_drifts {
///     println!("{}.{}: {}", drift.table, drift.column, drift.drift_type);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DriftDetector<'a> {
    executor: &'a QueryExecutor,
}

impl<'a> DriftDetector<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self { executor }
    }

    /// Columns of `schema` that differ between `source` and `target`, ordered
    /// by table then column.
    #[instrument(skip(self))]
    pub async fn schema_drift(
        &self,
        source: &str,
        target: &str,
        schema: &str,
    ) -> Result<Vec<SchemaDrift>> {
        let statement = schema_drift_statement(self.executor.dialect()?, source, target, schema)?;
        let drifts = self
            .executor
            .execute_statement(&statement)
            .await?
            .iter()
            .map(read_schema_drift)
            .collect::<Result<Vec<_>>>()?;
        debug!(drifts = drifts.len(), "Compared column metadata");
        Ok(drifts)
    }

    /// Tables of `schema` that exist in only one of the two catalogs, the
    /// source-only ones first.
    #[instrument(skip(self))]
    pub async fn missing_tables(
        &self,
        source: &str,
        target: &str,
        schema: &str,
    ) -> Result<Vec<MissingTable>> {
        let source_tables = self.base_tables(source, schema).await?;
        let target_tables = self.base_tables(target, schema).await?;
        Ok(table_differences(&source_tables, &target_tables))
    }

    /// Tables present in both catalogs whose row counts differ.
    ///
    /// A table that cannot be counted, for example because it was dropped in
    /// between or its name cannot be quoted, is logged and skipped.
    #[instrument(skip(self))]
    pub async fn row_count_drift(
        &self,
        source: &str,
        target: &str,
        schema: &str,
    ) -> Result<Vec<RowCountDrift>> {
        let source_tables = self.base_tables(source, schema).await?;
        let target_tables = self.base_tables(target, schema).await?;

        let mut drifts = Vec::new();
        for table in source_tables.intersection(&target_tables) {
            match self.compare_counts(source, target, schema, table).await {
                Ok(Some(drift)) => drifts.push(drift),
                Ok(None) => {}
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::Execution | ErrorKind::InvalidIdentifier
                    ) =>
                {
                    warn!(table = %table, error = %err, "Skipping row count comparison");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(drifts)
    }

    /// Runs all three comparisons and summarizes them.
    #[instrument(skip(self))]
    pub async fn report(&self, source: &str, target: &str, schema: &str) -> Result<DriftReport> {
        let missing_tables = self.missing_tables(source, target, schema).await?;
        let schema_drifts = self.schema_drift(source, target, schema).await?;
        let row_count_drifts = self.row_count_drift(source, target, schema).await?;

        let summary = DriftSummary {
            total_drifts: missing_tables.len() + schema_drifts.len() + row_count_drifts.len(),
            critical_drifts: schema_drifts
                .iter()
                .filter(|d| d.drift_type.is_critical())
                .count(),
            tables_missing: missing_tables.len(),
            columns_different: schema_drifts.len(),
            row_count_drifts: row_count_drifts.len(),
        };

        Ok(DriftReport {
            generated_at: Utc::now(),
            source: source.to_string(),
            target: target.to_string(),
            schema: schema.to_string(),
            missing_tables,
            schema_drifts,
            row_count_drifts,
            summary,
        })
    }

    async fn base_tables(&self, catalog: &str, schema: &str) -> Result<BTreeSet<String>> {
        let statement = base_tables_statement(self.executor.dialect()?, catalog, schema)?;
        self.executor
            .execute_statement(&statement)
            .await?
            .iter()
            .map(|record| required_text(record, "table_name"))
            .collect()
    }

    async fn compare_counts(
        &self,
        source: &str,
        target: &str,
        schema: &str,
        table: &str,
    ) -> Result<Option<RowCountDrift>> {
        let source_table = QualifiedTable::new(source, schema, table)?;
        let target_table = QualifiedTable::new(target, schema, table)?;
        let statement = Statement::new(format!(
            "SELECT s.source_count, t.target_count \
             FROM (SELECT COUNT(*) AS source_count FROM {source_table}) s \
             CROSS JOIN (SELECT COUNT(*) AS target_count FROM {target_table}) t"
        ));
        let record = self
            .executor
            .execute_single(&statement, "row_count_drift")
            .await?;

        let source_count = record.count("source_count")?;
        let target_count = record.count("target_count")?;
        Ok(row_count_drift(table, source_count, target_count))
    }
}

fn row_count_drift(table: &str, source_count: u64, target_count: u64) -> Option<RowCountDrift> {
    if source_count == target_count {
        return None;
    }
    let difference = source_count as i64 - target_count as i64;
    let drift_percentage = if source_count == 0 {
        0.0
    } else {
        round2(difference as f64 * 100.0 / source_count as f64)
    };
    Some(RowCountDrift {
        table: table.to_string(),
        source_count,
        target_count,
        difference,
        drift_percentage,
    })
}

fn table_differences(source: &BTreeSet<String>, target: &BTreeSet<String>) -> Vec<MissingTable> {
    let missing = source.difference(target).map(|table| MissingTable {
        table: table.clone(),
        drift_type: TableDriftType::MissingInTarget,
    });
    let extra = target.difference(source).map(|table| MissingTable {
        table: table.clone(),
        drift_type: TableDriftType::ExtraInTarget,
    });
    missing.chain(extra).collect()
}

/// `information_schema.<view>` for `catalog`, plus the filter selecting
/// `schema` in it.
fn metadata_source(
    dialect: Dialect,
    view: &str,
    catalog: &str,
    schema: &str,
) -> Result<(String, String)> {
    let schema = SqlSecurity::identifier_literal(schema)?;
    Ok(match dialect {
        Dialect::Trino => (
            format!(
                "{}.information_schema.{view}",
                SqlSecurity::quote_identifier(catalog)?
            ),
            format!("table_schema = {schema}"),
        ),
        Dialect::DataFusion => (
            format!("information_schema.{view}"),
            format!(
                "table_catalog = {} AND table_schema = {schema}",
                SqlSecurity::identifier_literal(catalog)?
            ),
        ),
    })
}

fn base_tables_statement(dialect: Dialect, catalog: &str, schema: &str) -> Result<Statement> {
    let (tables, filter) = metadata_source(dialect, "tables", catalog, schema)?;
    Ok(Statement::new(format!(
        "SELECT table_name FROM {tables} \
         WHERE {filter} AND table_type = 'BASE TABLE' \
         ORDER BY table_name"
    )))
}

fn schema_drift_statement(
    dialect: Dialect,
    source: &str,
    target: &str,
    schema: &str,
) -> Result<Statement> {
    let (source_columns, source_filter) = metadata_source(dialect, "columns", source, schema)?;
    let (target_columns, target_filter) = metadata_source(dialect, "columns", target, schema)?;
    let missing_in_source = SchemaDriftType::MissingInSource.as_str();
    let missing_in_target = SchemaDriftType::MissingInTarget.as_str();
    let type_mismatch = SchemaDriftType::TypeMismatch.as_str();
    let nullability_mismatch = SchemaDriftType::NullabilityMismatch.as_str();

    Ok(Statement::new(format!(
        "WITH source_cols AS ( \
             SELECT table_name, column_name, data_type, is_nullable \
             FROM {source_columns} WHERE {source_filter} \
         ), target_cols AS ( \
             SELECT table_name, column_name, data_type, is_nullable \
             FROM {target_columns} WHERE {target_filter} \
         ) \
         SELECT COALESCE(s.table_name, t.table_name) AS table_name, \
                COALESCE(s.column_name, t.column_name) AS column_name, \
                s.data_type AS source_type, \
                t.data_type AS target_type, \
                s.is_nullable AS source_nullable, \
                t.is_nullable AS target_nullable, \
                CASE \
                    WHEN s.column_name IS NULL THEN '{missing_in_source}' \
                    WHEN t.column_name IS NULL THEN '{missing_in_target}' \
                    WHEN s.data_type <> t.data_type THEN '{type_mismatch}' \
                    ELSE '{nullability_mismatch}' \
                END AS drift_type \
         FROM source_cols s \
         FULL OUTER JOIN target_cols t \
             ON s.table_name = t.table_name AND s.column_name = t.column_name \
         WHERE s.column_name IS NULL \
            OR t.column_name IS NULL \
            OR s.data_type <> t.data_type \
            OR s.is_nullable <> t.is_nullable \
         ORDER BY 1, 2"
    )))
}

fn read_schema_drift(record: &Record) -> Result<SchemaDrift> {
    let label = required_text(record, "drift_type")?;
    let drift_type = SchemaDriftType::parse(&label).ok_or_else(|| {
        ProbeError::normalization("drift_type", format!("unknown drift type '{label}'"))
    })?;
    Ok(SchemaDrift {
        table: required_text(record, "table_name")?,
        column: required_text(record, "column_name")?,
        source_type: record.optional_string("source_type")?,
        target_type: record.optional_string("target_type")?,
        source_nullable: nullable_flag(record, "source_nullable")?,
        target_nullable: nullable_flag(record, "target_nullable")?,
        drift_type,
    })
}

fn required_text(record: &Record, column: &str) -> Result<String> {
    record
        .optional_string(column)?
        .ok_or_else(|| ProbeError::normalization(column, "expected text, found NULL"))
}

/// `information_schema` spells nullability `YES` or `NO`.
fn nullable_flag(record: &Record, column: &str) -> Result<Option<bool>> {
    match record.optional_string(column)?.as_deref() {
        None => Ok(None),
        Some(flag) if flag.eq_ignore_ascii_case("YES") => Ok(Some(true)),
        Some(flag) if flag.eq_ignore_ascii_case("NO") => Ok(Some(false)),
        Some(other) => Err(ProbeError::normalization(
            column,
            format!("expected YES or NO, found '{other}'"),
        )),
    }
}
