//! Catalog, schema and table metadata lookups.
//!
//! Trino answers `SHOW` and `DESCRIBE` statements; DataFusion exposes the
//! same facts through `information_schema`. Both are read positionally, so
//! the header names each engine picks do not matter.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::{Dialect, QualifiedTable, Record, Statement, TableRef, Value};
use crate::error::{ProbeError, Result};
use crate::executor::QueryExecutor;
use crate::security::SqlSecurity;

/// One column of a described table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    /// Engine-specific type name, e.g. `varchar` or `Int64`.
    pub data_type: String,
}

/// Browses the engine's metadata through an executor.
#[derive(Debug, Clone, Copy)]
pub struct CatalogBrowser<'a> {
    executor: &'a QueryExecutor,
}

impl<'a> CatalogBrowser<'a> {
    pub fn new(executor: &'a QueryExecutor) -> Self {
        Self { executor }
    }

    /// Runs `SELECT 1 AS test` and checks that the engine answered `1`.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<()> {
        let record = self
            .executor
            .execute_single(&Statement::new("SELECT 1 AS test"), "ping")
            .await?;
        match record.require("test")? {
            Value::Int(1) => {
                debug!("Engine reachable");
                Ok(())
            }
            other => Err(ProbeError::normalization(
                "test",
                format!("expected 1, found {other}"),
            )),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_catalogs(&self) -> Result<Vec<String>> {
        let statement = match self.executor.dialect()? {
            Dialect::Trino => Statement::new("SHOW CATALOGS"),
            Dialect::DataFusion => Statement::new(
                "SELECT DISTINCT catalog_name FROM information_schema.schemata \
                 ORDER BY catalog_name",
            ),
        };
        self.names(&statement).await
    }

    /// Schemas of `catalog`, or of the configured catalog when `None`.
    #[instrument(skip(self))]
    pub async fn list_schemas(&self, catalog: Option<&str>) -> Result<Vec<String>> {
        let catalog = catalog.unwrap_or(self.executor.config().catalog());
        let statement = match self.executor.dialect()? {
            Dialect::Trino => Statement::new(format!(
                "SHOW SCHEMAS FROM {}",
                SqlSecurity::quote_identifier(catalog)?
            )),
            Dialect::DataFusion => Statement::new(format!(
                "SELECT schema_name FROM information_schema.schemata \
                 WHERE catalog_name = {} \
                 ORDER BY schema_name",
                SqlSecurity::identifier_literal(catalog)?
            )),
        };
        self.names(&statement).await
    }

    /// Tables of `catalog.schema`, each part defaulting to the configuration.
    #[instrument(skip(self))]
    pub async fn list_tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<String>> {
        let config = self.executor.config();
        let catalog = catalog.unwrap_or(config.catalog());
        let schema = schema.unwrap_or(config.schema());
        let statement = match self.executor.dialect()? {
            Dialect::Trino => Statement::new(format!(
                "SHOW TABLES FROM {}.{}",
                SqlSecurity::quote_identifier(catalog)?,
                SqlSecurity::quote_identifier(schema)?
            )),
            Dialect::DataFusion => Statement::new(format!(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_catalog = {} AND table_schema = {} \
                 ORDER BY table_name",
                SqlSecurity::identifier_literal(catalog)?,
                SqlSecurity::identifier_literal(schema)?
            )),
        };
        self.names(&statement).await
    }

    /// Column names and types in declaration order.
    ///
    /// A table the engine reports no columns for is an
    /// [`ProbeError::EmptyResult`].
    #[instrument(skip(self), fields(table = %table))]
    pub async fn describe_table(&self, table: &TableRef) -> Result<Vec<ColumnDescription>> {
        let table = table.resolve(self.executor.config())?;
        let statement = describe_statement(self.executor.dialect()?, &table)?;

        let columns = self
            .executor
            .execute_statement(&statement)
            .await?
            .iter()
            .map(|record| {
                Ok(ColumnDescription {
                    name: text_at(record, 0)?,
                    data_type: text_at(record, 1)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Err(ProbeError::empty_result("describe_table"));
        }
        Ok(columns)
    }

    async fn names(&self, statement: &Statement) -> Result<Vec<String>> {
        self.executor
            .execute_statement(statement)
            .await?
            .iter()
            .map(|record| text_at(record, 0))
            .collect()
    }
}

fn describe_statement(dialect: Dialect, table: &QualifiedTable) -> Result<Statement> {
    Ok(match dialect {
        Dialect::Trino => Statement::new(format!("DESCRIBE {table}")),
        Dialect::DataFusion => Statement::new(format!(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_catalog = {} AND table_schema = {} AND table_name = {} \
             ORDER BY ordinal_position",
            SqlSecurity::identifier_literal(table.catalog())?,
            SqlSecurity::identifier_literal(table.schema())?,
            SqlSecurity::identifier_literal(table.table())?
        )),
    })
}

fn text_at(record: &Record, idx: usize) -> Result<String> {
    let column = record
        .columns()
        .get(idx)
        .map(String::as_str)
        .unwrap_or("?");
    match record.value_at(idx) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ProbeError::normalization(
            column,
            format!("expected text, found {}", other.type_name()),
        )),
        None => Err(ProbeError::normalization(
            column,
            format!("result has no column at position {idx}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::connection::{ColumnDescriptor, ResultSet};
    use crate::error::ErrorKind;
    use crate::test_utils::RecordingConnection;

    fn single_column(header: &str, names: &[&str]) -> ResultSet {
        ResultSet::new(
            vec![ColumnDescriptor::new(header, "varchar")],
            names.iter().map(|n| vec![Value::from(*n)]).collect(),
        )
    }

    #[tokio::test]
    async fn test_ping() {
        let conn = RecordingConnection::new().respond_with_row(&[("test", Value::Int(1))]);
        let executor = QueryExecutor::with_connection(ConnectionConfig::default(), Box::new(conn));
        CatalogBrowser::new(&executor).ping().await.unwrap();

        let conn = RecordingConnection::new().respond_with_row(&[("test", Value::from("1"))]);
        let executor = QueryExecutor::with_connection(ConnectionConfig::default(), Box::new(conn));
        let err = CatalogBrowser::new(&executor).ping().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Normalization);
    }

    #[tokio::test]
    async fn test_trino_uses_show_statements() {
        let conn = RecordingConnection::new()
            .with_dialect(Dialect::Trino)
            .respond_with(single_column("Catalog", &["mongodb", "mysql", "system"]))
            .respond_with(single_column("Schema", &["information_schema", "test_db"]))
            .respond_with(single_column("Table", &["orders", "users"]));
        let log = conn.log();
        let executor = QueryExecutor::with_connection(ConnectionConfig::default(), Box::new(conn));
        let browser = CatalogBrowser::new(&executor);

        assert_eq!(
            browser.list_catalogs().await.unwrap(),
            ["mongodb", "mysql", "system"]
        );
        assert_eq!(
            browser.list_schemas(None).await.unwrap(),
            ["information_schema", "test_db"]
        );
        assert_eq!(
            browser.list_tables(None, None).await.unwrap(),
            ["orders", "users"]
        );

        let sql: Vec<String> = log
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.sql().to_string())
            .collect();
        assert_eq!(
            sql,
            [
                "SHOW CATALOGS",
                "SHOW SCHEMAS FROM \"mysql\"",
                "SHOW TABLES FROM \"mysql\".\"test_db\"",
            ]
        );
    }

    #[tokio::test]
    async fn test_describe_reads_name_and_type() {
        let conn = RecordingConnection::new()
            .with_dialect(Dialect::Trino)
            .respond_with(ResultSet::new(
                vec![
                    ColumnDescriptor::new("Column", "varchar"),
                    ColumnDescriptor::new("Type", "varchar"),
                    ColumnDescriptor::new("Extra", "varchar"),
                    ColumnDescriptor::new("Comment", "varchar"),
                ],
                vec![
                    vec![
                        Value::from("id"),
                        Value::from("integer"),
                        Value::from(""),
                        Value::from(""),
                    ],
                    vec![
                        Value::from("email"),
                        Value::from("varchar(255)"),
                        Value::from(""),
                        Value::from(""),
                    ],
                ],
            ));
        let log = conn.log();
        let executor = QueryExecutor::with_connection(ConnectionConfig::default(), Box::new(conn));

        let columns = CatalogBrowser::new(&executor)
            .describe_table(&TableRef::new("users"))
            .await
            .unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].name, "email");
        assert_eq!(columns[1].data_type, "varchar(255)");
        assert_eq!(
            log.lock().unwrap()[0].sql(),
            "DESCRIBE \"mysql\".\"test_db\".\"users\""
        );
    }

    #[tokio::test]
    async fn test_describe_unknown_table_is_empty_result() {
        let executor = QueryExecutor::with_connection(
            ConnectionConfig::default(),
            Box::new(RecordingConnection::new()),
        );
        let err = CatalogBrowser::new(&executor)
            .describe_table(&TableRef::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[tokio::test]
    async fn test_invalid_catalog_is_rejected_locally() {
        let conn = RecordingConnection::new();
        let log = conn.log();
        let executor = QueryExecutor::with_connection(ConnectionConfig::default(), Box::new(conn));

        let err = CatalogBrowser::new(&executor)
            .list_schemas(Some("mysql' OR '1'='1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
        assert!(log.lock().unwrap().is_empty());
    }
}
