//! DataFusion sessions pre-loaded with small tables for tests and demos.
//!
//! All tables are registered under the default catalog and schema of the
//! given [`ConnectionConfig`], so `TableRef::new("users")` finds them.

use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::catalog::{CatalogProvider, MemoryCatalogProvider, MemorySchemaProvider};
use datafusion::prelude::SessionContext;

use crate::config::ConnectionConfig;
use crate::connection::DataFusionConnector;
use crate::error::Result;
use crate::executor::QueryExecutor;

/// The ten-row `users` table: `id, name, email, department, salary`.
///
/// - `email` has one NULL and one duplicated address (`bob@example.com`)
/// - `salary` has one NULL; three of the nine known salaries fall outside
///   `[50000, 100000]`
/// - `department` splits 4 Engineering / 3 Sales / 2 Marketing / 1 HR
pub fn users_batch() -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("email", DataType::Utf8, true),
        Field::new("department", DataType::Utf8, true),
        Field::new("salary", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from((1..=10).collect::<Vec<i64>>())),
            Arc::new(StringArray::from(vec![
                "Alice Johnson",
                "Bob Smith",
                "Carol White",
                "David Brown",
                "Eve Davis",
                "Frank Miller",
                "Grace Lee",
                "Henry Wilson",
                "Ivy Chen",
                "Jack Taylor",
            ])),
            Arc::new(StringArray::from(vec![
                Some("alice@example.com"),
                Some("bob@example.com"),
                Some("carol@example.com"),
                None,
                Some("eve@example.com"),
                Some("bob@example.com"),
                Some("grace@example.com"),
                Some("henry@example.com"),
                Some("ivy@example.com"),
                Some("jack@example.com"),
            ])),
            Arc::new(StringArray::from(vec![
                "Engineering",
                "Marketing",
                "Engineering",
                "Sales",
                "Engineering",
                "Sales",
                "Marketing",
                "Engineering",
                "HR",
                "Sales",
            ])),
            Arc::new(Int64Array::from(vec![
                Some(95000),
                Some(62000),
                Some(105000),
                Some(48000),
                Some(88000),
                Some(51000),
                None,
                Some(120000),
                Some(57000),
                Some(73000),
            ])),
        ],
    )?;
    Ok(batch)
}

/// A session for `config` with the `users` table registered.
pub fn create_users_context(config: &ConnectionConfig) -> Result<SessionContext> {
    let ctx = DataFusionConnector::session_context(config);
    ctx.register_batch("users", users_batch()?)?;
    Ok(ctx)
}

/// A session for `config` with no tables.
pub fn create_empty_context(config: &ConnectionConfig) -> SessionContext {
    DataFusionConnector::session_context(config)
}

/// Connects an executor to `ctx` using [`ConnectionConfig::default`].
pub async fn connected_executor(ctx: SessionContext) -> Result<QueryExecutor> {
    let connector = DataFusionConnector::new(ctx);
    QueryExecutor::connect(&connector, ConnectionConfig::default()).await
}

/// Adds an empty in-memory `catalog` holding one empty `schema`.
///
/// Tables go in with a qualified name, e.g.
/// `ctx.register_batch("staging.test_db.users", batch)`.
pub fn register_catalog(ctx: &SessionContext, catalog: &str, schema: &str) -> Result<()> {
    let provider = MemoryCatalogProvider::new();
    provider.register_schema(schema, Arc::new(MemorySchemaProvider::new()))?;
    ctx.register_catalog(catalog, Arc::new(provider));
    Ok(())
}

/// Registers a one-column BIGINT table.
pub fn register_int_column(
    ctx: &SessionContext,
    table: &str,
    column: &str,
    values: Vec<Option<i64>>,
) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![Field::new(column, DataType::Int64, true)]));
    let batch = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))])?;
    ctx.register_batch(table, batch)?;
    Ok(())
}

/// Registers a one-column VARCHAR table.
pub fn register_text_column(
    ctx: &SessionContext,
    table: &str,
    column: &str,
    values: Vec<Option<&str>>,
) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![Field::new(column, DataType::Utf8, true)]));
    let batch = RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values))])?;
    ctx.register_batch(table, batch)?;
    Ok(())
}
