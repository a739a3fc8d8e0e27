//! Walks the catalogs, schemas and tables visible through a connection and
//! describes each table.
//!
//! ```bash
//! TRINO_CATALOG=warehouse TRINO_SCHEMA=sales cargo run -p quality-probe-demos --example catalog_tour
//! ```

use quality_probe::logging::setup::{init_logging, LoggingConfig};
use quality_probe::prelude::*;
use quality_probe::test_fixtures::{create_users_context, register_int_column};
use tracing::info;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development().with_json_format(true))?;

    let config = ConnectionConfig::from_env()?;
    let ctx = create_users_context(&config)?;
    register_int_column(
        &ctx,
        "orders",
        "amount",
        vec![Some(120), Some(75), None, Some(310)],
    )?;

    let connector = DataFusionConnector::new(ctx);
    let mut executor = QueryExecutor::connect(&connector, config)
        .await?
        .with_log_config(LogConfig::verbose());
    let browser = CatalogBrowser::new(&executor);

    browser.ping().await?;
    info!(dialect = %executor.dialect()?, "Connected");

    for catalog in browser.list_catalogs().await? {
        println!("{catalog}");
        for schema in browser.list_schemas(Some(&catalog)).await? {
            if schema == "information_schema" {
                continue;
            }
            println!("  {schema}");
            for table in browser.list_tables(Some(&catalog), Some(&schema)).await? {
                println!("    {table}");
                let reference = TableRef::new(table.as_str())
                    .with_catalog(catalog.as_str())
                    .with_schema(schema.as_str());
                for column in browser.describe_table(&reference).await? {
                    println!("      {:<12} {}", column.name, column.data_type);
                }
            }
        }
    }

    executor.close().await?;
    Ok(())
}
