//! Metadata browsing and connection lifecycle against DataFusion.

use quality_probe::prelude::*;
use quality_probe::test_fixtures::{connected_executor, create_users_context};

#[tokio::test]
async fn test_ping() {
    let ctx = create_users_context(&ConnectionConfig::default()).unwrap();
    let executor = connected_executor(ctx).await.unwrap();
    CatalogBrowser::new(&executor).ping().await.unwrap();
}

#[tokio::test]
async fn test_lists_configured_catalog_schema_and_tables() {
    let ctx = create_users_context(&ConnectionConfig::default()).unwrap();
    let executor = connected_executor(ctx).await.unwrap();
    let browser = CatalogBrowser::new(&executor);

    let catalogs = browser.list_catalogs().await.unwrap();
    assert!(catalogs.contains(&"mysql".to_string()), "{catalogs:?}");

    let schemas = browser.list_schemas(None).await.unwrap();
    assert!(schemas.contains(&"test_db".to_string()), "{schemas:?}");

    let tables = browser.list_tables(None, None).await.unwrap();
    assert_eq!(tables, ["users"]);

    let none = browser
        .list_tables(Some("mysql"), Some("no_such_schema"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_describe_table_keeps_declaration_order() {
    let ctx = create_users_context(&ConnectionConfig::default()).unwrap();
    let executor = connected_executor(ctx).await.unwrap();
    let columns = CatalogBrowser::new(&executor)
        .describe_table(&TableRef::new("users"))
        .await
        .unwrap();

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "email", "department", "salary"]);
    assert!(columns.iter().all(|c| !c.data_type.is_empty()));
}

#[tokio::test]
async fn test_describe_missing_table_is_empty_result() {
    let ctx = create_users_context(&ConnectionConfig::default()).unwrap();
    let executor = connected_executor(ctx).await.unwrap();
    let err = CatalogBrowser::new(&executor)
        .describe_table(&TableRef::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResult);
}

#[tokio::test]
async fn test_connect_to_unknown_catalog_fails() {
    let ctx = create_users_context(&ConnectionConfig::default()).unwrap();
    let connector = DataFusionConnector::new(ctx);
    let config = ConnectionConfig::builder().catalog("hive").build().unwrap();

    let err = QueryExecutor::connect(&connector, config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn test_explicit_lifecycle() {
    let ctx = create_users_context(&ConnectionConfig::default()).unwrap();
    let connector = DataFusionConnector::new(ctx);
    let mut executor = QueryExecutor::new(ConnectionConfig::default());

    let err = CatalogBrowser::new(&executor).ping().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);

    executor.connect_with(&connector).await.unwrap();
    assert_eq!(executor.dialect().unwrap(), Dialect::DataFusion);
    CatalogBrowser::new(&executor).ping().await.unwrap();

    executor.close().await.unwrap();
    assert!(!executor.is_connected());
    assert_eq!(
        executor.execute("SELECT 1").await.unwrap_err().kind(),
        ErrorKind::Connection
    );
}
