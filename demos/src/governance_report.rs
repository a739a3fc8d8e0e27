//! Runs every quality probe and profile against a sample `users` table and
//! prints a small data-governance report.
//!
//! ```bash
//! cargo run -p quality-probe-demos --example governance_report
//! RUST_LOG=quality_probe=debug cargo run -p quality-probe-demos --example governance_report
//! ```

use quality_probe::logging::setup::{init_logging, LoggingConfig};
use quality_probe::prelude::*;
use quality_probe::test_fixtures::{create_users_context, register_text_column};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let config = ConnectionConfig::from_env()?;
    let ctx = create_users_context(&config)?;
    register_text_column(
        &ctx,
        "cities",
        "city",
        vec![Some("Lisbon"), Some("Oslo"), None, Some("Zürich"), Some("Oslo")],
    )?;

    let connector = DataFusionConnector::new(ctx);
    let mut executor = QueryExecutor::connect(&connector, config).await?;
    let users = TableRef::new("users");

    println!("Data quality");
    println!("============");
    let probe = QualityProbe::new(&executor);

    let nulls = probe.check_nulls(&users, "email").await?;
    println!(
        "email nulls: {} of {} rows ({}%)",
        nulls.null_count, nulls.total_rows, nulls.null_percentage
    );

    let duplicates = probe.check_duplicates(&users, "email").await?;
    if duplicates.is_empty() {
        println!("email duplicates: none");
    }
    for dup in &duplicates {
        println!("email duplicate: {} x{}", dup.value, dup.count);
    }

    let range = probe
        .check_value_range(&users, "salary", 50000.0, 100000.0)
        .await?;
    println!(
        "salary outside [50000, 100000]: {} of {} rows",
        range.out_of_range_count, range.total_rows
    );

    println!();
    println!("Profiles");
    println!("========");
    let profiler = Profiler::new(&executor);

    let salary = profiler.profile_numeric(&users, "salary").await?;
    println!("salary: {}", serde_json::to_string_pretty(&salary)?);

    let cities = profiler
        .profile_text(&TableRef::new("cities"), "city")
        .await?;
    println!("city: {}", serde_json::to_string_pretty(&cities)?);

    println!("department distribution:");
    for row in profiler.distribution(&users, "department", 3).await? {
        println!("  {:<12} {:>3} ({}%)", row.value, row.frequency, row.percentage);
    }

    // Failures come back as values, never as panics.
    match probe.check_nulls(&TableRef::new("orders"), "id").await {
        Ok(result) => println!("orders: {result:?}"),
        Err(err) => println!("orders: {:?} error: {err}", err.kind()),
    }

    executor.close().await?;
    Ok(())
}
