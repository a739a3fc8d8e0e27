//! # quality-probe - SQL data-quality checks and column profiling
//!
//! quality-probe turns a table reference, a column name and an intent (null
//! check, duplicate check, range check, numeric/text profile, value
//! distribution) into a SQL statement, runs it through a connection to a
//! query engine, and normalizes the answer into a small typed result.
//!
//! The engine itself is external. Anything implementing [`connection::Connector`]
//! can be plugged in; an in-process Apache DataFusion connector ships with the
//! crate and Trino-style engines are covered by [`core::Dialect::Trino`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quality_probe::prelude::*;
//!
//! # async fn example() -> quality_probe::error::Result<()> {
//! let config = ConnectionConfig::from_env()?;
//! let ctx = DataFusionConnector::session_context(&config);
//! // ... register tables on ctx ...
//! let connector = DataFusionConnector::new(ctx);
//! let mut executor = QueryExecutor::connect(&connector, config).await?;
//!
//! let users = TableRef::new("users");
//! let nulls = QualityProbe::new(&executor).check_nulls(&users, "email").await?;
//! println!("email: {} of {} missing ({}%)", nulls.null_count, nulls.total_rows, nulls.null_percentage);
//!
//! for row in Profiler::new(&executor).distribution(&users, "department", 5).await? {
//!     println!("{}: {} ({}%)", row.value, row.frequency, row.percentage);
//! }
//!
//! executor.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **`executor`**: [`executor::QueryExecutor`], explicit connection state and
//!   record normalization
//! - **`quality`**: null, duplicate and range probes
//! - **`profiler`**: numeric and text summaries, value distributions
//! - **`catalog`**: catalog/schema/table listing and table descriptions
//! - **`drift`**: schema and row-count drift between two catalogs
//! - **`connection`**: the connector traits and the DataFusion implementation
//! - **`core`**: values, records, statements and table references
//! - **`security`**: identifier validation and secret handling
//!
//! Every identifier is validated and quoted before it reaches SQL text; values
//! such as range bounds travel as bind parameters.

pub mod catalog;
pub mod config;
pub mod connection;
pub mod core;
pub mod drift;
pub mod error;
pub mod executor;
pub mod logging;
pub mod prelude;
pub mod profiler;
pub mod quality;
pub mod security;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
