//! Prelude for commonly used types and traits in quality-probe.

pub use crate::catalog::{CatalogBrowser, ColumnDescription};
pub use crate::config::ConnectionConfig;
pub use crate::connection::{Connection, Connector, DataFusionConnector, ResultSet};
pub use crate::core::{Dialect, Record, Statement, TableRef, Value};
pub use crate::drift::{
    DriftDetector, DriftReport, DriftSummary, MissingTable, RowCountDrift, SchemaDrift,
    SchemaDriftType, TableDriftType,
};
pub use crate::error::{ErrorKind, ProbeError, Result};
pub use crate::executor::QueryExecutor;
pub use crate::logging::LogConfig;
pub use crate::profiler::{
    NumericProfile, Profiler, TextProfile, ValueFrequency, DEFAULT_DISTRIBUTION_LIMIT,
};
pub use crate::quality::{DuplicateValue, NullCheck, QualityProbe, RangeCheck};
