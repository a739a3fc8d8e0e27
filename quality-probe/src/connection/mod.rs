//! The SQL-executing connection that everything else is layered on.
//!
//! quality-probe does not speak any wire protocol itself. A [`Connector`]
//! opens a [`Connection`] from a [`ConnectionConfig`], and the connection runs
//! one [`Statement`] at a time, answering with a [`ResultSet`] of ordered
//! column descriptors and ordered row tuples.
//!
//! The in-process DataFusion engine ships with the crate
//! ([`DataFusionConnector`]); other engines plug in by implementing the two
//! traits.

pub mod datafusion_engine;

pub use datafusion_engine::{DataFusionConnection, DataFusionConnector};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;
use crate::core::{Dialect, Statement, Value};
use crate::error::Result;

/// Name and engine type of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Raw answer to a statement, as produced by a connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An open connection to a SQL engine.
#[async_trait]
pub trait Connection: Send + Sync {
    /// SQL spelling the engine expects.
    fn dialect(&self) -> Dialect;

    /// Runs one statement to completion and returns the whole result.
    ///
    /// Engine-side failures (syntax, unknown objects, timeouts) come back as
    /// [`ProbeError::Execution`](crate::error::ProbeError::Execution).
    async fn execute(&self, statement: &Statement) -> Result<ResultSet>;

    /// Releases the connection.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Opens connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a connection, or fails with
    /// [`ProbeError::Connection`](crate::error::ProbeError::Connection).
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>>;
}
