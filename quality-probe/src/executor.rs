//! Query execution over an explicit connection handle.
//!
//! [`QueryExecutor`] owns the connection state. It is either
//! [`ConnectionState::Disconnected`] or [`ConnectionState::Connected`]; there
//! is no hidden connect-on-first-use. Each call runs exactly one statement,
//! waits for the whole result, and hands back either every record or an
//! error, never a partial result. Nothing is retried.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::ConnectionConfig;
use crate::connection::{Connection, Connector, ResultSet};
use crate::core::{Dialect, Record, Statement};
use crate::error::{ProbeError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::{log_query, log_result};

/// Whether the executor currently holds a connection.
pub enum ConnectionState {
    Disconnected,
    Connected(Box<dyn Connection>),
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected(conn) => write!(f, "Connected({})", conn.dialect()),
        }
    }
}

/// Runs SQL through a connection and returns normalized records.
///
/// # Example
///
/// ```rust,no_run
/// use quality_probe::prelude::*;
///
/// # async fn example() -> quality_probe::error::Result<()> {
/// let config = ConnectionConfig::default();
/// let connector = DataFusionConnector::new(DataFusionConnector::session_context(&config));
/// let mut executor = QueryExecutor::connect(&connector, config).await?;
///
/// let rows = executor.execute("SELECT 1 AS test").await?;
/// assert_eq!(rows[0].get("test"), Some(&Value::Int(1)));
///
/// executor.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueryExecutor {
    config: ConnectionConfig,
    state: ConnectionState,
    log: LogConfig,
}

impl QueryExecutor {
    /// Creates a disconnected executor.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
            log: LogConfig::default(),
        }
    }

    /// Creates an executor around an already open connection.
    pub fn with_connection(config: ConnectionConfig, connection: Box<dyn Connection>) -> Self {
        Self {
            config,
            state: ConnectionState::Connected(connection),
            log: LogConfig::default(),
        }
    }

    /// Opens a connection and returns a connected executor.
    pub async fn connect(connector: &dyn Connector, config: ConnectionConfig) -> Result<Self> {
        let mut executor = Self::new(config);
        executor.connect_with(connector).await?;
        Ok(executor)
    }

    /// Replaces the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Connects if currently disconnected. A connected executor is left as is.
    #[instrument(skip(self, connector), fields(endpoint = %self.config.endpoint()))]
    pub async fn connect_with(&mut self, connector: &dyn Connector) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let connection = connector.connect(&self.config).await?;
        debug!(dialect = %connection.dialect(), "Connected");
        self.state = ConnectionState::Connected(connection);
        Ok(())
    }

    /// Closes the connection. The executor is disconnected afterwards even if
    /// closing reported an error.
    pub async fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Connected(connection) => {
                debug!("Closing connection");
                connection.close().await
            }
            ConnectionState::Disconnected => Ok(()),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Dialect of the open connection.
    pub fn dialect(&self) -> Result<Dialect> {
        Ok(self.connection()?.dialect())
    }

    fn connection(&self) -> Result<&dyn Connection> {
        match &self.state {
            ConnectionState::Connected(connection) => Ok(connection.as_ref()),
            ConnectionState::Disconnected => Err(ProbeError::connection(format!(
                "not connected to {}",
                self.config.endpoint()
            ))),
        }
    }

    /// Runs a parameterless SQL statement.
    pub async fn execute(&self, query: &str) -> Result<Vec<Record>> {
        self.execute_statement(&Statement::new(query)).await
    }

    /// Runs a statement and converts the whole result set into records.
    #[instrument(skip(self, statement), fields(params = statement.params().len()))]
    pub async fn execute_statement(&self, statement: &Statement) -> Result<Vec<Record>> {
        let connection = self.connection()?;

        log_query!(
            self.log,
            sql = %truncate_field(statement.sql(), self.log.max_field_length),
            "Executing statement"
        );

        let result = connection.execute(statement).await?;
        let records = into_records(result)?;

        log_result!(self.log, rows = records.len(), "Statement completed");
        Ok(records)
    }

    /// Runs a statement that must produce at least one row and returns the first.
    pub(crate) async fn execute_single(
        &self,
        statement: &Statement,
        operation: &str,
    ) -> Result<Record> {
        self.execute_statement(statement)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::empty_result(operation))
    }
}

fn into_records(result: ResultSet) -> Result<Vec<Record>> {
    let mut seen = HashSet::with_capacity(result.columns.len());
    for column in &result.columns {
        if !seen.insert(column.name.as_str()) {
            return Err(ProbeError::execution(format!(
                "result set repeats column name '{}'",
                column.name
            )));
        }
    }

    let columns: Arc<[String]> = result.columns.into_iter().map(|c| c.name).collect();
    result
        .rows
        .into_iter()
        .map(|row| Record::new(Arc::clone(&columns), row))
        .collect()
}
