//! Scripted connections for testing code layered on [`Connection`].
//!
//! [`RecordingConnection`] remembers every statement it receives and answers
//! from a queue of canned result sets. [`FailingConnection`] and
//! [`FailingConnector`] fail every call with a fixed error kind.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::connection::{ColumnDescriptor, Connection, Connector, ResultSet};
use crate::core::{Dialect, Statement, Value};
use crate::error::{ProbeError, Result};

/// Statements seen by a [`RecordingConnection`], shared with the test.
pub type StatementLog = Arc<Mutex<Vec<Statement>>>;

/// A connection that records statements and replays canned answers.
///
/// Once the queue is exhausted every statement gets an empty result set.
pub struct RecordingConnection {
    dialect: Dialect,
    responses: Mutex<VecDeque<ResultSet>>,
    log: StatementLog,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self {
            dialect: Dialect::DataFusion,
            responses: Mutex::new(VecDeque::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Queues the answer to the next unanswered statement.
    pub fn respond_with(self, result: ResultSet) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(result);
        }
        self
    }

    /// Queues a single-row answer built from `(column, value)` pairs.
    pub fn respond_with_row(self, row: &[(&str, Value)]) -> Self {
        let columns = row
            .iter()
            .map(|(name, value)| ColumnDescriptor::new(*name, value.type_name()))
            .collect();
        let values = row.iter().map(|(_, value)| value.clone()).collect();
        self.respond_with(ResultSet::new(columns, vec![values]))
    }

    /// Handle to the recorded statements; stays valid after the connection
    /// is boxed into an executor.
    pub fn log(&self) -> StatementLog {
        Arc::clone(&self.log)
    }
}

impl Default for RecordingConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&self, statement: &Statement) -> Result<ResultSet> {
        self.log
            .lock()
            .map_err(|_| ProbeError::execution("statement log poisoned"))?
            .push(statement.clone());
        let next = self
            .responses
            .lock()
            .map_err(|_| ProbeError::execution("response queue poisoned"))?
            .pop_front();
        Ok(next.unwrap_or_default())
    }
}

/// A connection whose every statement fails.
pub struct FailingConnection {
    message: String,
}

impl FailingConnection {
    /// Fails every statement with an execution error carrying `message`.
    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Connection for FailingConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Trino
    }

    async fn execute(&self, _statement: &Statement) -> Result<ResultSet> {
        Err(ProbeError::execution(self.message.clone()))
    }
}

/// A connector that can never connect.
pub struct FailingConnector;

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        Err(ProbeError::connection(format!(
            "connection refused by {}",
            config.endpoint()
        )))
    }
}
