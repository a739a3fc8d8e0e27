//! In-process connection backed by an Apache DataFusion `SessionContext`.
//!
//! The caller owns the session and registers tables on it; the connector only
//! checks that the configured default catalog exists and hands out
//! connections that share the session.

use std::time::Duration;

use async_trait::async_trait;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::execution::context::SessionConfig;
use datafusion::prelude::SessionContext;
use datafusion::scalar::ScalarValue;
use tracing::{debug, instrument};

use super::{ColumnDescriptor, Connection, Connector, ResultSet};
use crate::config::ConnectionConfig;
use crate::core::{Dialect, Statement, Value};
use crate::error::{ProbeError, Result};

/// Opens [`DataFusionConnection`]s over a shared session.
///
/// # Example
///
/// ```rust,no_run
/// use quality_probe::config::ConnectionConfig;
/// use quality_probe::connection::DataFusionConnector;
/// use quality_probe::executor::QueryExecutor;
///
/// # async fn example() -> quality_probe::error::Result<()> {
/// let config = ConnectionConfig::default();
/// let ctx = DataFusionConnector::session_context(&config);
/// // ... register tables on ctx ...
/// let connector = DataFusionConnector::new(ctx);
/// let executor = QueryExecutor::connect(&connector, config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DataFusionConnector {
    ctx: SessionContext,
}

impl DataFusionConnector {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    /// Session settings matching `config`: its catalog and schema become the
    /// session defaults (created if missing) and `information_schema` is on.
    pub fn session_config(config: &ConnectionConfig) -> SessionConfig {
        SessionConfig::new()
            .with_information_schema(true)
            .with_default_catalog_and_schema(config.catalog(), config.schema())
            .with_create_default_catalog_and_schema(true)
    }

    /// A fresh session built from [`session_config`](Self::session_config).
    pub fn session_context(config: &ConnectionConfig) -> SessionContext {
        SessionContext::new_with_config(Self::session_config(config))
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }
}

#[async_trait]
impl Connector for DataFusionConnector {
    #[instrument(skip(self, config), fields(catalog = config.catalog(), schema = config.schema()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        config.validate()?;

        if self.ctx.catalog(config.catalog()).is_none() {
            return Err(ProbeError::connection(format!(
                "catalog '{}' is not registered with the session",
                config.catalog()
            )));
        }

        debug!("Opened DataFusion connection");
        Ok(Box::new(DataFusionConnection::new(
            self.ctx.clone(),
            config.timeout(),
        )))
    }
}

/// A connection running statements on a DataFusion session.
pub struct DataFusionConnection {
    ctx: SessionContext,
    timeout: Duration,
}

impl DataFusionConnection {
    pub fn new(ctx: SessionContext, timeout: Duration) -> Self {
        Self { ctx, timeout }
    }

    async fn run(&self, statement: &Statement) -> Result<ResultSet> {
        let mut df = self.ctx.sql(statement.sql()).await?;

        if statement.has_params() {
            let params: Vec<ScalarValue> = statement.params().iter().map(value_to_scalar).collect();
            df = df.with_param_values(params)?;
        }

        let columns: Vec<ColumnDescriptor> = df
            .schema()
            .fields()
            .iter()
            .map(|field| ColumnDescriptor::new(field.name().clone(), field.data_type().to_string()))
            .collect();

        let batches = df.collect().await?;
        let mut rows = Vec::new();
        for batch in &batches {
            rows.extend(batch_rows(batch)?);
        }

        Ok(ResultSet::new(columns, rows))
    }
}

#[async_trait]
impl Connection for DataFusionConnection {
    fn dialect(&self) -> Dialect {
        Dialect::DataFusion
    }

    async fn execute(&self, statement: &Statement) -> Result<ResultSet> {
        match tokio::time::timeout(self.timeout, self.run(statement)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::execution(format!(
                "statement did not finish within {:?}",
                self.timeout
            ))),
        }
    }
}

fn batch_rows(batch: &RecordBatch) -> Result<Vec<Vec<Value>>> {
    let mut rows = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let mut values = Vec::with_capacity(batch.num_columns());
        for array in batch.columns() {
            let scalar = ScalarValue::try_from_array(array.as_ref(), row)?;
            values.push(scalar_to_value(&scalar));
        }
        rows.push(values);
    }
    Ok(rows)
}

fn value_to_scalar(value: &Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Int(v) => ScalarValue::Int64(Some(*v)),
        Value::Float(v) => ScalarValue::Float64(Some(*v)),
        Value::String(s) => ScalarValue::Utf8(Some(s.clone())),
    }
}

/// Maps an engine scalar onto the four [`Value`] kinds.
pub(crate) fn scalar_to_value(scalar: &ScalarValue) -> Value {
    if scalar.is_null() {
        return Value::Null;
    }

    match scalar {
        ScalarValue::Int8(Some(v)) => Value::Int(i64::from(*v)),
        ScalarValue::Int16(Some(v)) => Value::Int(i64::from(*v)),
        ScalarValue::Int32(Some(v)) => Value::Int(i64::from(*v)),
        ScalarValue::Int64(Some(v)) => Value::Int(*v),
        ScalarValue::UInt8(Some(v)) => Value::Int(i64::from(*v)),
        ScalarValue::UInt16(Some(v)) => Value::Int(i64::from(*v)),
        ScalarValue::UInt32(Some(v)) => Value::Int(i64::from(*v)),
        ScalarValue::UInt64(Some(v)) => match i64::try_from(*v) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Float(*v as f64),
        },
        ScalarValue::Float32(Some(v)) => Value::Float(f64::from(*v)),
        ScalarValue::Float64(Some(v)) => Value::Float(*v),
        ScalarValue::Decimal128(Some(v), _, scale) => {
            Value::Float(*v as f64 / 10f64.powi(i32::from(*scale)))
        }
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}
