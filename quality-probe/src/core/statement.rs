//! SQL statements with bind parameters, and the dialect knobs used to render them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Value;

/// SQL spelling differences between the engines a connection can front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Trino / Presto: `?` placeholders, `approx_percentile`, `SHOW` statements.
    Trino,
    /// Apache DataFusion: `$n` placeholders, `approx_median`, `information_schema`.
    DataFusion,
}

impl Dialect {
    /// Placeholder for the bind parameter at 1-based `position`.
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            Dialect::Trino => "?".to_string(),
            Dialect::DataFusion => format!("${position}"),
        }
    }

    /// Approximate 50th percentile of `expr`, which must be a DOUBLE.
    pub fn approx_median(&self, expr: &str) -> String {
        match self {
            Dialect::Trino => format!("APPROX_PERCENTILE({expr}, 0.5)"),
            Dialect::DataFusion => format!("APPROX_MEDIAN({expr})"),
        }
    }

    /// Character length of a string expression.
    pub fn char_length(&self, expr: &str) -> String {
        format!("LENGTH({expr})")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Trino => "trino",
            Dialect::DataFusion => "datafusion",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete SQL statement plus its ordered bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// A statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Collects bind parameters while a statement's text is being assembled.
///
/// ```rust
/// use quality_probe::core::{Dialect, StatementBuilder, Value};
///
/// let mut builder = StatementBuilder::new(Dialect::DataFusion);
/// let min = builder.bind(10.0);
/// let stmt = builder.finish(format!("SELECT COUNT(*) FROM t WHERE x < {min}"));
/// assert_eq!(stmt.sql(), "SELECT COUNT(*) FROM t WHERE x < $1");
/// assert_eq!(stmt.params(), [Value::Float(10.0)]);
/// ```
#[derive(Debug)]
pub struct StatementBuilder {
    dialect: Dialect,
    params: Vec<Value>,
}

impl StatementBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Registers a parameter and returns the placeholder to splice into the SQL.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        self.dialect.placeholder(self.params.len())
    }

    pub fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_per_dialect() {
        let mut trino = StatementBuilder::new(Dialect::Trino);
        assert_eq!(trino.bind(1), "?");
        assert_eq!(trino.bind(2), "?");

        let mut datafusion = StatementBuilder::new(Dialect::DataFusion);
        assert_eq!(datafusion.bind(1), "$1");
        assert_eq!(datafusion.bind(2), "$2");
        let stmt = datafusion.finish("SELECT $1, $2".to_string());
        assert_eq!(stmt.params(), [Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_approx_median_spelling() {
        assert_eq!(
            Dialect::Trino.approx_median("CAST(\"salary\" AS DOUBLE)"),
            "APPROX_PERCENTILE(CAST(\"salary\" AS DOUBLE), 0.5)"
        );
        assert_eq!(
            Dialect::DataFusion.approx_median("x"),
            "APPROX_MEDIAN(x)"
        );
    }

    #[test]
    fn test_plain_statement() {
        let stmt = Statement::from("SELECT 1 AS test");
        assert!(!stmt.has_params());
        assert_eq!(stmt.to_string(), "SELECT 1 AS test");
    }
}
