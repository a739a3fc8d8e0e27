//! Table references and their fully-qualified resolution.

use std::fmt;
use std::str::FromStr;

use crate::config::ConnectionConfig;
use crate::error::{ProbeError, Result};
use crate::security::SqlSecurity;

/// A possibly partial reference to a table.
///
/// Missing catalog and schema are filled from the [`ConnectionConfig`] when
/// the reference is resolved at query-build time.
///
/// ```rust
/// use quality_probe::core::TableRef;
/// use quality_probe::config::ConnectionConfig;
///
/// let config = ConnectionConfig::default();
/// let table = TableRef::new("users").resolve(&config).unwrap();
/// assert_eq!(table.to_string(), "\"mysql\".\"test_db\".\"users\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    catalog: Option<String>,
    schema: Option<String>,
    table: String,
}

impl TableRef {
    /// References `table` in the default catalog and schema.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            table: table.into(),
        }
    }

    /// Overrides the catalog.
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Overrides the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Parses `table`, `schema.table` or `catalog.schema.table`.
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        match parts.as_slice() {
            [table] => Ok(Self::new(*table)),
            [schema, table] => Ok(Self::new(*table).with_schema(*schema)),
            [catalog, schema, table] => Ok(Self::new(*table)
                .with_schema(*schema)
                .with_catalog(*catalog)),
            _ => Err(ProbeError::InvalidIdentifier(format!(
                "'{name}' is not a table, schema.table or catalog.schema.table name"
            ))),
        }
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fills in defaults and validates every part.
    pub fn resolve(&self, config: &ConnectionConfig) -> Result<QualifiedTable> {
        let catalog = self.catalog.as_deref().unwrap_or(config.catalog());
        let schema = self.schema.as_deref().unwrap_or(config.schema());
        QualifiedTable::new(catalog, schema, &self.table)
    }
}

impl FromStr for TableRef {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.table)
    }
}

impl From<&str> for TableRef {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

/// A validated `catalog.schema.table` name.
///
/// `Display` renders the quoted three-part form ready for interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedTable {
    catalog: String,
    schema: String,
    table: String,
}

impl QualifiedTable {
    pub fn new(catalog: &str, schema: &str, table: &str) -> Result<Self> {
        SqlSecurity::validate_identifier(catalog)?;
        SqlSecurity::validate_identifier(schema)?;
        SqlSecurity::validate_identifier(table)?;
        Ok(Self {
            catalog: catalog.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\".\"{}\".\"{}\"", self.catalog, self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_come_from_config() {
        let config = ConnectionConfig::builder()
            .catalog("mongodb")
            .schema("analytics")
            .build()
            .unwrap();

        let resolved = TableRef::new("events").resolve(&config).unwrap();
        assert_eq!(resolved.catalog(), "mongodb");
        assert_eq!(resolved.schema(), "analytics");
        assert_eq!(resolved.table(), "events");

        let resolved = TableRef::new("events")
            .with_catalog("mysql")
            .resolve(&config)
            .unwrap();
        assert_eq!(resolved.to_string(), "\"mysql\".\"analytics\".\"events\"");
    }

    #[test]
    fn test_parse() {
        assert_eq!(TableRef::parse("users").unwrap(), TableRef::new("users"));
        assert_eq!(
            TableRef::parse("test_db.users").unwrap(),
            TableRef::new("users").with_schema("test_db")
        );
        let full: TableRef = "mysql.test_db.users".parse().unwrap();
        assert_eq!(full.catalog(), Some("mysql"));
        assert!(TableRef::parse("a.b.c.d").is_err());
    }

    #[test]
    fn test_invalid_parts_fail_on_resolve() {
        let config = ConnectionConfig::default();
        let err = TableRef::new("users; DROP TABLE users")
            .resolve(&config)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);

        let err = TableRef::parse("mysql..users")
            .unwrap()
            .resolve(&config)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    }
}
