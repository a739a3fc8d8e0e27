//! Connection configuration.
//!
//! A [`ConnectionConfig`] describes where the query engine lives and which
//! catalog and schema unqualified table names resolve against. It is built
//! once, through [`ConnectionConfig::builder`] or [`ConnectionConfig::from_env`],
//! and never mutated afterwards.

use std::time::Duration;

use crate::error::{ProbeError, Result};
use crate::security::{SecureString, SqlSecurity};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_USER: &str = "trino";
pub const DEFAULT_CATALOG: &str = "mysql";
pub const DEFAULT_SCHEMA: &str = "test_db";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names read by [`ConnectionConfig::from_env`].
pub mod env {
    pub const HOST: &str = "TRINO_HOST";
    pub const PORT: &str = "TRINO_PORT";
    pub const USER: &str = "TRINO_USER";
    pub const PASSWORD: &str = "TRINO_PASSWORD";
    pub const CATALOG: &str = "TRINO_CATALOG";
    pub const SCHEMA: &str = "TRINO_SCHEMA";
    pub const TIMEOUT: &str = "TRINO_TIMEOUT";
}

/// Where and as whom to connect, plus the default namespace.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    user: String,
    password: Option<SecureString>,
    catalog: String,
    schema: String,
    timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: None,
            catalog: DEFAULT_CATALOG.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Creates a builder seeded with the defaults.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// Reads the `TRINO_*` environment variables, falling back to defaults
    /// for any that are unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(host) = lookup(env::HOST) {
            builder = builder.host(host);
        }
        if let Some(port) = lookup(env::PORT) {
            let port = port.trim().parse::<u16>().map_err(|e| {
                ProbeError::Configuration(format!("{} must be a port number: {e}", env::PORT))
            })?;
            builder = builder.port(port);
        }
        if let Some(user) = lookup(env::USER) {
            builder = builder.user(user);
        }
        if let Some(password) = lookup(env::PASSWORD) {
            builder = builder.password(password);
        }
        if let Some(catalog) = lookup(env::CATALOG) {
            builder = builder.catalog(catalog);
        }
        if let Some(schema) = lookup(env::SCHEMA) {
            builder = builder.schema(schema);
        }
        if let Some(timeout) = lookup(env::TIMEOUT) {
            let secs = timeout.trim().parse::<u64>().map_err(|e| {
                ProbeError::Configuration(format!("{} must be whole seconds: {e}", env::TIMEOUT))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> Option<&SecureString> {
        self.password.as_ref()
    }

    /// Default catalog for unqualified table references.
    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    /// Default schema for unqualified table references.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Per-statement timeout handed to the connection.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `host:port`, for log lines and error messages.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks that the configuration can be used to connect.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ProbeError::Configuration("host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ProbeError::Configuration("port cannot be 0".to_string()));
        }
        if self.user.trim().is_empty() {
            return Err(ProbeError::Configuration("user cannot be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ProbeError::Configuration("timeout cannot be zero".to_string()));
        }
        SqlSecurity::validate_identifier(&self.catalog).map_err(|e| {
            ProbeError::Configuration(format!("default catalog is not usable: {e}"))
        })?;
        SqlSecurity::validate_identifier(&self.schema).map_err(|e| {
            ProbeError::Configuration(format!("default schema is not usable: {e}"))
        })?;
        Ok(())
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<SecureString>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.config.catalog = catalog.into();
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.config.schema = schema.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<ConnectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
