//! Identifier validation and credential handling.
//!
//! Catalog, schema, table and column names are the only caller-supplied text
//! that ends up inside generated SQL. They are validated here and then
//! double-quoted; everything else goes through bind parameters or typed
//! integer rendering.

use crate::error::{ProbeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum accepted identifier length in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// A secure string that automatically clears its contents when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureString(String);

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the string value. Use carefully and avoid storing the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Convert to a regular string. The SecureString will be zeroized.
    pub fn into_string(mut self) -> String {
        let value = std::mem::take(&mut self.0);
        self.0.zeroize();
        value
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// SQL identifier validation and quoting utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates a single identifier part and returns it double-quoted.
    ///
    /// # Examples
    /// ```rust
    /// use quality_probe::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::quote_identifier("salary").unwrap(), "\"salary\"");
    /// assert!(SqlSecurity::quote_identifier("id; DROP TABLE users--").is_err());
    /// assert!(SqlSecurity::quote_identifier("mysql.test_db").is_err());
    /// ```
    pub fn quote_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        // validated identifiers never contain a double quote
        Ok(format!("\"{identifier}\""))
    }

    /// Validates a single identifier part (no dots) without quoting it.
    ///
    /// Accepted: an ASCII letter or underscore followed by ASCII letters,
    /// digits and underscores, at most [`MAX_IDENTIFIER_LENGTH`] bytes. Single
    /// hyphens may join words (`my-catalog`); `--` never passes.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(ProbeError::InvalidIdentifier(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            return Err(ProbeError::InvalidIdentifier(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.contains('\0') {
            return Err(ProbeError::InvalidIdentifier(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }

        static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
            // This regex is compile-time constant and known to be valid
            #[allow(clippy::expect_used)]
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(-[A-Za-z0-9_]+)*$")
                .expect("Hard-coded regex pattern should be valid")
        });

        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(ProbeError::InvalidIdentifier(format!(
                "'{identifier}' must start with a letter or underscore and contain only letters, digits, underscores and single hyphens"
            )));
        }

        Ok(())
    }

    /// Renders a validated identifier as a single-quoted string literal.
    ///
    /// Used where metadata tables are filtered by name, e.g.
    /// `WHERE table_schema = 'test_db'`.
    pub fn identifier_literal(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        Ok(format!("'{identifier}'"))
    }
}

/// Input validation utilities for operation arguments.
pub struct InputValidator;

impl InputValidator {
    /// Validates that a numeric bound is finite.
    pub fn validate_bound(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(ProbeError::InvalidArgument(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(())
    }

    /// Validates a row limit. Engines take LIMIT as a signed 64-bit integer.
    pub fn validate_limit(limit: usize) -> Result<()> {
        if i64::try_from(limit).is_err() {
            return Err(ProbeError::InvalidArgument(format!(
                "Invalid limit {limit}: must not exceed {}",
                i64::MAX
            )));
        }
        Ok(())
    }

    /// Validates an inclusive `[min, max]` range.
    pub fn validate_range(min: f64, max: f64) -> Result<()> {
        Self::validate_bound(min, "min")?;
        Self::validate_bound(max, "max")?;
        if min > max {
            return Err(ProbeError::InvalidArgument(format!(
                "Invalid range: min ({min}) is greater than max ({max})"
            )));
        }
        Ok(())
    }
}
