//! Core types shared by the executor, the probes and the profiler.
//!
//! - [`Value`] and [`Record`]: normalized result rows
//! - [`TableRef`] and [`QualifiedTable`]: table naming and default resolution
//! - [`Statement`], [`StatementBuilder`] and [`Dialect`]: SQL with bind parameters

pub mod record;
pub mod statement;
pub mod table_ref;
pub mod value;

pub use record::Record;
pub use statement::{Dialect, Statement, StatementBuilder};
pub use table_ref::{QualifiedTable, TableRef};
pub use value::Value;
