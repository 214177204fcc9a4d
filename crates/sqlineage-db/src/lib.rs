//! SQLite access for the sqlineage tools
//!
//! This crate handles:
//! - Caching one connection per database path
//! - Running statements and introspecting tables (the [`Catalog`] seam)
//! - CSV import and export
//! - Synthetic sample rows
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlineage_db::{ConnectionManager, DatabaseOperations};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let ops = DatabaseOperations::sqlite(Arc::new(ConnectionManager::default()));
//! let db = Path::new("data/app.db");
//! let tables = ops.connect(db)?;
//! let description = ops.describe_table(db, "users")?;
//! ```

pub mod error;
pub mod connection;
pub mod catalog;
pub mod operations;
pub mod transfer;
pub mod generator;
mod value;

pub use error::{DbError, DbResult};
pub use connection::ConnectionManager;
pub use catalog::{Catalog, QueryOutcome, SqliteCatalog};
pub use operations::DatabaseOperations;
pub use transfer::CsvTransfer;
pub use generator::SampleDataGenerator;
pub use value::quote_ident;
