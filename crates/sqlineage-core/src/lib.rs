//! sqlineage core
//!
//! Domain types shared by the lineage engine, the database layer and the
//! tool dispatcher, plus the `sqlineage.toml` configuration schema.

pub mod lineage;
pub mod schema;
pub mod config;

pub use lineage::{LineageRecord, ColumnRef, lineage_key};
pub use schema::{ColumnInfo, ColumnKind, TableDescription};
pub use config::{Config, ConfigError, DatabaseConfig, CsvConfig, SampleDataConfig, LoggingConfig};
