//! Connect, execute and describe

use crate::catalog::{Catalog, QueryOutcome, SqliteCatalog};
use crate::connection::ConnectionManager;
use crate::error::{DbError, DbResult};
use serde_json::Value as Json;
use sqlineage_core::{ColumnInfo, TableDescription};
use std::path::Path;
use std::sync::Arc;

/// Core database operations over a [`Catalog`]
#[derive(Clone)]
pub struct DatabaseOperations {
    catalog: Arc<dyn Catalog>,
}

impl DatabaseOperations {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Operations over SQLite connections from `connections`
    pub fn sqlite(connections: Arc<ConnectionManager>) -> Self {
        Self::new(Arc::new(SqliteCatalog::new(connections)))
    }

    /// Open (or reuse) a connection and list the tables it holds
    pub fn connect(&self, db_path: &Path) -> DbResult<Vec<String>> {
        let tables = self.catalog.list_tables(db_path)?;
        tracing::info!(
            path = %db_path.display(),
            catalog = self.catalog.name(),
            tables = tables.len(),
            "connected"
        );
        Ok(tables)
    }

    /// Run one statement; `None` and an empty slice both mean no parameters
    pub fn execute(&self, db_path: &Path, query: &str, params: Option<&[Json]>) -> DbResult<QueryOutcome> {
        self.catalog.run(db_path, query, params.unwrap_or_default())
    }

    /// Columns and row count of a table
    pub fn describe_table(&self, db_path: &Path, table: &str) -> DbResult<TableDescription> {
        let columns = self.catalog.table_columns(db_path, table)?;
        if columns.is_empty() {
            return Err(DbError::TableNotFound(table.to_string()));
        }

        let row_count = self.catalog.row_count(db_path, table)?;

        Ok(TableDescription {
            name: table.to_string(),
            row_count,
            columns,
        })
    }

    pub fn list_tables(&self, db_path: &Path) -> DbResult<Vec<String>> {
        self.catalog.list_tables(db_path)
    }

    pub fn table_columns(&self, db_path: &Path, table: &str) -> DbResult<Vec<ColumnInfo>> {
        self.catalog.table_columns(db_path, table)
    }
}
