//! Catalog trait: statement execution and table introspection

use crate::connection::ConnectionManager;
use crate::error::DbResult;
use crate::value::{json_to_sql, quote_ident, sql_to_json};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use sqlineage_core::ColumnInfo;
use std::path::Path;
use std::sync::Arc;

/// Result of running one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    /// The statement produced result columns
    Rows {
        columns: Vec<String>,
        rows: Vec<Map<String, Json>>,
    },

    /// The statement changed this many rows
    Affected(usize),
}

/// The database operations the tools depend on
pub trait Catalog: Send + Sync {
    /// Get the catalog name (e.g., "SQLite")
    fn name(&self) -> &'static str;

    /// Run a single statement with positional parameters
    fn run(&self, db_path: &Path, statement: &str, params: &[Json]) -> DbResult<QueryOutcome>;

    /// Names of the tables in the database
    fn list_tables(&self, db_path: &Path) -> DbResult<Vec<String>>;

    /// Columns of a table, in declaration order; empty if the table is missing
    fn table_columns(&self, db_path: &Path, table: &str) -> DbResult<Vec<ColumnInfo>>;

    /// Number of rows in a table
    fn row_count(&self, db_path: &Path, table: &str) -> DbResult<u64>;
}

/// [`Catalog`] over cached SQLite connections
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    connections: Arc<ConnectionManager>,
}

impl SqliteCatalog {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }
}

impl Catalog for SqliteCatalog {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn run(&self, db_path: &Path, statement: &str, params: &[Json]) -> DbResult<QueryOutcome> {
        let values: Vec<Value> = params.iter().map(json_to_sql).collect();

        self.connections.with_connection(db_path, |conn| {
            let mut stmt = conn.prepare(statement)?;

            if stmt.column_count() == 0 {
                let affected = stmt.execute(params_from_iter(values.iter()))?;
                tracing::debug!(affected, "statement executed");
                return Ok(QueryOutcome::Affected(affected));
            }

            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query(params_from_iter(values.iter()))?;
            let mut results = Vec::new();

            while let Some(row) = rows.next()? {
                let mut object = Map::new();
                for (index, column) in columns.iter().enumerate() {
                    object.insert(column.clone(), sql_to_json(row.get_ref(index)?));
                }
                results.push(object);
            }

            tracing::debug!(rows = results.len(), "query returned");
            Ok(QueryOutcome::Rows {
                columns,
                rows: results,
            })
        })
    }

    fn list_tables(&self, db_path: &Path) -> DbResult<Vec<String>> {
        self.connections.with_connection(db_path, |conn| {
            let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    fn table_columns(&self, db_path: &Path, table: &str) -> DbResult<Vec<ColumnInfo>> {
        self.connections.with_connection(db_path, |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
            )?;

            let columns = stmt
                .query_map([table], |row| {
                    Ok(ColumnInfo {
                        name: row.get(0)?,
                        column_type: row.get(1)?,
                        nullable: row.get::<_, i64>(2)? == 0,
                        default: row.get(3)?,
                        primary_key: row.get::<_, i64>(4)? != 0,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(columns)
        })
    }

    fn row_count(&self, db_path: &Path, table: &str) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        self.connections.with_connection(db_path, |conn| {
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }
}
