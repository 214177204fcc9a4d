//! Tool calls and their text rendering
//!
//! Every tool returns a single human-readable string. Database failures are
//! rendered into that string rather than propagated, so one bad call never
//! ends a session.

use serde::Deserialize;
use serde_json::{json, Value as Json};
use sqlineage_core::Config;
use sqlineage_db::{
    ConnectionManager, CsvTransfer, DatabaseOperations, DbError, DbResult, QueryOutcome,
    SampleDataGenerator,
};
use sqlineage_lineage::{LineageService, SharedRegistry};
use std::path::PathBuf;
use std::sync::Arc;

/// A single tool invocation: `{"tool": "<name>", "arguments": {...}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    ConnectDatabase {
        db_path: PathBuf,
    },
    ExecuteQuery {
        db_path: PathBuf,
        query: String,
        #[serde(default)]
        params: Option<Vec<Json>>,
    },
    DescribeTable {
        db_path: PathBuf,
        table_name: String,
    },
    AddFieldLineage {
        target_table: String,
        target_field: String,
        source_tables: Vec<String>,
        source_fields: Vec<String>,
        #[serde(default)]
        join_condition: String,
    },
    TraceFieldLineage {
        table: String,
        field: String,
    },
    AnalyzeQueryLineage {
        query: String,
    },
    ListLineage {},
    ClearLineage {},
    GenerateSampleData {
        db_path: PathBuf,
        table_name: String,
        /// Falls back to `sample_data.default_rows`
        #[serde(default)]
        num_rows: Option<usize>,
    },
    ImportCsv {
        db_path: PathBuf,
        csv_path: PathBuf,
        table_name: String,
        #[serde(default = "default_create_table")]
        create_table: bool,
    },
    ExportTableToCsv {
        db_path: PathBuf,
        table_name: String,
        output_path: PathBuf,
    },
    ExportQueryToCsv {
        db_path: PathBuf,
        query: String,
        output_path: PathBuf,
    },
}

fn default_create_table() -> bool {
    true
}

impl ToolCall {
    /// Build a call from a tool name and its (optional) argument object
    pub fn from_parts(tool: &str, arguments: Option<Json>) -> Result<Self, serde_json::Error> {
        let arguments = arguments
            .filter(|args| !args.is_null())
            .unwrap_or_else(|| json!({}));
        serde_json::from_value(json!({ "tool": tool, "arguments": arguments }))
    }

    /// Wire name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectDatabase { .. } => "connect_database",
            Self::ExecuteQuery { .. } => "execute_query",
            Self::DescribeTable { .. } => "describe_table",
            Self::AddFieldLineage { .. } => "add_field_lineage",
            Self::TraceFieldLineage { .. } => "trace_field_lineage",
            Self::AnalyzeQueryLineage { .. } => "analyze_query_lineage",
            Self::ListLineage {} => "list_lineage",
            Self::ClearLineage {} => "clear_lineage",
            Self::GenerateSampleData { .. } => "generate_sample_data",
            Self::ImportCsv { .. } => "import_csv",
            Self::ExportTableToCsv { .. } => "export_table_to_csv",
            Self::ExportQueryToCsv { .. } => "export_query_to_csv",
        }
    }
}

/// Everything a session needs to answer tool calls
pub struct Toolbox {
    config: Config,
    connections: Arc<ConnectionManager>,
    operations: DatabaseOperations,
    transfer: CsvTransfer,
    generator: SampleDataGenerator,
    lineage: LineageService,
}

impl Toolbox {
    /// Wire up the tools from configuration and an injected lineage registry
    pub fn new(config: Config, registry: SharedRegistry) -> DbResult<Self> {
        let connections = Arc::new(ConnectionManager::new(config.database.clone()));

        Ok(Self {
            operations: DatabaseOperations::sqlite(connections.clone()),
            transfer: CsvTransfer::new(connections.clone(), &config.csv)?,
            generator: SampleDataGenerator::new(connections.clone(), config.sample_data.seed),
            lineage: LineageService::new(registry),
            connections,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lineage(&self) -> &LineageService {
        &self.lineage
    }

    /// Parse and dispatch in one step
    pub fn call(&self, tool: &str, arguments: Option<Json>) -> Result<String, serde_json::Error> {
        ToolCall::from_parts(tool, arguments).map(|call| self.dispatch(call))
    }

    /// Run one tool and render its outcome
    pub fn dispatch(&self, call: ToolCall) -> String {
        tracing::debug!(tool = call.name(), "dispatching");

        match call {
            ToolCall::ConnectDatabase { db_path } => match self.operations.connect(&db_path) {
                Ok(tables) if tables.is_empty() => format!(
                    "Successfully connected to database: {}\nNo tables found in database.",
                    db_path.display()
                ),
                Ok(tables) => format!(
                    "Successfully connected to database: {}\nTables found: {}",
                    db_path.display(),
                    tables.join(", ")
                ),
                Err(e) => render_error("Error connecting to database", e),
            },

            ToolCall::ExecuteQuery { db_path, query, params } => {
                match self.operations.execute(&db_path, &query, params.as_deref()) {
                    Ok(outcome) => render_outcome(&outcome),
                    Err(e) => render_error("Error executing query", e),
                }
            }

            ToolCall::DescribeTable { db_path, table_name } => {
                match self.operations.describe_table(&db_path, &table_name) {
                    Ok(description) => format!(
                        "Table: {}\nRow count: {}\nColumns:\n{}",
                        description.name,
                        description.row_count,
                        pretty(&description.columns)
                    ),
                    Err(e) => render_error("Error describing table", e),
                }
            }

            ToolCall::AddFieldLineage {
                target_table,
                target_field,
                source_tables,
                source_fields,
                join_condition,
            } => self.lineage.declare_lineage(
                &target_table,
                &target_field,
                source_tables,
                source_fields,
                &join_condition,
            ),

            ToolCall::TraceFieldLineage { table, field } => self.lineage.trace_lineage(&table, &field),

            ToolCall::AnalyzeQueryLineage { query } => self.lineage.analyze_query(&query),

            ToolCall::ListLineage {} => self.lineage.list_lineage(),

            ToolCall::ClearLineage {} => self.lineage.clear_lineage(),

            ToolCall::GenerateSampleData { db_path, table_name, num_rows } => {
                let num_rows = num_rows.unwrap_or(self.config.sample_data.default_rows);
                match self.generator.generate(&db_path, &table_name, num_rows) {
                    Ok(rows) => format!(
                        "Successfully generated and inserted {} rows into {}",
                        rows, table_name
                    ),
                    Err(e) => render_error("Error generating data", e),
                }
            }

            ToolCall::ImportCsv { db_path, csv_path, table_name, create_table } => {
                match self.transfer.import_csv(&db_path, &csv_path, &table_name, create_table) {
                    Ok(rows) => format!(
                        "Successfully imported {} rows from {} into {}",
                        rows,
                        csv_path.display(),
                        table_name
                    ),
                    Err(e) => render_error("Error importing CSV", e),
                }
            }

            ToolCall::ExportTableToCsv { db_path, table_name, output_path } => {
                match self.transfer.export_table(&db_path, &table_name, &output_path) {
                    Ok(0) => format!("Table {} is empty", table_name),
                    Ok(rows) => format!(
                        "Successfully exported {} rows from {} to {}",
                        rows,
                        table_name,
                        output_path.display()
                    ),
                    Err(e) => render_error("Error exporting table", e),
                }
            }

            ToolCall::ExportQueryToCsv { db_path, query, output_path } => {
                match self.transfer.export_query(&db_path, &query, &output_path) {
                    Ok(0) => "Query returned no results".to_string(),
                    Ok(rows) => format!(
                        "Successfully exported {} rows from query to {}",
                        rows,
                        output_path.display()
                    ),
                    Err(e) => render_error("Error exporting query", e),
                }
            }
        }
    }

    /// Drop every cached connection, returning the paths that were open
    pub fn close(&self) -> Vec<PathBuf> {
        let paths = self.connections.open_paths();
        tracing::debug!(?paths, "closing connections");
        self.connections.close_all();
        paths
    }
}

fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Rows { rows, .. } if rows.is_empty() => {
            "Query executed successfully. No results returned.".to_string()
        }
        QueryOutcome::Rows { rows, .. } => {
            format!("Query executed successfully.\nResults:\n{}", pretty(rows))
        }
        QueryOutcome::Affected(n) => format!("Query executed successfully. {} rows affected.", n),
    }
}

/// Not-found conditions are answers in their own right; everything else
/// gets the tool's error prefix.
fn render_error(context: &str, error: DbError) -> String {
    tracing::debug!(%error, context, "tool failed");

    match error {
        DbError::TableNotFound(_) | DbError::CsvNotFound(_) | DbError::EmptyCsv => error.to_string(),
        DbError::Sqlite(e) => format!("{}: {}", context, e),
        other => format!("{}: {}", context, other),
    }
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
