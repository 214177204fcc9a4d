//! CSV import and export

use crate::connection::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::value::{quote_ident, sql_to_field};
use rusqlite::params_from_iter;
use sqlineage_core::{ColumnKind, CsvConfig};
use std::path::Path;
use std::sync::Arc;

/// Moves rows between CSV files and tables
///
/// The delimiter is fixed by configuration; files are never sniffed.
#[derive(Debug, Clone)]
pub struct CsvTransfer {
    connections: Arc<ConnectionManager>,
    delimiter: u8,
}

impl CsvTransfer {
    pub fn new(connections: Arc<ConnectionManager>, config: &CsvConfig) -> DbResult<Self> {
        Ok(Self {
            connections,
            delimiter: config.delimiter_byte()?,
        })
    }

    /// Insert every data row of `csv_path` into `table`
    ///
    /// With `create_table`, the table is created if missing, typing each
    /// column from its value in the first data row. Values are bound as text
    /// and left to SQLite's type affinity. All rows go in one transaction.
    pub fn import_csv(
        &self,
        db_path: &Path,
        csv_path: &Path,
        table: &str,
        create_table: bool,
    ) -> DbResult<usize> {
        if !csv_path.is_file() {
            return Err(DbError::CsvNotFound(csv_path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(csv_path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let Some(first) = records.first() else {
            return Err(DbError::EmptyCsv);
        };

        let quoted_table = quote_ident(table);
        let column_list = headers
            .iter()
            .map(|h| quote_ident(h))
            .collect::<Vec<_>>()
            .join(", ");

        let create_sql = create_table.then(|| {
            let column_defs = headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    let sample = first.get(index).unwrap_or_default();
                    format!("{} {}", quote_ident(header), inferred_sql_type(sample))
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("CREATE TABLE IF NOT EXISTS {} ({})", quoted_table, column_defs)
        });

        let placeholders = vec!["?"; headers.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quoted_table, column_list, placeholders
        );

        self.connections.with_connection(db_path, |conn| {
            let tx = conn.transaction()?;
            if let Some(create_sql) = &create_sql {
                tx.execute(create_sql, [])?;
            }
            {
                let mut stmt = tx.prepare(&insert_sql)?;
                for record in &records {
                    // Short rows bind NULL for the missing cells; extra cells are dropped
                    let values = (0..headers.len()).map(|index| record.get(index));
                    stmt.execute(params_from_iter(values))?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;

        tracing::info!(
            csv = %csv_path.display(),
            table,
            rows = records.len(),
            "imported csv"
        );
        Ok(records.len())
    }

    /// Write every row of `table` to `output`
    ///
    /// Returns the number of data rows; an empty table writes no file.
    pub fn export_table(&self, db_path: &Path, table: &str, output: &Path) -> DbResult<usize> {
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        self.export(db_path, &sql, output)
    }

    /// Write the result of `query` to `output`
    ///
    /// Returns the number of data rows; an empty result writes no file.
    pub fn export_query(&self, db_path: &Path, query: &str, output: &Path) -> DbResult<usize> {
        self.export(db_path, query, output)
    }

    fn export(&self, db_path: &Path, sql: &str, output: &Path) -> DbResult<usize> {
        let (columns, rows) = self.connections.with_connection(db_path, |conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let mut record = Vec::with_capacity(columns.len());
                for index in 0..columns.len() {
                    record.push(sql_to_field(row.get_ref(index)?));
                }
                records.push(record);
            }

            Ok((columns, records))
        })?;

        if rows.is_empty() {
            return Ok(0);
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(output)?;
        writer.write_record(&columns)?;
        for record in &rows {
            writer.write_record(record)?;
        }
        writer.flush()?;

        tracing::info!(output = %output.display(), rows = rows.len(), "exported csv");
        Ok(rows.len())
    }
}

/// Column type for a CSV column, from its value in the first data row
fn inferred_sql_type(sample: &str) -> &'static str {
    match ColumnKind::infer_from_sample(sample) {
        ColumnKind::Integer => "INTEGER",
        ColumnKind::Real => "REAL",
        _ => "TEXT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SqliteCatalog};
    use pretty_assertions::assert_eq;

    fn setup() -> (tempfile::TempDir, Arc<ConnectionManager>, CsvTransfer) {
        let dir = tempfile::tempdir().unwrap();
        let connections = Arc::new(ConnectionManager::default());
        let transfer = CsvTransfer::new(connections.clone(), &CsvConfig::default()).unwrap();
        (dir, connections, transfer)
    }

    #[test]
    fn import_creates_typed_table() {
        let (dir, connections, transfer) = setup();
        let db = dir.path().join("import.db");
        let csv_path = dir.path().join("people.csv");
        std::fs::write(&csv_path, "id,name,score\n1,ada,9.5\n2,bob,7\n").unwrap();

        let imported = transfer.import_csv(&db, &csv_path, "people", true).unwrap();
        assert_eq!(imported, 2);

        let catalog = SqliteCatalog::new(connections);
        let types: Vec<String> = catalog
            .table_columns(&db, "people")
            .unwrap()
            .into_iter()
            .map(|c| c.column_type)
            .collect();
        assert_eq!(types, vec!["INTEGER", "TEXT", "REAL"]);
        assert_eq!(catalog.row_count(&db, "people").unwrap(), 2);
    }

    #[test]
    fn import_into_missing_table_without_create_fails() {
        let (dir, _connections, transfer) = setup();
        let db = dir.path().join("import.db");
        let csv_path = dir.path().join("people.csv");
        std::fs::write(&csv_path, "id\n1\n").unwrap();

        let err = transfer.import_csv(&db, &csv_path, "people", false).unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn import_missing_and_empty_files() {
        let (dir, _connections, transfer) = setup();
        let db = dir.path().join("import.db");

        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            transfer.import_csv(&db, &missing, "t", true),
            Err(DbError::CsvNotFound(_))
        ));

        let header_only = dir.path().join("header.csv");
        std::fs::write(&header_only, "a,b\n").unwrap();
        assert!(matches!(
            transfer.import_csv(&db, &header_only, "t", true),
            Err(DbError::EmptyCsv)
        ));
    }

    #[test]
    fn export_table_writes_header_and_rows() {
        let (dir, connections, transfer) = setup();
        let db = dir.path().join("export.db");
        connections
            .with_connection(&db, |conn| {
                conn.execute_batch(
                    "CREATE TABLE t (id INTEGER, label TEXT);
                     INSERT INTO t VALUES (1, 'one'), (2, NULL);",
                )?;
                Ok(())
            })
            .unwrap();

        let output = dir.path().join("t.csv");
        assert_eq!(transfer.export_table(&db, "t", &output).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "id,label\n1,one\n2,\n");
    }

    #[test]
    fn empty_export_writes_nothing() {
        let (dir, connections, transfer) = setup();
        let db = dir.path().join("export.db");
        connections
            .with_connection(&db, |conn| {
                conn.execute_batch("CREATE TABLE t (id INTEGER)")?;
                Ok(())
            })
            .unwrap();

        let output = dir.path().join("t.csv");
        assert_eq!(transfer.export_table(&db, "t", &output).unwrap(), 0);
        assert_eq!(transfer.export_query(&db, "SELECT id FROM t", &output).unwrap(), 0);
        assert!(!output.exists());
    }

    #[test]
    fn ragged_rows_pad_with_null() {
        let (dir, connections, transfer) = setup();
        let db = dir.path().join("ragged.db");
        let csv_path = dir.path().join("ragged.csv");
        std::fs::write(&csv_path, "a,b,c\n1,x,2\n3,y\n4,z,5,extra\n").unwrap();

        assert_eq!(transfer.import_csv(&db, &csv_path, "ragged", true).unwrap(), 3);

        let catalog = SqliteCatalog::new(connections);
        let rows = match catalog.run(&db, "SELECT a, b, c FROM ragged ORDER BY a", &[]).unwrap() {
            crate::catalog::QueryOutcome::Rows { rows, .. } => rows,
            other => panic!("expected rows, got {:?}", other),
        };
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            serde_json::json!([
                {"a": 1, "b": "x", "c": 2},
                {"a": 3, "b": "y", "c": null},
                {"a": 4, "b": "z", "c": 5}
            ])
        );
    }

    #[test]
    fn short_first_row_types_missing_columns_as_text() {
        let (dir, connections, transfer) = setup();
        let db = dir.path().join("short.db");
        let csv_path = dir.path().join("short.csv");
        std::fs::write(&csv_path, "id,label\n1\n2,two\n").unwrap();

        transfer.import_csv(&db, &csv_path, "short", true).unwrap();

        let types: Vec<String> = SqliteCatalog::new(connections)
            .table_columns(&db, "short")
            .unwrap()
            .into_iter()
            .map(|c| c.column_type)
            .collect();
        assert_eq!(types, vec!["INTEGER", "TEXT"]);
    }

    #[test]
    fn whole_reals_survive_export_and_reimport() {
        let (dir, connections, transfer) = setup();
        let db = dir.path().join("prices.db");
        connections
            .with_connection(&db, |conn| {
                conn.execute_batch(
                    "CREATE TABLE prices (price REAL);
                     INSERT INTO prices VALUES (1.0), (2.5);",
                )?;
                Ok(())
            })
            .unwrap();

        let output = dir.path().join("prices.csv");
        assert_eq!(transfer.export_table(&db, "prices", &output).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "price\n1.0\n2.5\n");

        transfer.import_csv(&db, &output, "prices_copy", true).unwrap();
        let columns = SqliteCatalog::new(connections)
            .table_columns(&db, "prices_copy")
            .unwrap();
        assert_eq!(columns[0].column_type, "REAL");
    }

    #[test]
    fn csv_errors_are_not_double_prefixed() {
        let (dir, _connections, transfer) = setup();
        let db = dir.path().join("bad.db");
        let csv_path = dir.path().join("bad.csv");
        std::fs::write(&csv_path, b"a\n\xff\xfe\n").unwrap();

        let err = transfer.import_csv(&db, &csv_path, "bad", true).unwrap_err();
        assert!(matches!(err, DbError::Csv(_)));
        assert!(!err.to_string().contains("CSV error: CSV error"));
    }

    #[test]
    fn custom_delimiter_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let connections = Arc::new(ConnectionManager::default());
        let transfer = CsvTransfer::new(connections, &CsvConfig { delimiter: ';' }).unwrap();
        let db = dir.path().join("semi.db");

        let input = dir.path().join("in.csv");
        std::fs::write(&input, "city;population\nOslo;709000\n").unwrap();
        transfer.import_csv(&db, &input, "cities", true).unwrap();

        let output = dir.path().join("out.csv");
        transfer
            .export_query(&db, "SELECT city, population FROM cities", &output)
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "city;population\nOslo;709000\n"
        );
    }
}
