//! Synthetic sample rows
//!
//! Values are chosen from the declared column type and, for text columns,
//! a handful of column-name patterns drawing from small fixed vocabularies.

use crate::catalog::{Catalog, SqliteCatalog};
use crate::connection::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::value::quote_ident;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use sqlineage_core::{ColumnInfo, ColumnKind};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "Ken", "Frances", "Dennis",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Thompson", "Allen",
    "Ritchie",
];
const STREETS: &[&str] = &["Main St", "Oak Ave", "Pine Rd", "Maple Dr", "Cedar Ln", "Elm St"];
const CITIES: &[&str] = &["Springfield", "Riverton", "Lakeside", "Fairview", "Georgetown", "Franklin"];
const COUNTRIES: &[&str] = &["Norway", "Canada", "Japan", "Brazil", "Kenya", "Germany", "Australia"];
const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "Labs", "Systems", "Partners"];
const JOB_TITLES: &[&str] = &[
    "Data Engineer", "Analyst", "Product Manager", "Accountant", "Designer", "Support Specialist",
];
const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];
const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua",
];

/// Fills tables with generated rows
pub struct SampleDataGenerator<R = StdRng> {
    catalog: SqliteCatalog,
    rng: Mutex<R>,
}

impl SampleDataGenerator<StdRng> {
    /// Generator seeded from `seed`, or from entropy when `None`
    pub fn new(connections: Arc<ConnectionManager>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(connections, rng)
    }
}

impl<R: Rng> SampleDataGenerator<R> {
    pub fn with_rng(connections: Arc<ConnectionManager>, rng: R) -> Self {
        Self {
            catalog: SqliteCatalog::new(connections),
            rng: Mutex::new(rng),
        }
    }

    /// Insert `num_rows` generated rows into `table`
    ///
    /// `INTEGER PRIMARY KEY` columns are left for SQLite to assign.
    pub fn generate(&self, db_path: &Path, table: &str, num_rows: usize) -> DbResult<usize> {
        let columns = self.catalog.table_columns(db_path, table)?;
        if columns.is_empty() {
            return Err(DbError::TableNotFound(table.to_string()));
        }

        let targets: Vec<&ColumnInfo> = columns.iter().filter(|c| !c.is_rowid_alias()).collect();
        let insert_sql = insert_statement(table, &targets);

        let rows: Vec<Vec<Value>> = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            (0..num_rows)
                .map(|_| targets.iter().map(|column| generate_value(&mut *rng, column)).collect())
                .collect()
        };

        self.catalog.connections().with_connection(db_path, |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&insert_sql)?;
                for row in &rows {
                    stmt.execute(params_from_iter(row.iter()))?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;

        tracing::info!(table, rows = num_rows, "generated sample data");
        Ok(num_rows)
    }
}

fn insert_statement(table: &str, targets: &[&ColumnInfo]) -> String {
    if targets.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table));
    }

    let names = targets
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; targets.len()].join(", ");

    format!("INSERT INTO {} ({}) VALUES ({})", quote_ident(table), names, placeholders)
}

fn generate_value<R: Rng + ?Sized>(rng: &mut R, column: &ColumnInfo) -> Value {
    match column.kind() {
        ColumnKind::Integer => Value::Integer(rng.gen_range(1..=1000)),
        ColumnKind::Real => {
            let value: f64 = rng.gen_range(1.0..1000.0);
            Value::Real((value * 100.0).round() / 100.0)
        }
        ColumnKind::Text => Value::Text(text_for_column(rng, &column.name)),
        ColumnKind::DateTime => Value::Text(datetime(rng)),
        ColumnKind::Bool => Value::Integer(i64::from(rng.gen_bool(0.5))),
        ColumnKind::Other => Value::Text(lorem(rng, 3)),
    }
}

fn text_for_column<R: Rng + ?Sized>(rng: &mut R, column_name: &str) -> String {
    let name = column_name.to_lowercase();

    if name.contains("name") {
        format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
    } else if name.contains("email") {
        format!(
            "{}.{}{}@{}",
            pick(rng, FIRST_NAMES).to_lowercase(),
            pick(rng, LAST_NAMES).to_lowercase(),
            rng.gen_range(1..100),
            pick(rng, EMAIL_DOMAINS)
        )
    } else if name.contains("phone") {
        format!(
            "+1-{:03}-{:03}-{:04}",
            rng.gen_range(200..1000),
            rng.gen_range(200..1000),
            rng.gen_range(0..10000)
        )
    } else if name.contains("address") {
        format!(
            "{} {}, {}",
            rng.gen_range(1..10000),
            pick(rng, STREETS),
            pick(rng, CITIES)
        )
    } else if name.contains("company") {
        format!("{} {}", pick(rng, LAST_NAMES), pick(rng, COMPANY_SUFFIXES))
    } else if name.contains("city") {
        pick(rng, CITIES).to_string()
    } else if name.contains("country") {
        pick(rng, COUNTRIES).to_string()
    } else if name.contains("title") {
        pick(rng, JOB_TITLES).to_string()
    } else if name.contains("description") {
        lorem(rng, 12)
    } else {
        lorem(rng, 6)
    }
}

fn datetime<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Anywhere in 2000-01-01 .. 2025-01-01
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let offset = Duration::seconds(rng.gen_range(0..789_004_800));
    start
        .map(|start| (start + offset).format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn lorem<R: Rng + ?Sized>(rng: &mut R, words: usize) -> String {
    let mut text = (0..words)
        .map(|_| pick(rng, LOREM))
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text.push('.');
    text
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &'static [&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}
