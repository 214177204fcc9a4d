//! Database layer errors

/// Errors that can occur while talking to a database or moving CSV data
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] sqlineage_core::ConfigError),

    #[error("Table '{0}' not found.")]
    TableNotFound(String),

    #[error("CSV file not found: {0}")]
    CsvNotFound(String),

    #[error("CSV file is empty")]
    EmptyCsv,
}

pub type DbResult<T> = Result<T, DbError>;
