//! Table and column metadata as reported by SQLite

use serde::{Deserialize, Serialize};

/// Coarse classification of a declared column type
///
/// SQLite accepts any type name, so classification is by substring of the
/// upper-cased declaration, checked in declaration order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// `INT`
    Integer,

    /// `REAL`, `FLOAT`, `DOUBLE`
    Real,

    /// `TEXT`, `VARCHAR`, `CHAR`
    Text,

    /// `DATE`, `DATETIME`
    DateTime,

    /// `BOOL`, `BOOLEAN`
    Bool,

    /// Anything else, including an empty declaration
    Other,
}

impl ColumnKind {
    /// Classify a declared column type
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_uppercase();

        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("REAL") || upper.contains("FLOAT") || upper.contains("DOUBLE") {
            Self::Real
        } else if upper.contains("TEXT") || upper.contains("VARCHAR") || upper.contains("CHAR") {
            Self::Text
        } else if upper.contains("DATE") {
            Self::DateTime
        } else if upper.contains("BOOL") {
            Self::Bool
        } else {
            Self::Other
        }
    }

    /// Infer a storage kind from a single sample value
    ///
    /// Only `Integer`, `Real` and `Text` are ever inferred.
    pub fn infer_from_sample(value: &str) -> Self {
        if is_ascii_digits(value) {
            return Self::Integer;
        }

        let stripped: String = value.chars().filter(|c| *c != '.' && *c != '-').collect();
        if is_ascii_digits(&stripped) {
            Self::Real
        } else {
            Self::Text
        }
    }
}

fn is_ascii_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// One column of a table, as reported by `table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Declared type (may be empty)
    #[serde(rename = "type")]
    pub column_type: String,

    /// Whether NULL is allowed
    pub nullable: bool,

    /// Default value expression, verbatim
    pub default: Option<String>,

    /// Whether the column is part of the primary key
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Classification of the declared type
    pub fn kind(&self) -> ColumnKind {
        ColumnKind::from_declared_type(&self.column_type)
    }

    /// Whether SQLite assigns this column from the rowid
    pub fn is_rowid_alias(&self) -> bool {
        self.primary_key && self.column_type.to_uppercase().contains("INTEGER")
    }
}

/// Table structure plus its current row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub name: String,
    pub row_count: u64,
    pub columns: Vec<ColumnInfo>,
}
