//! Lineage records: declared provenance of a target field

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build the registry key for a field.
///
/// Keys are `table.field`, case-sensitive, with a literal period as the
/// delimiter. Names that themselves contain a period collide ambiguously.
pub fn lineage_key(table: &str, field: &str) -> String {
    format!("{}.{}", table, field)
}

/// Reference to an upstream column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Source table name
    pub source: String,

    /// Column within the source table
    pub column: String,
}

impl ColumnRef {
    pub fn new(source: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source, self.column)
    }
}

/// A declared provenance fact for one target field
///
/// `source_tables` and `source_fields` are parallel sequences. Their lengths
/// are not checked: [`LineageRecord::source_pairs`] zips them and stops at
/// the shorter one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRecord {
    /// Table that owns the derived field
    pub target_table: String,

    /// The derived field
    pub target_field: String,

    /// Upstream tables, in declaration order
    pub source_tables: Vec<String>,

    /// Upstream fields, in declaration order
    pub source_fields: Vec<String>,

    /// Free-text join description; empty when absent
    #[serde(default)]
    pub join_condition: String,
}

impl LineageRecord {
    /// Create a record with no join condition
    pub fn new(
        target_table: impl Into<String>,
        target_field: impl Into<String>,
        source_tables: Vec<String>,
        source_fields: Vec<String>,
    ) -> Self {
        Self {
            target_table: target_table.into(),
            target_field: target_field.into(),
            source_tables,
            source_fields,
            join_condition: String::new(),
        }
    }

    /// Set the join condition
    pub fn with_join_condition(mut self, join_condition: impl Into<String>) -> Self {
        self.join_condition = join_condition.into();
        self
    }

    /// Registry key (`target_table.target_field`)
    pub fn key(&self) -> String {
        lineage_key(&self.target_table, &self.target_field)
    }

    /// Upstream columns, pairing tables and fields positionally
    pub fn source_pairs(&self) -> Vec<ColumnRef> {
        self.source_tables
            .iter()
            .zip(&self.source_fields)
            .map(|(table, field)| ColumnRef::new(table.as_str(), field.as_str()))
            .collect()
    }

    /// The target as a column reference
    pub fn target(&self) -> ColumnRef {
        ColumnRef::new(self.target_table.as_str(), self.target_field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn key_uses_literal_period() {
        let record = LineageRecord::new("orders", "total", vec![], vec![]);
        assert_eq!(record.key(), "orders.total");
        assert_eq!(lineage_key("Orders", "Total"), "Orders.Total");
    }

    #[test]
    fn source_pairs_zip_positionally() {
        let record = LineageRecord::new(
            "orders",
            "total",
            strings(&["line_items", "discounts"]),
            strings(&["amount", "value"]),
        );

        let pairs: Vec<String> = record.source_pairs().iter().map(|p| p.to_string()).collect();
        assert_eq!(pairs, vec!["line_items.amount", "discounts.value"]);
    }

    #[test]
    fn source_pairs_truncate_at_shorter_sequence() {
        let record = LineageRecord::new(
            "orders",
            "total",
            strings(&["a", "b", "c"]),
            strings(&["x"]),
        );

        assert_eq!(record.source_pairs(), vec![ColumnRef::new("a", "x")]);
    }

    #[test]
    fn join_condition_defaults_to_empty() {
        let json = r#"{
            "target_table": "t",
            "target_field": "f",
            "source_tables": ["s"],
            "source_fields": ["g"]
        }"#;

        let record: LineageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.join_condition, "");
        assert_eq!(record.target().to_string(), "t.f");
    }
}
