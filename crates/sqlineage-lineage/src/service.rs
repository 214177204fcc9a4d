//! Text-facing lineage operations
//!
//! Each method returns the human-readable text handed back to the caller of
//! the corresponding lineage tool. None of them fail: a lookup miss is a
//! message, not an error.

use crate::analyzer::QueryLineageAnalyzer;
use crate::extractor::{ReferenceExtractor, RegexExtractor};
use crate::registry::SharedRegistry;
use sqlineage_core::{lineage_key, LineageRecord};
use std::fmt::Write;

/// Lineage tools over a shared registry
#[derive(Debug, Clone, Default)]
pub struct LineageService<E = RegexExtractor> {
    registry: SharedRegistry,
    analyzer: QueryLineageAnalyzer<E>,
}

impl LineageService<RegexExtractor> {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            analyzer: QueryLineageAnalyzer::new(),
        }
    }
}

impl<E: ReferenceExtractor> LineageService<E> {
    pub fn with_analyzer(registry: SharedRegistry, analyzer: QueryLineageAnalyzer<E>) -> Self {
        Self { registry, analyzer }
    }

    /// Handle to the underlying registry
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Declare (or replace) the lineage of a field
    pub fn declare_lineage(
        &self,
        target_table: &str,
        target_field: &str,
        source_tables: Vec<String>,
        source_fields: Vec<String>,
        join_condition: &str,
    ) -> String {
        let record = LineageRecord::new(target_table, target_field, source_tables, source_fields)
            .with_join_condition(join_condition);
        let pairs = join_pairs(&record);

        if self.registry.declare(record).is_some() {
            tracing::debug!(key = %lineage_key(target_table, target_field), "replaced lineage");
        }

        format!("Lineage added for {}.{} from {}", target_table, target_field, pairs)
    }

    /// Describe the declared sources of a field
    pub fn trace_lineage(&self, table: &str, field: &str) -> String {
        let Some(record) = self.registry.lookup(table, field) else {
            return format!("No lineage information found for {}.{}", table, field);
        };

        let target = record.target();
        let mut result = format!("Field Lineage for {}:\n", target);
        let _ = writeln!(result, "Source Tables: {}", record.source_tables.join(", "));
        let _ = writeln!(result, "Source Fields: {}", record.source_fields.join(", "));

        if !record.join_condition.is_empty() {
            let _ = writeln!(result, "Join Condition: {}", record.join_condition);
        }

        result.push_str("\nData Flow:\n");
        for source in record.source_pairs() {
            let _ = writeln!(result, "  {} -> {}", source, target);
        }

        result
    }

    /// Extract references from a query and report which have lineage
    pub fn analyze_query(&self, query: &str) -> String {
        self.registry
            .with_registry(|registry| self.analyzer.report(query, registry))
            .to_string()
    }

    /// One line per declared field
    pub fn list_lineage(&self) -> String {
        let records = self.registry.list_all();
        if records.is_empty() {
            return "No lineage information recorded.".to_string();
        }

        let mut result = format!("Tracked lineage ({} fields):\n", records.len());
        for (key, record) in &records {
            let _ = writeln!(result, "  {} <- {}", key, join_pairs(record));
        }
        result
    }

    /// Forget every declaration
    pub fn clear_lineage(&self) -> String {
        let removed = self.registry.clear();
        format!("Cleared {} lineage records.", removed)
    }
}

fn join_pairs(record: &LineageRecord) -> String {
    record
        .source_pairs()
        .iter()
        .map(|pair| pair.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
