//! Query lineage analysis
//!
//! Extracts table and field references from SQL text and checks which of
//! them have declared lineage.

use crate::extractor::{ReferenceExtractor, RegexExtractor};
use crate::registry::LineageRegistry;
use serde::{Deserialize, Serialize};
use sqlineage_core::lineage_key;
use std::fmt;

/// Tables and fields referenced by one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLineageAnalysis {
    pub tables: Vec<String>,
    pub fields: Vec<String>,
}

/// Analysis plus the referenced fields that have declared lineage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageReport {
    pub tables: Vec<String>,
    pub fields: Vec<String>,

    /// `table.field` keys found in the registry
    pub tracked: Vec<String>,
}

impl fmt::Display for LineageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Query Analysis:")?;
        writeln!(f, "Tables involved: {}", self.tables.join(", "))?;
        writeln!(f, "Fields selected: {}", self.fields.join(", "))?;

        if self.tracked.is_empty() {
            write!(f, "\nNo tracked lineage found for fields in this query.")
        } else {
            write!(f, "\nFields with tracked lineage: {}", self.tracked.join(", "))
        }
    }
}

/// Analyzer over a pluggable [`ReferenceExtractor`]
#[derive(Debug, Clone, Default)]
pub struct QueryLineageAnalyzer<E = RegexExtractor> {
    extractor: E,
}

impl QueryLineageAnalyzer<RegexExtractor> {
    /// Analyzer backed by the regex scan
    pub fn new() -> Self {
        Self {
            extractor: RegexExtractor,
        }
    }
}

impl<E: ReferenceExtractor> QueryLineageAnalyzer<E> {
    pub fn with_extractor(extractor: E) -> Self {
        Self { extractor }
    }

    /// Extract referenced tables and selected fields
    pub fn analyze(&self, query: &str) -> QueryLineageAnalysis {
        let analysis = QueryLineageAnalysis {
            tables: self.extractor.tables(query),
            fields: self.extractor.fields(query),
        };

        tracing::debug!(
            tables = analysis.tables.len(),
            fields = analysis.fields.len(),
            "analyzed query"
        );

        analysis
    }

    /// Analyze a query and cross-reference it against the registry
    ///
    /// Every extracted table is paired with every extracted field (the `*`
    /// wildcard excepted), using the part of the field after its last `.`.
    /// The pairing ignores which table a qualified field actually names, so
    /// `a.x` tested against table `b` reports `b.x` whenever `b.x` has
    /// lineage. That imprecision is accepted.
    pub fn report(&self, query: &str, registry: &LineageRegistry) -> LineageReport {
        let QueryLineageAnalysis { tables, fields } = self.analyze(query);

        let mut tracked = Vec::new();
        for table in &tables {
            for field in fields.iter().filter(|field| field.as_str() != "*") {
                let clean_field = field.rsplit('.').next().unwrap_or(field.as_str()).trim();

                if registry.lookup(table, clean_field).is_some() {
                    tracked.push(lineage_key(table, clean_field));
                }
            }
        }

        LineageReport {
            tables,
            fields,
            tracked,
        }
    }
}
