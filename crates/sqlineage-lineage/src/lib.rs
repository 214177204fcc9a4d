//! Field lineage tracking and query analysis
//!
//! This crate handles:
//! - Storing declared field lineage (`table.field` -> upstream sources)
//! - Best-effort extraction of table and field references from SQL text
//! - Cross-referencing extracted references against declared lineage
//! - Rendering the text reports returned by the lineage tools

pub mod registry;
pub mod extractor;
pub mod analyzer;
pub mod service;

pub use registry::{LineageRegistry, SharedRegistry};
pub use extractor::{ReferenceExtractor, RegexExtractor};
pub use analyzer::{QueryLineageAnalyzer, QueryLineageAnalysis, LineageReport};
pub use service::LineageService;
