//! Table and field reference extraction from raw SQL text
//!
//! Extraction is a text scan, not a parse. [`RegexExtractor`] knows nothing
//! about subqueries, comments, string literals or function calls; its
//! limitations are part of its contract:
//! - every `FROM x` / `JOIN x` mention is reported, duplicates included
//! - only the first `SELECT ... FROM` span is read for fields
//! - the field span is split on every comma, even inside parentheses

use once_cell::sync::Lazy;
use regex::Regex;

static TABLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)FROM\s+(\w+)|JOIN\s+(\w+)").expect("table reference pattern is valid")
});

static SELECT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)SELECT\s+(.*?)\s+FROM").expect("select list pattern is valid")
});

/// Source of table and field references for query analysis
///
/// Implementations must not fail: text they cannot make sense of yields
/// empty lists.
pub trait ReferenceExtractor {
    /// Referenced tables, in order of appearance
    fn tables(&self, sql: &str) -> Vec<String>;

    /// Selected field expressions, in order of appearance
    fn fields(&self, sql: &str) -> Vec<String>;
}

/// Case-insensitive regex scan
///
/// Keywords match in any case; captured identifiers keep the casing they
/// have in the query text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl ReferenceExtractor for RegexExtractor {
    fn tables(&self, sql: &str) -> Vec<String> {
        TABLE_REFERENCE
            .captures_iter(sql)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn fields(&self, sql: &str) -> Vec<String> {
        let Some(select_list) = SELECT_LIST.captures(sql).and_then(|caps| caps.get(1)) else {
            return Vec::new();
        };

        select_list
            .as_str()
            .split(',')
            .map(|field| field.trim().to_string())
            .collect()
    }
}
