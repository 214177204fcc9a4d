//! Integration tests for lineage declaration and query analysis

use pretty_assertions::assert_eq;
use sqlineage_core::LineageRecord;
use sqlineage_lineage::{LineageService, QueryLineageAnalyzer, SharedRegistry};
use std::thread;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn declare_lookup_example() {
    let registry = SharedRegistry::new();
    registry.declare(
        LineageRecord::new("orders", "total", strings(&["line_items"]), strings(&["amount"]))
            .with_join_condition("sum"),
    );

    let record = registry.lookup("orders", "total").expect("declared record");
    assert_eq!(record.source_tables, strings(&["line_items"]));
    assert_eq!(record.source_fields, strings(&["amount"]));
    assert_eq!(record.join_condition, "sum");
}

#[test]
fn report_example_against_shared_registry() {
    let registry = SharedRegistry::new();
    registry.declare(LineageRecord::new(
        "orders",
        "total",
        strings(&["line_items"]),
        strings(&["amount"]),
    ));

    let analyzer = QueryLineageAnalyzer::new();
    let report = registry.with_registry(|r| analyzer.report("SELECT total FROM orders", r));

    assert_eq!(report.tables, strings(&["orders"]));
    assert_eq!(report.fields, strings(&["total"]));
    assert_eq!(report.tracked, strings(&["orders.total"]));
}

#[test]
fn concurrent_declarations_are_all_visible() {
    let registry = SharedRegistry::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                for j in 0..25 {
                    registry.declare(LineageRecord::new(
                        format!("table_{}", i),
                        format!("field_{}", j),
                        strings(&["raw"]),
                        vec![format!("col_{}", j)],
                    ));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("declaring thread panicked");
    }

    assert_eq!(registry.len(), 200);
    assert!(registry.lookup("table_7", "field_24").is_some());
}

#[test]
fn service_session_flow() {
    let service = LineageService::new(SharedRegistry::new());

    service.declare_lineage(
        "daily_revenue",
        "revenue",
        strings(&["orders", "refunds"]),
        strings(&["total", "amount"]),
        "orders.id = refunds.order_id",
    );

    let analysis = service.analyze_query(
        "SELECT d.revenue, d.day\nFROM daily_revenue d\nJOIN calendar c ON c.day = d.day",
    );
    assert_eq!(
        analysis,
        "Query Analysis:\n\
         Tables involved: daily_revenue, calendar\n\
         Fields selected: d.revenue, d.day\n\
         \n\
         Fields with tracked lineage: daily_revenue.revenue"
    );

    service.clear_lineage();
    assert!(service
        .analyze_query("SELECT revenue FROM daily_revenue")
        .ends_with("No tracked lineage found for fields in this query."));
}
