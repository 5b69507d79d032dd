//! Catalog ingestion, search ordering and aggregates.

mod support;

use fflbro_domain::{FflBroError, LedgerConfig, ProductFields, Result, SearchQuery};
use rust_decimal::Decimal;
use support::{glock_19, id, Harness};

fn fields(manufacturer: &str, description: &str, cents: i64, quantity: u32) -> ProductFields {
    ProductFields::new(manufacturer, description, Decimal::new(cents, 2), quantity)
}

fn item_numbers(results: impl Iterator<Item = Result<fflbro_domain::Product>>) -> Vec<String> {
    results.map(|p| p.unwrap().item_number).collect()
}

#[test]
fn upsert_is_idempotent_per_item_number() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");

    let first = h.catalog.upsert_product(&lipseys, "GLK-19-GEN5", &glock_19()).unwrap();
    let second = h.catalog.upsert_product(&lipseys, " GLK-19-GEN5 ", &glock_19()).unwrap();
    assert_eq!(first, second);
    assert_eq!(h.store.product_count(), 1);

    let restocked = ProductFields { quantity: 3, ..glock_19() };
    h.catalog.upsert_product(&lipseys, "GLK-19-GEN5", &restocked).unwrap();
    let product = h.catalog.get_product(&lipseys, "GLK-19-GEN5").unwrap();
    assert_eq!(product.quantity, 3);
    assert_eq!(product.price, Decimal::new(43890, 2));
}

#[test]
fn same_item_number_is_distinct_across_distributors() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");
    let rsr = h.register("rsr");
    let a = h.catalog.upsert_product(&lipseys, "GLK-19-GEN5", &glock_19()).unwrap();
    let b = h.catalog.upsert_product(&rsr, "GLK-19-GEN5", &glock_19()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn invalid_records_are_rejected() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");

    let negative = fields("Glock", "G17", -100, 1);
    assert!(matches!(
        h.catalog.upsert_product(&lipseys, "G17", &negative),
        Err(FflBroError::InvalidPrice(_))
    ));
    let fractional = ProductFields::new("Glock", "G17", Decimal::new(10001, 3), 1);
    assert!(matches!(
        h.catalog.upsert_product(&lipseys, "G17", &fractional),
        Err(FflBroError::InvalidPrice(_))
    ));
    let unbounded = ProductFields::new("Glock", "G17", Decimal::MAX, 1);
    assert!(matches!(
        h.catalog.upsert_product(&lipseys, "G17", &unbounded),
        Err(FflBroError::InvalidPrice(_))
    ));
    assert!(matches!(
        h.catalog.upsert_product(&lipseys, "  ", &glock_19()),
        Err(FflBroError::InvalidInput(_))
    ));
    assert!(matches!(
        h.catalog.upsert_product(&id("ghost"), "G17", &glock_19()),
        Err(FflBroError::UnknownDistributor(_))
    ));
    assert_eq!(h.store.product_count(), 0);
}

#[test]
fn missing_product_is_not_found() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");
    assert!(matches!(h.catalog.get_product(&lipseys, "NOPE"), Err(FflBroError::NotFound(_))));
}

#[test]
fn sig_search_orders_by_relevance_then_price() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");
    let rsr = h.register("rsr");

    h.catalog.upsert_product(&lipseys, "SIG-P365", &fields("SIG Sauer", "P365 9mm", 59999, 4)).unwrap();
    h.catalog.upsert_product(&rsr, "SIG-P320", &fields("Sig Sauer", "P320 Compact", 54900, 0)).unwrap();
    h.catalog.upsert_product(&lipseys, "SIG", &fields("sig", "Branded cap", 1999, 10)).unwrap();
    h.catalog.upsert_product(&rsr, "HLS-SIG", &fields("Holosun", "Optic for SIG P365", 29900, 2)).unwrap();
    h.catalog.upsert_product(&lipseys, "GLK-19-GEN5", &glock_19()).unwrap();

    let results = item_numbers(h.catalog.search(SearchQuery::new("  SIG ")).unwrap());
    assert_eq!(results, vec!["SIG", "SIG-P320", "SIG-P365", "HLS-SIG"]);

    let in_stock = item_numbers(h.catalog.search(SearchQuery::new("sig").in_stock_only()).unwrap());
    assert_eq!(in_stock, vec!["SIG", "SIG-P365", "HLS-SIG"]);

    let rsr_only = item_numbers(h.catalog.search(SearchQuery::new("sig").distributor(rsr)).unwrap());
    assert_eq!(rsr_only, vec!["SIG-P320", "HLS-SIG"]);
}

#[test]
fn empty_query_returns_everything_by_price() {
    let h = Harness::with_config(LedgerConfig { search_page_size: 2, ..LedgerConfig::default() });
    let lipseys = h.register("lipseys");
    for (item, cents) in [("C", 300), ("A", 100), ("E", 500), ("B", 200), ("D", 400)] {
        h.catalog.upsert_product(&lipseys, item, &fields("Acme", "Widget", cents, 1)).unwrap();
    }

    let all = item_numbers(h.catalog.search(SearchQuery::new("")).unwrap());
    assert_eq!(all, vec!["A", "B", "C", "D", "E"]);

    let capped = item_numbers(h.catalog.search(SearchQuery::new("").limit(3)).unwrap());
    assert_eq!(capped, vec!["A", "B", "C"]);
}

#[test]
fn search_can_be_restarted() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");
    h.catalog.upsert_product(&lipseys, "GLK-19-GEN5", &glock_19()).unwrap();

    let mut search = h.catalog.search(SearchQuery::new("glock")).unwrap();
    assert_eq!(search.by_ref().count(), 1);
    assert!(search.next().is_none());
    search.restart();
    assert_eq!(search.count(), 1);
}

#[test]
fn unknown_distributor_filter_fails_up_front() {
    let h = Harness::new();
    assert!(matches!(
        h.catalog.search(SearchQuery::new("sig").distributor(id("ghost"))),
        Err(FflBroError::UnknownDistributor(_))
    ));
}

#[test]
fn counts_and_stats_reflect_catalog() {
    let h = Harness::new();
    let lipseys = h.register("lipseys");
    let rsr = h.register("rsr");
    h.register("orion");

    h.catalog.upsert_product(&lipseys, "A", &fields("Acme", "One", 100, 0)).unwrap();
    h.catalog.upsert_product(&lipseys, "B", &fields("Acme", "Two", 100, 5)).unwrap();
    h.catalog.upsert_product(&rsr, "C", &fields("Acme", "Three", 100, 1)).unwrap();

    let counts = h.catalog.count_by_distributor().unwrap();
    assert_eq!(counts.get(&lipseys), Some(&2));
    assert_eq!(counts.get(&rsr), Some(&1));
    assert!(!counts.contains_key(&id("orion")));

    let stats = h.catalog.catalog_stats().unwrap();
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.in_stock_products, 2);
}

#[test]
fn sample_is_sorted_and_clamped() {
    let h = Harness::with_config(LedgerConfig { sample_limit_max: 2, ..LedgerConfig::default() });
    let lipseys = h.register("lipseys");
    for item in ["C", "A", "B"] {
        h.catalog.upsert_product(&lipseys, item, &fields("Acme", "Widget", 100, 1)).unwrap();
    }

    let sample: Vec<String> =
        h.catalog.get_sample(&lipseys, 50).unwrap().into_iter().map(|p| p.item_number).collect();
    assert_eq!(sample, vec!["A", "B"]);
    assert!(h.catalog.get_sample(&lipseys, 0).unwrap().is_empty());
    assert!(matches!(
        h.catalog.get_sample(&id("ghost"), 5),
        Err(FflBroError::UnknownDistributor(_))
    ));
}
