//! End-to-end coverage of the four services over the SQLite backend.
//!
//! Each test runs against an isolated database with migrations applied and
//! the default distributor registry seeded from configuration.

mod support;

use chrono::Duration;
use fflbro_domain::{
    CustomerInfo, FflBroError, LineItem, QuoteFilter, QuoteStatus, ReadinessState, SearchQuery,
    SyncStatus,
};
use rust_decimal::Decimal;
use support::{fields, id, TestLedger};

fn item_numbers(search: fflbro_core::ProductSearch) -> Vec<String> {
    search.map(|p| p.expect("search page").item_number).collect()
}

#[test]
fn registry_is_seeded_in_configuration_order() {
    let ledger = TestLedger::new();
    let distributors = ledger.context.registry.list_distributors().unwrap();

    let ids: Vec<&str> = distributors.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["lipseys", "rsr", "davidsons", "zanders", "sports_south", "orion"]);
    assert_eq!(ledger.context.registry.get_status(&id("lipseys")).unwrap(), ReadinessState::Ready);
    assert_eq!(ledger.context.registry.get_status(&id("rsr")).unwrap(), ReadinessState::Pending);
}

#[test]
fn reseeding_preserves_stored_status() {
    let ledger = TestLedger::new();
    ledger.context.registry.set_status(&id("rsr"), ReadinessState::Ready).unwrap();

    let reopened = ledger.reopen();
    assert_eq!(reopened.registry.get_status(&id("rsr")).unwrap(), ReadinessState::Ready);
    assert_eq!(reopened.registry.list_distributors().unwrap().len(), 6);
}

#[test]
fn lipseys_sync_runs_to_completion() {
    let ledger = TestLedger::new();
    let tracker = &ledger.context.tracker;
    let lipseys = id("lipseys");

    let started = tracker.start_sync(&lipseys, 1000).unwrap();
    assert_eq!(started.status, SyncStatus::Running);
    assert_eq!(started.processed_items, 0);

    for batch in 1..=4 {
        ledger.clock.advance(Duration::seconds(5));
        let progress =
            tracker.report_progress(&lipseys, 250, &format!("batch {batch}")).unwrap();
        assert_eq!(progress.processed_items, batch * 250);
    }

    let done = tracker.complete_sync(&lipseys).unwrap();
    assert_eq!(done.status, SyncStatus::Completed);
    assert_eq!(done.processed_items, 1000);
    assert_eq!(done.total_items, 1000);
    assert_eq!(done.percent_complete(), Some(100.0));
    assert_eq!(done.current_item.as_deref(), Some("batch 4"));
}

#[test]
fn failed_run_keeps_partial_progress_across_restart() {
    let ledger = TestLedger::new();
    let rsr = id("rsr");

    ledger.context.tracker.start_sync(&rsr, 0).unwrap();
    ledger.context.tracker.report_progress(&rsr, 42, "RSR-000042").unwrap();
    ledger.context.tracker.fail_sync(&rsr, "ftp connection reset").unwrap();

    let reopened = ledger.reopen();
    let progress = reopened.tracker.get_progress(&rsr).unwrap();
    assert_eq!(progress.status, SyncStatus::Failed);
    assert_eq!(progress.processed_items, 42);
    assert_eq!(progress.total_items, 42);
    assert_eq!(progress.last_error.as_deref(), Some("ftp connection reset"));

    let restarted = reopened.tracker.start_sync(&rsr, 10).unwrap();
    assert_eq!(restarted.processed_items, 0);
    assert_eq!(restarted.last_error, None);
}

#[test]
fn second_start_is_rejected_while_running() {
    let ledger = TestLedger::new();
    let lipseys = id("lipseys");

    ledger.context.tracker.start_sync(&lipseys, 10).unwrap();
    let err = ledger.context.tracker.start_sync(&lipseys, 10).unwrap_err();
    assert!(matches!(err, FflBroError::AlreadyRunning(_)));

    let err = ledger.context.tracker.start_sync(&id("ghost"), 10).unwrap_err();
    assert!(matches!(err, FflBroError::UnknownDistributor(_)));
}

#[test]
fn sig_search_pages_through_sqlite_in_relevance_order() {
    let ledger = TestLedger::with_config(|config| config.ledger.search_page_size = 2);
    let catalog = &ledger.context.catalog;
    let (lipseys, rsr) = (id("lipseys"), id("rsr"));

    catalog.upsert_product(&lipseys, "SIG-P365", &fields("SIG Sauer", "P365 9mm", 59999, 4)).unwrap();
    catalog.upsert_product(&rsr, "SIG-P320", &fields("Sig Sauer", "P320 Compact", 54900, 0)).unwrap();
    catalog.upsert_product(&lipseys, "SIG", &fields("sig", "Branded cap", 1999, 10)).unwrap();
    catalog.upsert_product(&rsr, "HLS-SIG", &fields("Holosun", "Optic for SIG P365", 29900, 2)).unwrap();
    catalog.upsert_product(&lipseys, "GLK-19", &fields("Glock", "G19 Gen5", 43890, 15)).unwrap();

    let results = item_numbers(catalog.search(SearchQuery::new("SIG")).unwrap());
    assert_eq!(results, vec!["SIG", "SIG-P320", "SIG-P365", "HLS-SIG"]);

    let in_stock = item_numbers(catalog.search(SearchQuery::new("sig").in_stock_only()).unwrap());
    assert_eq!(in_stock, vec!["SIG", "SIG-P365", "HLS-SIG"]);

    let rsr_only = item_numbers(catalog.search(SearchQuery::new("sig").distributor(rsr)).unwrap());
    assert_eq!(rsr_only, vec!["SIG-P320", "HLS-SIG"]);

    let everything = item_numbers(catalog.search(SearchQuery::new("")).unwrap());
    assert_eq!(everything, vec!["SIG", "HLS-SIG", "GLK-19", "SIG-P320", "SIG-P365"]);
}

#[test]
fn catalog_stats_and_samples_come_from_sqlite() {
    let ledger = TestLedger::with_config(|config| config.ledger.sample_limit_max = 2);
    let catalog = &ledger.context.catalog;
    let lipseys = id("lipseys");

    catalog.upsert_product(&lipseys, "C-3", &fields("Ruger", "10/22", 29900, 0)).unwrap();
    catalog.upsert_product(&lipseys, "A-1", &fields("Glock", "G19", 43890, 15)).unwrap();
    catalog.upsert_product(&lipseys, "B-2", &fields("Glock", "G17", 44900, 3)).unwrap();
    catalog.upsert_product(&id("zanders"), "FED-9", &fields("Federal", "9mm FMJ", 1899, 240)).unwrap();

    let stats = catalog.catalog_stats().unwrap();
    assert_eq!(stats.total_products, 4);
    assert_eq!(stats.in_stock_products, 3);
    assert_eq!(stats.by_distributor.get(&lipseys), Some(&3));
    assert_eq!(stats.by_distributor.get(&id("rsr")), None);

    let sample = catalog.get_sample(&lipseys, 10).unwrap();
    let items: Vec<&str> = sample.iter().map(|p| p.item_number.as_str()).collect();
    assert_eq!(items, vec!["A-1", "B-2"]);
}

#[test]
fn distributor_with_products_cannot_be_removed() {
    let ledger = TestLedger::new();
    let registry = &ledger.context.registry;
    let orion = id("orion");

    ledger.context.catalog.upsert_product(&orion, "MAG-30", &fields("Magpul", "PMAG", 1595, 0)).unwrap();
    assert!(matches!(registry.remove_distributor(&orion), Err(FflBroError::InUse(_))));

    registry.remove_distributor(&id("davidsons")).unwrap();
    assert!(matches!(
        registry.remove_distributor(&id("davidsons")),
        Err(FflBroError::UnknownDistributor(_))
    ));
}

#[test]
fn smith_quote_survives_restart_and_numbering_continues() {
    let ledger = TestLedger::with_config(|config| config.ledger.tax_rate = Decimal::new(825, 4));
    let customer = CustomerInfo::named("John Smith").with_email("john@example.com");
    let line = LineItem::new("Glock 19", Decimal::new(550, 0), 1);

    let quote = ledger.context.ledger.create_quote(customer.clone(), vec![line.clone()]).unwrap();
    assert_eq!(quote.quote_number, "Q2026-00001");
    assert_eq!(quote.tax, Decimal::new(4538, 2));
    assert_eq!(quote.total, Decimal::new(59538, 2));

    let reopened = ledger.reopen();
    let stored = reopened.ledger.get_quote("Q2026-00001").unwrap();
    assert_eq!(stored, quote);

    let next = reopened.ledger.create_quote(customer, vec![line]).unwrap();
    assert_eq!(next.quote_number, "Q2026-00002");
}

#[test]
fn overdue_quotes_expire_lazily_in_sqlite() {
    let ledger = TestLedger::new();
    let quotes = &ledger.context.ledger;
    let line = LineItem::new("Holosun 507C", Decimal::new(29999, 2), 1);

    let pending = quotes.create_quote(CustomerInfo::named("A. Pending"), vec![line.clone()]).unwrap();
    let approved = quotes
        .create_quote(CustomerInfo::named("B. Approved").with_email("B@Example.com"), vec![line])
        .unwrap();
    quotes.transition_status(&approved.quote_number, QuoteStatus::Sent).unwrap();
    quotes.transition_status(&approved.quote_number, QuoteStatus::Approved).unwrap();

    ledger.clock.advance(Duration::days(30));
    assert_eq!(quotes.get_quote(&pending.quote_number).unwrap().status, QuoteStatus::Pending);

    ledger.clock.advance(Duration::seconds(1));
    let expired: Vec<String> = quotes
        .list_quotes(QuoteFilter::default().status(QuoteStatus::Expired))
        .unwrap()
        .map(|q| q.unwrap().quote_number)
        .collect();
    assert_eq!(expired, vec![pending.quote_number.clone()]);

    let by_email: Vec<QuoteStatus> = quotes
        .list_quotes(QuoteFilter::default().customer_email("b@example.com"))
        .unwrap()
        .map(|q| q.unwrap().status)
        .collect();
    assert_eq!(by_email, vec![QuoteStatus::Approved]);

    let err = quotes.transition_status(&pending.quote_number, QuoteStatus::Sent).unwrap_err();
    assert!(matches!(err, FflBroError::InvalidTransition(_)));
}

#[test]
fn unknown_quote_is_not_found() {
    let ledger = TestLedger::new();
    let err = ledger.context.ledger.get_quote("Q2026-99999").unwrap_err();
    assert!(matches!(err, FflBroError::NotFound(_)));
}

#[test]
fn database_file_and_health_check() {
    let ledger = TestLedger::new();
    let db = ledger.context.database().expect("sqlite backend");
    db.health_check().unwrap();
    assert_eq!(db.path(), ledger.db_path().as_path());
}
