//! Keyspace caps, per-aggregate trimming and write-time validation.

mod common;

use common::{open_with, simple};
use prefetch_core::errors::StorageError;
use prefetch_core::types::{PageAggregate, PrefetchKeyType, ResourceCategory};
use prefetch_storage::queries::Table;
use rusqlite::Connection;
use tempfile::TempDir;

fn page(key_type: PrefetchKeyType, key: &str, last_visit: i64) -> PageAggregate {
    let mut aggregate = PageAggregate::new(key_type, key).with_last_visit(last_visit);
    aggregate.resources = vec![simple(&format!("{key}/a.js"), ResourceCategory::Script, 1, 0, 1.0)];
    aggregate
}

fn url(key: &str, last_visit: i64) -> PageAggregate {
    page(PrefetchKeyType::Url, key, last_visit)
}

fn host(key: &str, last_visit: i64) -> PageAggregate {
    page(PrefetchKeyType::Host, key, last_visit)
}

fn no_url() -> PageAggregate {
    PageAggregate::empty(PrefetchKeyType::Url)
}

fn no_host() -> PageAggregate {
    PageAggregate::empty(PrefetchKeyType::Host)
}

#[test]
fn oldest_url_is_evicted_past_the_cap() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("predictor.db");
    let store = open_with(&path, "[limits]\nmax_urls_to_track = 2\n");

    store.update_data(url("http://a.com", 30), no_host()).wait().unwrap();
    store.update_data(url("http://b.com", 10), no_host()).wait().unwrap();
    store.update_data(url("http://c.com", 20), no_host()).wait().unwrap();

    let (urls, _) = store.get_all_data().wait().unwrap();
    let keys: Vec<_> = urls.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["http://a.com", "http://c.com"]);

    let stats = store.shutdown().unwrap();
    assert_eq!(stats.evictions, 1);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(common::row_count(&conn, Table::UrlResources), 2);
}

#[test]
fn host_cap_is_independent_of_url_cap() {
    let dir = TempDir::new().unwrap();
    let store = open_with(
        &dir.path().join("predictor.db"),
        "[limits]\nmax_urls_to_track = 5\nmax_hosts_to_track = 1\n",
    );

    store.update_data(url("http://a.com", 1), host("a.com", 1)).wait().unwrap();
    store.update_data(url("http://b.com", 2), host("b.com", 2)).wait().unwrap();

    let (urls, hosts) = store.get_all_data().wait().unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(hosts.keys().collect::<Vec<_>>(), vec!["b.com"]);
}

#[test]
fn refreshing_an_existing_key_does_not_evict() {
    let dir = TempDir::new().unwrap();
    let store = open_with(&dir.path().join("predictor.db"), "[limits]\nmax_urls_to_track = 2\n");

    store.update_data(url("http://a.com", 1), no_host()).wait().unwrap();
    store.update_data(url("http://b.com", 2), no_host()).wait().unwrap();
    store.update_data(url("http://a.com", 3), no_host()).wait().unwrap();

    let (urls, _) = store.get_all_data().wait().unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls["http://a.com"].last_visit, 3);
}

#[test]
fn resources_are_trimmed_to_the_best() {
    let dir = TempDir::new().unwrap();
    let store = open_with(
        &dir.path().join("predictor.db"),
        "[limits]\nmax_resources_per_entry = 2\n",
    );

    let mut aggregate = PageAggregate::new(PrefetchKeyType::Url, "http://a.com").with_last_visit(1);
    aggregate.resources = vec![
        simple("http://a.com/image.png", ResourceCategory::Image, 5, 0, 1.0),
        simple("http://a.com/style.css", ResourceCategory::Stylesheet, 5, 0, 4.0),
        simple("http://a.com/late.js", ResourceCategory::Script, 5, 0, 9.0),
    ];
    store.update_data(aggregate, no_host()).wait().unwrap();

    let stored = store
        .get_data("http://a.com", PrefetchKeyType::Url)
        .wait()
        .unwrap()
        .unwrap();
    let urls: Vec<_> = stored.resources.iter().map(|r| r.resource_url.as_str()).collect();
    assert_eq!(urls, vec!["http://a.com/style.css", "http://a.com/late.js"]);
}

#[test]
fn unobserved_and_duplicate_records_are_dropped() {
    let dir = TempDir::new().unwrap();
    let store = open_with(&dir.path().join("predictor.db"), "");

    let mut aggregate = PageAggregate::new(PrefetchKeyType::Url, "http://a.com").with_last_visit(1);
    aggregate.resources = vec![
        simple("http://a.com/never.js", ResourceCategory::Script, 0, 0, 1.0),
        simple("http://a.com/twice.js", ResourceCategory::Script, 2, 0, 1.0),
        simple("http://a.com/twice.js", ResourceCategory::Script, 7, 0, 3.0),
        simple("http://a.com/nan.png", ResourceCategory::Image, 1, 0, f64::NAN),
    ];
    store.update_data(aggregate, no_host()).wait().unwrap();

    let stored = store
        .get_data("http://a.com", PrefetchKeyType::Url)
        .wait()
        .unwrap()
        .unwrap();
    assert_eq!(stored.resources.len(), 1);
    assert_eq!(stored.resources[0].resource_url, "http://a.com/twice.js");
    assert_eq!(stored.resources[0].hit_count, 2);
}

#[test]
fn over_long_key_is_skipped_but_other_keyspace_is_written() {
    let dir = TempDir::new().unwrap();
    let store = open_with(&dir.path().join("predictor.db"), "[limits]\nmax_string_length = 32\n");

    let long_url = format!("http://a.com/{}", "x".repeat(64));
    store
        .update_data(url(&long_url, 1), host("a.com", 1))
        .wait()
        .unwrap();

    let (urls, hosts) = store.get_all_data().wait().unwrap();
    assert!(urls.is_empty());
    assert_eq!(hosts.len(), 1);
}

#[test]
fn mismatched_key_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_with(&dir.path().join("predictor.db"), "");

    let result = store
        .update_data(host("a.com", 1), no_host())
        .wait();
    assert!(matches!(result, Err(StorageError::InvalidInput { .. })));

    let (urls, hosts) = store.get_all_data().wait().unwrap();
    assert!(urls.is_empty());
    assert!(hosts.is_empty());
}

#[test]
fn calls_without_rows_commit_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_with(&dir.path().join("predictor.db"), "");

    store.update_data(no_url(), no_host()).wait().unwrap();
    store.delete_data(&[], &[]).wait().unwrap();
    store.delete_redirect_data(&[], &[]).wait().unwrap();

    let stats = store.stats().wait().unwrap();
    assert_eq!(stats.rows_written, 0);
    assert_eq!(stats.commits, 0);
    assert_eq!(stats.failed_writes, 0);

    store.update_data(url("http://a.com", 1), no_host()).wait().unwrap();
    store.delete_all_data().wait().unwrap();
    let stats = store.stats().wait().unwrap();
    assert_eq!(stats.commits, 2);
}
