//! Shared fixtures for the store integration tests.

#![allow(dead_code)]

use std::path::Path;

use prefetch_core::config::PredictorConfig;
use prefetch_core::types::{
    PageAggregate, PrefetchDataMap, PrefetchKeyType, RequestPriority, ResourceCategory,
    ResourceRecord,
};
use prefetch_storage::queries::Table;
use prefetch_storage::PredictorStore;
use rusqlite::{params, Connection};

#[allow(clippy::too_many_arguments)]
pub fn resource(
    url: &str,
    category: ResourceCategory,
    hits: u32,
    misses: u32,
    consecutive_misses: u32,
    position: f64,
    has_validators: bool,
    always_revalidate: bool,
) -> ResourceRecord {
    ResourceRecord::new(
        url,
        category,
        hits,
        misses,
        consecutive_misses,
        position,
        RequestPriority::Medium,
        has_validators,
        always_revalidate,
    )
}

pub fn simple(url: &str, category: ResourceCategory, hits: u32, misses: u32, position: f64) -> ResourceRecord {
    resource(url, category, hits, misses, 0, position, false, false)
}

/// The sample data every store test starts from.
pub struct Sample {
    pub url_data: PrefetchDataMap,
    pub host_data: PrefetchDataMap,
}

impl Sample {
    pub fn new() -> Self {
        let mut google = PageAggregate::new(PrefetchKeyType::Url, "http://www.google.com").with_last_visit(1);
        google.resources = vec![
            resource("http://www.google.com/style.css", ResourceCategory::Stylesheet, 5, 2, 1, 1.1, false, false),
            resource("http://www.google.com/script.js", ResourceCategory::Script, 4, 0, 1, 2.1, false, false),
            resource("http://www.google.com/image.png", ResourceCategory::Image, 6, 3, 0, 2.2, false, false),
            resource("http://www.google.com/a.font", ResourceCategory::Other, 2, 0, 0, 5.1, false, false),
            resource("http://www.resources.google.com/script.js", ResourceCategory::Script, 11, 0, 0, 8.5, false, false),
        ];

        let mut reddit = PageAggregate::new(PrefetchKeyType::Url, "http://www.reddit.com").with_last_visit(2);
        reddit.resources = vec![
            resource("http://reddit-resource.com/script1.js", ResourceCategory::Script, 4, 0, 1, 1.0, false, false),
            resource("http://reddit-resource.com/script2.js", ResourceCategory::Script, 2, 0, 0, 2.1, false, false),
        ];

        let mut yahoo = PageAggregate::new(PrefetchKeyType::Url, "http://www.yahoo.com").with_last_visit(3);
        yahoo.resources = vec![simple("http://www.google.com/image.png", ResourceCategory::Image, 20, 1, 10.0)];

        let mut facebook = PageAggregate::new(PrefetchKeyType::Host, "www.facebook.com").with_last_visit(4);
        facebook.resources = vec![
            resource("http://www.facebook.com/style.css", ResourceCategory::Stylesheet, 5, 2, 1, 1.1, false, false),
            resource("http://www.facebook.com/script.js", ResourceCategory::Script, 4, 0, 1, 2.1, false, false),
            resource("http://www.facebook.com/image.png", ResourceCategory::Image, 6, 3, 0, 2.2, false, false),
            resource("http://www.facebook.com/a.font", ResourceCategory::Other, 2, 0, 0, 5.1, false, false),
            resource("http://www.resources.facebook.com/script.js", ResourceCategory::Script, 11, 0, 0, 8.5, false, false),
        ];

        let mut yahoo_host = PageAggregate::new(PrefetchKeyType::Host, "www.yahoo.com").with_last_visit(5);
        yahoo_host.resources = vec![simple("http://www.google.com/image.png", ResourceCategory::Image, 20, 1, 10.0)];

        let url_data = [google, reddit, yahoo]
            .into_iter()
            .map(|a| (a.primary_key.clone(), a))
            .collect();
        let host_data = [facebook, yahoo_host]
            .into_iter()
            .map(|a| (a.primary_key.clone(), a))
            .collect();
        Self { url_data, host_data }
    }

    /// Write the sample through the store, one keyspace per call.
    pub fn load_into(&self, store: &PredictorStore) {
        for aggregate in self.url_data.values() {
            store
                .update_data(aggregate.clone(), PageAggregate::empty(PrefetchKeyType::Host))
                .wait()
                .unwrap();
        }
        for aggregate in self.host_data.values() {
            store
                .update_data(PageAggregate::empty(PrefetchKeyType::Url), aggregate.clone())
                .wait()
                .unwrap();
        }
    }

    /// Expected map holding only the given keys of the sample.
    pub fn subset(&self, keys: &[&str]) -> PrefetchDataMap {
        keys.iter()
            .map(|k| {
                let aggregate = self
                    .url_data
                    .get(*k)
                    .or_else(|| self.host_data.get(*k))
                    .unwrap_or_else(|| panic!("{k} not in sample"));
                (k.to_string(), aggregate.clone())
            })
            .collect()
    }
}

/// Same key, visit time and records, ignoring record order.
pub fn same_contents(a: &PageAggregate, b: &PageAggregate) -> bool {
    a.key_type == b.key_type
        && a.primary_key == b.primary_key
        && a.last_visit == b.last_visit
        && a.resources.len() == b.resources.len()
        && a.resources
            .iter()
            .all(|r| b.resources.iter().any(|other| other == r))
}

/// Number of rows stored in `table`.
pub fn row_count(conn: &Connection, table: Table) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name()), [], |row| row.get(0))
        .unwrap()
}

/// True when `table` holds a row for `primary_key`.
pub fn has_row(conn: &Connection, table: Table, primary_key: &str) -> bool {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE primary_key = ?1)", table.name()),
        params![primary_key],
        |row| row.get(0),
    )
    .unwrap()
}

/// Same keys, and per key the same records regardless of order.
pub fn assert_maps_equal(expected: &PrefetchDataMap, actual: &PrefetchDataMap) {
    assert_eq!(
        expected.keys().collect::<Vec<_>>(),
        actual.keys().collect::<Vec<_>>(),
        "keyspaces differ"
    );
    for (key, want) in expected {
        let got = &actual[key];
        assert!(
            same_contents(want, got),
            "aggregate {key} differs:\nexpected {want:#?}\nactual {got:#?}"
        );
    }
}

pub fn open(path: &Path) -> PredictorStore {
    prefetch_core::tracing::init_tracing();
    PredictorStore::open(path, &PredictorConfig::default()).unwrap()
}

pub fn open_with(path: &Path, toml: &str) -> PredictorStore {
    let config = PredictorConfig::from_toml(toml).unwrap();
    PredictorStore::open(path, &config).unwrap()
}
