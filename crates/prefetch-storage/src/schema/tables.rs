//! Predictor table definitions.
//! Two resource keyspaces, two redirect keyspaces, one metadata table.

pub const METADATA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS predictor_metadata (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL
) STRICT;
"#;

pub const CREATE_SQL: &str = r#"
-- Resource aggregates keyed by full page URL.
-- `resources` is a JSON array of resource records, ranked by score.
CREATE TABLE IF NOT EXISTS url_resource_data (
    primary_key TEXT PRIMARY KEY,
    last_visit INTEGER NOT NULL,
    resources TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_url_resource_data_visit
    ON url_resource_data(last_visit);

-- Resource aggregates keyed by host.
CREATE TABLE IF NOT EXISTS host_resource_data (
    primary_key TEXT PRIMARY KEY,
    last_visit INTEGER NOT NULL,
    resources TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_host_resource_data_visit
    ON host_resource_data(last_visit);

-- Redirect endpoints keyed by full page URL.
CREATE TABLE IF NOT EXISTS url_redirect_data (
    primary_key TEXT PRIMARY KEY,
    last_visit INTEGER NOT NULL,
    endpoints TEXT NOT NULL
) STRICT;

-- Redirect endpoints keyed by host.
CREATE TABLE IF NOT EXISTS host_redirect_data (
    primary_key TEXT PRIMARY KEY,
    last_visit INTEGER NOT NULL,
    endpoints TEXT NOT NULL
) STRICT;
"#;

pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS url_resource_data;
DROP TABLE IF EXISTS host_resource_data;
DROP TABLE IF EXISTS url_redirect_data;
DROP TABLE IF EXISTS host_redirect_data;
"#;
