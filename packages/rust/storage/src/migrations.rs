//! SQL migration definitions for the briefcast store.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as a batch.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: api_config singleton, feed_cache",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Singleton API configuration row (id is always 'default')
CREATE TABLE IF NOT EXISTS api_config (
    id             TEXT PRIMARY KEY,
    search_api_key TEXT,
    reader_api_key TEXT,
    llm_api_key    TEXT,
    llm_base_url   TEXT,
    llm_model      TEXT,
    updated        INTEGER
);

-- Memoized feed-source results, keyed by source identifier
CREATE TABLE IF NOT EXISTS feed_cache (
    id      TEXT PRIMARY KEY,
    updated INTEGER NOT NULL,
    data    TEXT NOT NULL
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
