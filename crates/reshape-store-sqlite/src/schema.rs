//! SQL schema for the Reshape SQLite store.
//!
//! Executed once at connection startup. Future storage changes will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS collections (
    name        TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL     -- RFC 3339 UTC
);

-- doc_id gives documents their natural (insertion) order.
CREATE TABLE IF NOT EXISTS documents (
    doc_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    collection  TEXT NOT NULL REFERENCES collections(name),
    body        TEXT NOT NULL     -- JSON object
);

CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents(collection);

PRAGMA user_version = 1;
";
