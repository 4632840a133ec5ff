//! SQL schema for the lanqa SQLite store.
//!
//! Executed on every successful connect. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS qa_pairs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Interactions are append-only.
CREATE TABLE IF NOT EXISTS chat_history (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    timestamp   TEXT NOT NULL   -- local time, 'YYYY-MM-DD HH:MM:SS'
);

CREATE INDEX IF NOT EXISTS chat_history_timestamp_idx ON chat_history(timestamp);

PRAGMA user_version = 1;
";
