//! SQL schema for the Lobby SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Employee roster. Row order is roster order.
CREATE TABLE IF NOT EXISTS hosts (
    host_id   TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    division  TEXT NOT NULL DEFAULT '',
    org_unit  TEXT NOT NULL DEFAULT '',
    service   TEXT NOT NULL DEFAULT '',
    location  TEXT NOT NULL DEFAULT '',
    phone     TEXT NOT NULL DEFAULT ''
);

-- One row per check-in. Rows are never deleted; only status, ended_at and
-- discharge_observations change after insert. The host columns are a
-- snapshot taken at submission; host_id is not a foreign key.
CREATE TABLE IF NOT EXISTS visits (
    visit_id               TEXT PRIMARY KEY,
    identifier             TEXT NOT NULL,
    visitor_name           TEXT NOT NULL,
    company                TEXT NOT NULL,
    reason                 TEXT NOT NULL,
    card_number            TEXT NOT NULL,
    party_size             INTEGER NOT NULL CHECK (party_size > 0),
    color                  TEXT NOT NULL,
    observations           TEXT NOT NULL,
    host_id                TEXT NOT NULL,
    host_name              TEXT NOT NULL,
    division               TEXT NOT NULL,
    org_unit               TEXT NOT NULL,
    service                TEXT NOT NULL,
    location               TEXT NOT NULL,
    phone                  TEXT NOT NULL,
    status                 TEXT NOT NULL,   -- 'pending' | 'active' | 'completed'
    created_at             TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    ended_at               TEXT,
    discharge_observations TEXT
);

CREATE INDEX IF NOT EXISTS visits_status_idx     ON visits(status);
CREATE INDEX IF NOT EXISTS visits_created_idx    ON visits(created_at);
CREATE INDEX IF NOT EXISTS visits_identifier_idx ON visits(identifier);

PRAGMA user_version = 1;
";
