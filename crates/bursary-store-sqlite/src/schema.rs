//! SQL schema for the bursary pack SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Listings are owned by the admin back-office; the pipeline only reads them.
CREATE TABLE IF NOT EXISTS accommodations (
    id               TEXT PRIMARY KEY,
    property_name    TEXT NOT NULL,
    property_type    TEXT NOT NULL,
    address          TEXT NOT NULL,
    city             TEXT NOT NULL,
    province         TEXT NOT NULL,
    university       TEXT,
    monthly_cost     REAL NOT NULL,
    rooms_available  INTEGER NOT NULL DEFAULT 0,
    amenities        TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    nsfas_accredited INTEGER NOT NULL DEFAULT 0,
    status           TEXT NOT NULL DEFAULT 'active', -- 'active' | 'inactive' | 'pending'
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bursaries (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    provider     TEXT NOT NULL,
    amount       REAL,
    criteria     TEXT,
    requirements TEXT,
    status       TEXT NOT NULL DEFAULT 'active',
    created_at   TEXT NOT NULL
);

-- Expiry is checked at read time; expired rows stay until overwritten.
CREATE TABLE IF NOT EXISTS ai_pack_cache (
    cache_key  TEXT PRIMARY KEY,
    pack_data  TEXT NOT NULL,   -- JSON PackResult
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ai_pack_requests (
    id            TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    request_data  TEXT NOT NULL,  -- JSON Preferences
    status        TEXT NOT NULL DEFAULT 'processing',
    response_data TEXT,           -- JSON PackResult
    from_cache    INTEGER,
    error         TEXT,
    created_at    TEXT NOT NULL,
    completed_at  TEXT,
    CHECK (status IN ('processing', 'completed', 'failed'))
);

CREATE TABLE IF NOT EXISTS ai_settings (
    feature_name TEXT PRIMARY KEY,
    is_enabled   INTEGER NOT NULL DEFAULT 0,
    updated_at   TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is ever stored.
CREATE TABLE IF NOT EXISTS api_tokens (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    is_admin   INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS accommodations_filter_idx ON accommodations(status, city, university);
CREATE INDEX IF NOT EXISTS bursaries_status_idx      ON bursaries(status);
CREATE INDEX IF NOT EXISTS ai_pack_cache_expiry_idx  ON ai_pack_cache(expires_at);
CREATE INDEX IF NOT EXISTS ai_pack_requests_user_idx ON ai_pack_requests(user_id, created_at);

PRAGMA user_version = 1;
";
