//! SQL schema for the aqualog SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    profile_id       TEXT PRIMARY KEY,
    name             TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash    TEXT NOT NULL,   -- argon2 PHC string
    address          TEXT NOT NULL,
    apartment_number TEXT NOT NULL,
    floor_number     TEXT NOT NULL,
    meter_serial     TEXT NOT NULL,
    created_at       TEXT NOT NULL    -- ISO 8601 UTC
);

-- Readings are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table, and rowid order
-- is the ledger's append order.
CREATE TABLE IF NOT EXISTS readings (
    reading_id  TEXT PRIMARY KEY,
    profile_id  TEXT NOT NULL REFERENCES profiles(profile_id),
    consumption REAL NOT NULL CHECK (consumption >= 0),
    recorded_at TEXT NOT NULL
);

-- Rewards are strictly append-only as well.
CREATE TABLE IF NOT EXISTS rewards (
    reward_id   TEXT PRIMARY KEY,
    profile_id  TEXT NOT NULL REFERENCES profiles(profile_id),
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    kind        TEXT NOT NULL,   -- 'badge' | 'coupon'
    icon        TEXT NOT NULL,
    earned_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS readings_profile_idx ON readings(profile_id);
CREATE INDEX IF NOT EXISTS rewards_profile_idx  ON rewards(profile_id);

PRAGMA user_version = 1;
";
