//! SQL schema for the FarmShift SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS farms (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    location    TEXT,
    type        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workers (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT,
    phone       TEXT,
    created_at  TEXT NOT NULL
);

-- A farm or worker cannot be deleted while shifts still reference it.
CREATE TABLE IF NOT EXISTS shifts (
    id          TEXT PRIMARY KEY,
    worker_id   TEXT NOT NULL REFERENCES workers(id) ON DELETE RESTRICT,
    farm_id     TEXT          REFERENCES farms(id)   ON DELETE RESTRICT,
    shift_date  TEXT NOT NULL,   -- YYYY-MM-DD
    shift_type  TEXT NOT NULL
                CHECK (shift_type IN ('Morning', 'Evening', 'Night', 'Off')),
    start_time  TEXT,            -- HH:MM:SS
    end_time    TEXT,
    notes       TEXT,
    status      TEXT NOT NULL DEFAULT 'scheduled'
                CHECK (status IN ('scheduled', 'completed', 'cancelled')),
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS shifts_date_idx   ON shifts(shift_date);
CREATE INDEX IF NOT EXISTS shifts_worker_idx ON shifts(worker_id);
CREATE INDEX IF NOT EXISTS shifts_farm_idx   ON shifts(farm_id);

PRAGMA user_version = 1;
";
