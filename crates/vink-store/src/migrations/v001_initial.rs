//! v001 -- Initial schema creation.
//!
//! Creates the two core tables: `vanishes` and `attachments`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Vanishes (ephemeral records)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS vanishes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    public_id    TEXT NOT NULL UNIQUE,         -- short external identifier
    title        TEXT,
    content      TEXT NOT NULL,                -- inline text, or primary file name
    content_kind TEXT NOT NULL DEFAULT 'TEXT', -- TEXT | IMAGE | FILE
    file_url     TEXT,                         -- primary blob URL (single-file compat)
    is_one_time  INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    created_at   TEXT NOT NULL,                -- ISO-8601 / RFC-3339
    expires_at   TEXT                          -- NULL = never expires
);

CREATE INDEX IF NOT EXISTS idx_vanishes_expires_at ON vanishes(expires_at);

-- ----------------------------------------------------------------
-- Attachments (uploaded file metadata, owned by a vanish)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS attachments (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    vanish_id          INTEGER NOT NULL,       -- FK -> vanishes(id)
    original_file_name TEXT NOT NULL,
    file_url           TEXT NOT NULL,
    file_size          INTEGER NOT NULL,
    file_type          TEXT,                   -- declared MIME type

    FOREIGN KEY (vanish_id) REFERENCES vanishes(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_attachments_vanish_id ON attachments(vanish_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
