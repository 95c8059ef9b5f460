use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS images (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            original_path   TEXT NOT NULL,
            web_path        TEXT,
            thumbnail_path  TEXT,
            processed_at    INTEGER,
            CHECK (
                (web_path IS NULL AND thumbnail_path IS NULL AND processed_at IS NULL)
                OR (web_path IS NOT NULL AND thumbnail_path IS NOT NULL AND processed_at IS NOT NULL)
            )
        );

        CREATE INDEX IF NOT EXISTS idx_images_processed_at ON images(processed_at);

        CREATE TABLE IF NOT EXISTS config (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// Version recorded in `config`, or `None` on a fresh database.
pub fn stored_version(conn: &Connection) -> Result<Option<u32>> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM config WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    stored
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| Error::InvalidSchemaVersion(v.clone()))
        })
        .transpose()
}

/// Stamp or verify the schema version stored in `config`.
pub fn migrate(conn: &Connection) -> Result<()> {
    match stored_version(conn)? {
        None => {
            conn.execute(
                "INSERT INTO config (key, value) VALUES ('schema_version', ?1)",
                [SCHEMA_VERSION.to_string()],
            )?;
        }
        Some(db) if db > SCHEMA_VERSION => {
            return Err(Error::SchemaTooNew {
                db,
                code: SCHEMA_VERSION,
            });
        }
        Some(_) => {}
    }
    Ok(())
}
