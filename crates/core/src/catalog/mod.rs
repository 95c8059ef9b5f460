pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Row};

use crate::domain::*;
use crate::error::{Error, Result};

/// SQLite-backed catalog of source images and their derivative state.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open or create a catalog at the given path with WAL mode.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        schema::initialize(&conn)?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory catalog (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    // ── Images ───────────────────────────────────────────────────────

    /// Record a stored original. Derivative fields start out unset.
    pub fn insert_image(&self, original_path: &Path) -> Result<SourceImage> {
        self.conn.execute(
            "INSERT INTO images (original_path) VALUES (?1)",
            params![path_to_sql(original_path)],
        )?;
        Ok(SourceImage {
            id: self.conn.last_insert_rowid(),
            original_path: original_path.to_path_buf(),
            web_path: None,
            thumbnail_path: None,
            processed_at: None,
        })
    }

    pub fn get_image(&self, id: i64) -> Result<SourceImage> {
        self.conn
            .query_row(
                "SELECT id, original_path, web_path, thumbnail_path, processed_at
                 FROM images WHERE id = ?1",
                params![id],
                image_from_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Error::ImageNotFound(id),
                other => Error::Database(other),
            })
    }

    /// Images without a completion marker, oldest id first.
    /// `limit` of `None` or `Some(0)` means no limit.
    pub fn list_unprocessed(&self, limit: Option<usize>) -> Result<Vec<SourceImage>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit: i64 = match limit {
            Some(n) if n > 0 => n as i64,
            _ => -1,
        };
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, original_path, web_path, thumbnail_path, processed_at
             FROM images
             WHERE processed_at IS NULL AND original_path IS NOT NULL
             ORDER BY id ASC
             LIMIT ?1",
        )?;
        let images = stmt
            .query_map(params![limit], image_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(images)
    }

    /// Commit both derivative paths and the completion marker in one statement.
    pub fn mark_processed(
        &self,
        id: i64,
        web_path: &Path,
        thumbnail_path: &Path,
        processed_at: i64,
    ) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "UPDATE images SET web_path = ?1, thumbnail_path = ?2, processed_at = ?3 WHERE id = ?4",
        )?;
        let updated = stmt.execute(params![
            path_to_sql(web_path),
            path_to_sql(thumbnail_path),
            processed_at,
            id
        ])?;
        if updated == 0 {
            return Err(Error::ImageNotFound(id));
        }
        Ok(())
    }

    /// Clear derivative state on every image so the next run regenerates it.
    /// Files on disk are left alone. Returns the number of images reset.
    pub fn reset_all(&self) -> Result<usize> {
        let count = self.conn.execute(
            "UPDATE images SET processed_at = NULL, web_path = NULL, thumbnail_path = NULL",
            [],
        )?;
        Ok(count)
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        let (total, processed) = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM images),
                (SELECT COUNT(*) FROM images WHERE processed_at IS NOT NULL)",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)? as usize,
                    row.get::<_, i64>(1)? as usize,
                ))
            },
        )?;
        Ok(CatalogStats {
            total,
            processed,
            pending: total - processed,
        })
    }

    /// Drop cached statements and ask SQLite to release heap it no longer needs.
    pub fn shrink_memory(&self) -> Result<()> {
        self.conn.flush_prepared_statement_cache();
        self.conn.execute_batch("PRAGMA shrink_memory;")?;
        Ok(())
    }
}

fn path_to_sql(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<SourceImage> {
    Ok(SourceImage {
        id: row.get(0)?,
        original_path: PathBuf::from(row.get::<_, String>(1)?),
        web_path: row.get::<_, Option<String>>(2)?.map(PathBuf::from),
        thumbnail_path: row.get::<_, Option<String>>(3)?.map(PathBuf::from),
        processed_at: row.get(4)?,
    })
}
