//! SQLite-backed persistent record store.
//!
//! Provides the durable collections behind the engine:
//! - Hydration entries, queryable by day key and day-key range
//! - Caffeine entries, same query surface plus note edits via upsert
//! - Key-value store for the singleton records (settings, streak state,
//!   achievement state, reminder runtime state)
//!
//! Day keys are ISO `YYYY-MM-DD` strings, so the inclusive range queries
//! can lean on lexicographic TEXT comparison and still sort chronologically.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::{data_dir, migrations};
use crate::caffeine::{CaffeineEntry, CaffeineKind};
use crate::error::DatabaseError;
use crate::hydration::HydrationEntry;

/// Parse caffeine kind from database string
fn parse_caffeine_kind(kind_str: &str) -> CaffeineKind {
    match kind_str {
        "coffee" => CaffeineKind::Coffee,
        _ => CaffeineKind::Tea,
    }
}

/// Format caffeine kind for database storage
fn format_caffeine_kind(kind: CaffeineKind) -> &'static str {
    match kind {
        CaffeineKind::Tea => "tea",
        CaffeineKind::Coffee => "coffee",
    }
}

/// Parse an epoch-millisecond column into a UTC instant, falling back to
/// the epoch for out-of-range values.
fn ms_to_instant(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_else(|| DateTime::from_timestamp_millis(0).unwrap())
}

fn row_to_hydration_entry(row: &Row) -> Result<HydrationEntry, rusqlite::Error> {
    Ok(HydrationEntry {
        id: row.get(0)?,
        amount: row.get(1)?,
        timestamp: ms_to_instant(row.get(2)?),
        date: row.get(3)?,
    })
}

fn row_to_caffeine_entry(row: &Row) -> Result<CaffeineEntry, rusqlite::Error> {
    let kind_str: String = row.get(1)?;
    Ok(CaffeineEntry {
        id: row.get(0)?,
        kind: parse_caffeine_kind(&kind_str),
        servings: row.get(2)?,
        note: row.get(3)?,
        timestamp: ms_to_instant(row.get(4)?),
        date: row.get(5)?,
    })
}

/// SQLite database holding all persisted app state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/bewet/bewet.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::OpenFailed {
            path: "~/.config/bewet".into(),
            source: rusqlite::Error::InvalidPath(e.to_string().into()),
        })?;
        Self::open_at(&dir.join("bewet.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Hydration entries ────────────────────────────────────────────

    /// Upsert a hydration entry by id.
    pub fn put_hydration_entry(&self, entry: &HydrationEntry) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO hydration_entries (id, amount, timestamp, date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id,
                entry.amount,
                entry.timestamp.timestamp_millis(),
                entry.date,
            ],
        )?;
        Ok(())
    }

    /// All hydration entries logged on a single day, oldest first.
    pub fn hydration_by_date(&self, date: &str) -> Result<Vec<HydrationEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, timestamp, date FROM hydration_entries
             WHERE date = ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(params![date], row_to_hydration_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Hydration entries with day keys in `[start, end]`, oldest first.
    pub fn hydration_in_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<HydrationEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, timestamp, date FROM hydration_entries
             WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, timestamp ASC",
        )?;
        let rows = stmt.query_map(params![start, end], row_to_hydration_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every hydration entry in the store, oldest first.
    pub fn all_hydration(&self) -> Result<Vec<HydrationEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, timestamp, date FROM hydration_entries
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map([], row_to_hydration_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a hydration entry by id. Deleting an absent id is a no-op.
    pub fn delete_hydration(&self, id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM hydration_entries WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Remove every hydration entry.
    pub fn clear_hydration(&self) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM hydration_entries", [])?;
        Ok(())
    }

    // ── Caffeine entries ─────────────────────────────────────────────

    /// Upsert a caffeine entry by id (also used for note edits).
    pub fn put_caffeine_entry(&self, entry: &CaffeineEntry) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO caffeine_entries (id, kind, servings, note, timestamp, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id,
                format_caffeine_kind(entry.kind),
                entry.servings,
                entry.note,
                entry.timestamp.timestamp_millis(),
                entry.date,
            ],
        )?;
        Ok(())
    }

    /// All caffeine entries logged on a single day, oldest first.
    pub fn caffeine_by_date(&self, date: &str) -> Result<Vec<CaffeineEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, servings, note, timestamp, date FROM caffeine_entries
             WHERE date = ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(params![date], row_to_caffeine_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Caffeine entries with day keys in `[start, end]`, oldest first.
    pub fn caffeine_in_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<CaffeineEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, servings, note, timestamp, date FROM caffeine_entries
             WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, timestamp ASC",
        )?;
        let rows = stmt.query_map(params![start, end], row_to_caffeine_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every caffeine entry in the store, oldest first.
    pub fn all_caffeine(&self) -> Result<Vec<CaffeineEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, servings, note, timestamp, date FROM caffeine_entries
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map([], row_to_caffeine_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a caffeine entry by id. Deleting an absent id is a no-op.
    pub fn delete_caffeine(&self, id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM caffeine_entries WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Remove every caffeine entry.
    pub fn clear_caffeine(&self) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM caffeine_entries", [])?;
        Ok(())
    }

    // ── Key-value singletons ─────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a single kv record.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Remove every kv record (settings and tracker singletons).
    pub fn kv_clear(&self) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: &str, amount: u32, date: &str) -> HydrationEntry {
        HydrationEntry {
            id: id.to_string(),
            amount,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap(),
            date: date.to_string(),
        }
    }

    #[test]
    fn put_and_query_by_date() {
        let db = Database::open_memory().unwrap();
        db.put_hydration_entry(&entry("a", 200, "2024-05-10")).unwrap();
        db.put_hydration_entry(&entry("b", 300, "2024-05-10")).unwrap();
        db.put_hydration_entry(&entry("c", 500, "2024-05-09")).unwrap();

        let today = db.hydration_by_date("2024-05-10").unwrap();
        assert_eq!(today.len(), 2);
        assert_eq!(today.iter().map(|e| e.amount).sum::<u32>(), 500);
    }

    #[test]
    fn range_query_is_inclusive_and_ordered() {
        let db = Database::open_memory().unwrap();
        db.put_hydration_entry(&entry("a", 100, "2024-05-04")).unwrap();
        db.put_hydration_entry(&entry("b", 200, "2024-05-07")).unwrap();
        db.put_hydration_entry(&entry("c", 300, "2024-05-10")).unwrap();
        db.put_hydration_entry(&entry("d", 400, "2024-05-03")).unwrap();

        let week = db.hydration_in_range("2024-05-04", "2024-05-10").unwrap();
        assert_eq!(week.len(), 3);
        assert_eq!(week[0].date, "2024-05-04");
        assert_eq!(week[2].date, "2024-05-10");
    }

    #[test]
    fn delete_is_idempotent() {
        let db = Database::open_memory().unwrap();
        db.put_hydration_entry(&entry("a", 100, "2024-05-04")).unwrap();
        db.delete_hydration("a").unwrap();
        db.delete_hydration("a").unwrap();
        db.delete_hydration("never-existed").unwrap();
        assert!(db.all_hydration().unwrap().is_empty());
    }

    #[test]
    fn caffeine_upsert_replaces_note() {
        let db = Database::open_memory().unwrap();
        let mut e = CaffeineEntry {
            id: "c1".to_string(),
            kind: CaffeineKind::Coffee,
            servings: 1,
            note: None,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap(),
            date: "2024-05-10".to_string(),
        };
        db.put_caffeine_entry(&e).unwrap();
        e.note = Some("espresso".to_string());
        db.put_caffeine_entry(&e).unwrap();

        let today = db.caffeine_by_date("2024-05-10").unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].note.as_deref(), Some("espresso"));
        assert_eq!(today[0].kind, CaffeineKind::Coffee);
    }

    #[test]
    fn timestamps_round_trip_exactly() {
        let db = Database::open_memory().unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 10, 6, 59, 59).unwrap()
            + chrono::Duration::milliseconds(123);
        let e = HydrationEntry {
            id: "t".to_string(),
            amount: 250,
            timestamp: ts,
            date: "2024-05-10".to_string(),
        };
        db.put_hydration_entry(&e).unwrap();
        let back = db.all_hydration().unwrap();
        assert_eq!(back[0].timestamp, ts);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("streak").unwrap().is_none());
        db.kv_set("streak", "{\"currentStreak\":3}").unwrap();
        assert_eq!(db.kv_get("streak").unwrap().unwrap(), "{\"currentStreak\":3}");
        db.kv_delete("streak").unwrap();
        assert!(db.kv_get("streak").unwrap().is_none());
    }
}
