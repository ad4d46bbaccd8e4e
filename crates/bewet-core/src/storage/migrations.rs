//! Database schema migrations for bewet.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.
//! Existing data must survive every migration: in particular, a v1 store
//! (hydration entries + settings only) gains the caffeine collection in v2
//! without touching its rows.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub(crate) fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            0
        } else {
            eprintln!("Warning: failed to read schema_version: {}", e);
            0
        }
    })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: Initial schema.
///
/// Creates the hydration entry collection (indexed by day key) and the kv
/// store holding the singleton records: settings, streak state, achievement
/// state and reminder runtime state, each as a JSON blob.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS hydration_entries (
            id        TEXT PRIMARY KEY,
            amount    INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            date      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_hydration_entries_date ON hydration_entries(date);

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;

    tx.commit()?;
    Ok(())
}

/// Migration v2: Add the caffeine entry collection.
///
/// Tea/coffee servings that contribute a penalty to the effective goal.
/// Hydration entries and kv records from v1 are left untouched.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS caffeine_entries (
            id        TEXT PRIMARY KEY,
            kind      TEXT NOT NULL,
            servings  INTEGER NOT NULL DEFAULT 1,
            note      TEXT,
            timestamp INTEGER NOT NULL,
            date      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_caffeine_entries_date ON caffeine_entries(date);",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (2)", [])?;

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Migration from an empty database lands on the current version.
    #[test]
    fn migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);

        // Both collections queryable
        conn.prepare("SELECT id, amount, timestamp, date FROM hydration_entries")
            .unwrap();
        conn.prepare("SELECT id, kind, servings, note, timestamp, date FROM caffeine_entries")
            .unwrap();
    }

    /// Migrations are idempotent.
    #[test]
    fn migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }

    /// v1 -> v2 must not destroy existing entries or settings.
    #[test]
    fn v2_preserves_v1_data() {
        let conn = Connection::open_in_memory().unwrap();

        // Build a v1 store by hand.
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY);
             INSERT INTO schema_version (version) VALUES (1);
             CREATE TABLE hydration_entries (
                id TEXT PRIMARY KEY,
                amount INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                date TEXT NOT NULL
             );
             CREATE TABLE kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             INSERT INTO hydration_entries VALUES ('e1', 300, 1700000000000, '2023-11-14');
             INSERT INTO kv VALUES ('settings', '{\"dailyGoal\":1800}');",
        )
        .unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);

        let amount: i64 = conn
            .query_row(
                "SELECT amount FROM hydration_entries WHERE id = 'e1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(amount, 300);

        let settings: String = conn
            .query_row("SELECT value FROM kv WHERE key = 'settings'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(settings.contains("1800"));

        // New collection is present and empty.
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM caffeine_entries", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 0);
    }
}
