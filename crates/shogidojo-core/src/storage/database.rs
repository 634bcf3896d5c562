//! SQLite-based per-user game state storage.
//!
//! One row per user in each of two tables:
//! - `hearts`: recovering practice budget
//! - `streaks`: consecutive-day activity counter
//!
//! The store is treated as a transactional key-value store keyed by user id;
//! [`GameDb::begin_immediate`] hands out the transaction handle that the
//! completion path uses to group the hearts and streak writes atomically.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::DatabaseError;

use super::data_dir;

/// SQLite database holding hearts and streak state.
pub struct GameDb {
    conn: Connection,
}

impl GameDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/shogidojo/shogidojo.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("shogidojo.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|source| DatabaseError::OpenFailed {
                path: ":memory:".into(),
                source,
            })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS hearts (
                    user_id     TEXT PRIMARY KEY,
                    count       INTEGER NOT NULL,
                    max_count   INTEGER NOT NULL,
                    last_refill TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS streaks (
                    user_id          TEXT PRIMARY KEY,
                    current_count    INTEGER NOT NULL,
                    longest_count    INTEGER NOT NULL,
                    last_active_date TEXT
                );",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Begin a write transaction that takes the SQLite write lock up front.
    ///
    /// `BEGIN IMMEDIATE` serializes concurrent completion calls on the store:
    /// two concurrent consumptions can never both observe the same
    /// pre-consumption balance. The returned [`Transaction`] rolls back on
    /// drop, so an abort before commit leaves no partial writes.
    pub fn begin_immediate(&self) -> Result<Transaction<'_>, DatabaseError> {
        Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(DatabaseError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let db = GameDb::open_memory().unwrap();
        db.migrate().unwrap();
    }

    #[test]
    fn rollback_on_drop_leaves_no_writes() {
        let db = GameDb::open_memory().unwrap();
        {
            let tx = db.begin_immediate().unwrap();
            tx.execute(
                "INSERT INTO streaks (user_id, current_count, longest_count, last_active_date)
                 VALUES ('u1', 1, 1, NULL)",
                [],
            )
            .unwrap();
            // dropped without commit
        }
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM streaks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
