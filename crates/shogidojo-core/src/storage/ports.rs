//! Row-level read/upsert ports for hearts and streak state.
//!
//! Every function takes a `&Connection`. `rusqlite::Transaction` derefs to
//! `Connection`, so the same port serves a standalone call and a call grouped
//! under a caller-supplied transaction; the coordinator passes the deref of
//! its open transaction to run both ledgers' writes in one atomic unit.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::hearts::HeartsState;
use crate::streak::StreakState;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse datetime from RFC3339 string with fallback to current time.
///
/// Falling back to "now" for a hearts anchor grants no recovery, which is the
/// safe direction for a corrupt timestamp.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Read one user's hearts row, if present.
pub fn find_hearts(conn: &Connection, user_id: &str) -> Result<Option<HeartsState>, rusqlite::Error> {
    conn.query_row(
        "SELECT count, max_count, last_refill FROM hearts WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(HeartsState {
                count: row.get(0)?,
                max_count: row.get(1)?,
                last_refill: parse_datetime_fallback(&row.get::<_, String>(2)?),
            })
        },
    )
    .optional()
}

/// Insert or replace one user's hearts row.
pub fn upsert_hearts(
    conn: &Connection,
    user_id: &str,
    state: &HeartsState,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO hearts (user_id, count, max_count, last_refill)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            user_id,
            state.count,
            state.max_count,
            state.last_refill.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Read one user's streak row, if present.
pub fn find_streak(conn: &Connection, user_id: &str) -> Result<Option<StreakState>, rusqlite::Error> {
    conn.query_row(
        "SELECT current_count, longest_count, last_active_date FROM streaks WHERE user_id = ?1",
        params![user_id],
        |row| {
            let date_str: Option<String> = row.get(2)?;
            Ok(StreakState {
                current_count: row.get(0)?,
                longest_count: row.get(1)?,
                last_active_date: date_str
                    .and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            })
        },
    )
    .optional()
}

/// Insert or replace one user's streak row.
pub fn upsert_streak(
    conn: &Connection,
    user_id: &str,
    state: &StreakState,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO streaks (user_id, current_count, longest_count, last_active_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            user_id,
            state.current_count,
            state.longest_count,
            state
                .last_active_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GameDb;
    use chrono::TimeZone;

    #[test]
    fn hearts_row_roundtrip() {
        let db = GameDb::open_memory().unwrap();
        assert!(find_hearts(db.conn(), "u1").unwrap().is_none());

        let state = HeartsState {
            count: 7,
            max_count: 10,
            last_refill: Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap(),
        };
        upsert_hearts(db.conn(), "u1", &state).unwrap();

        let loaded = find_hearts(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(loaded.count, 7);
        assert_eq!(loaded.max_count, 10);
        assert_eq!(loaded.last_refill, state.last_refill);
    }

    #[test]
    fn streak_row_roundtrip_with_and_without_date() {
        let db = GameDb::open_memory().unwrap();

        let mut state = StreakState {
            current_count: 3,
            longest_count: 5,
            last_active_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        upsert_streak(db.conn(), "u1", &state).unwrap();
        let loaded = find_streak(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(loaded.current_count, 3);
        assert_eq!(loaded.longest_count, 5);
        assert_eq!(loaded.last_active_date, NaiveDate::from_ymd_opt(2025, 3, 1));

        state.last_active_date = None;
        upsert_streak(db.conn(), "u1", &state).unwrap();
        let loaded = find_streak(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(loaded.last_active_date, None);
    }

    #[test]
    fn corrupt_refill_timestamp_grants_no_recovery() {
        let db = GameDb::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO hearts (user_id, count, max_count, last_refill)
                 VALUES ('u1', 2, 10, 'not-a-timestamp')",
                [],
            )
            .unwrap();
        let loaded = find_hearts(db.conn(), "u1").unwrap().unwrap();
        // Anchor falls back to now, so no elapsed interval is credited.
        assert!(Utc::now() - loaded.last_refill < chrono::Duration::seconds(5));
    }
}
