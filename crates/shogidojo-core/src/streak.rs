//! Daily activity streak.
//!
//! One streak per user: the number of consecutive calendar days with at
//! least one recorded completion, plus the longest run ever reached. Days
//! are evaluated at the configured offset (see [`crate::clock::GameClock`]),
//! and at most one update per day is persisted.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::error::{DatabaseError, Result};
use crate::storage::ports;

/// One user's persisted streak state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_count: u32,
    /// Never less than `current_count`.
    pub longest_count: u32,
    /// Calendar date of the last recorded activity, at the configured offset.
    pub last_active_date: Option<NaiveDate>,
}

/// Read-only view of a streak, with today's status resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakView {
    pub current_count: u32,
    pub longest_count: u32,
    pub last_active_date: Option<NaiveDate>,
    pub updated_today: bool,
}

/// Result of one record call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current_count: u32,
    pub longest_count: u32,
    /// False when today's activity was already recorded.
    pub updated: bool,
}

/// Owns the one-per-day increment/reset logic and longest-streak bookkeeping.
#[derive(Debug, Clone)]
pub struct StreakTracker {
    clock: GameClock,
}

impl StreakTracker {
    pub fn new(clock: GameClock) -> Self {
        Self { clock }
    }

    /// Read one user's streak. Absent rows read as the zero state; nothing
    /// is persisted by this path.
    pub fn get_streak(&self, conn: &Connection, user_id: &str) -> Result<StreakView> {
        let state = ports::find_streak(conn, user_id)
            .map_err(DatabaseError::from)?
            .unwrap_or_default();
        let updated_today = state.last_active_date == Some(self.clock.today());
        Ok(StreakView {
            current_count: state.current_count,
            longest_count: state.longest_count,
            last_active_date: state.last_active_date,
            updated_today,
        })
    }

    /// Record today's activity.
    ///
    /// Idempotent within a calendar day: a repeat call is a no-op with
    /// `updated = false`. Activity on the day after `last_active_date`
    /// extends the run; any larger gap restarts it at 1.
    pub fn record_streak(&self, conn: &Connection, user_id: &str) -> Result<StreakUpdate> {
        let state = ports::find_streak(conn, user_id)
            .map_err(DatabaseError::from)?
            .unwrap_or_default();
        let today = self.clock.today();

        let next = match state.last_active_date {
            Some(date) if date == today => {
                return Ok(StreakUpdate {
                    current_count: state.current_count,
                    longest_count: state.longest_count,
                    updated: false,
                });
            }
            Some(date) if Some(date) == today.pred_opt() => StreakState {
                current_count: state.current_count + 1,
                longest_count: state.longest_count.max(state.current_count + 1),
                last_active_date: Some(today),
            },
            _ => StreakState {
                current_count: 1,
                longest_count: state.longest_count.max(1),
                last_active_date: Some(today),
            },
        };

        ports::upsert_streak(conn, user_id, &next).map_err(DatabaseError::from)?;
        Ok(StreakUpdate {
            current_count: next.current_count,
            longest_count: next.longest_count,
            updated: true,
        })
    }
}
