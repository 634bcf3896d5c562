//! Recovering hearts budget.
//!
//! Hearts gate how much practice a user may attempt. The balance regenerates
//! one heart per recovery interval, but there is no background job: the store
//! keeps only a count and an anchor timestamp, and the effective balance is
//! recomputed from elapsed time on every consume.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::error::{CoreError, DatabaseError, Result};
use crate::storage::ports;

/// Default heart capacity for a new user.
pub const DEFAULT_MAX_HEARTS: u32 = 10;

/// Time to regenerate one heart: 1 hour.
pub const RECOVERY_INTERVAL_MS: i64 = 60 * 60 * 1000;

/// One user's persisted heart balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartsState {
    /// Stored count, always `<= max_count`.
    pub count: u32,
    /// Heart capacity.
    pub max_count: u32,
    /// Anchor for recovery: the moment from which elapsed intervals count.
    pub last_refill: DateTime<Utc>,
}

impl HeartsState {
    /// Balance after applying time-based recovery to the stored count.
    ///
    /// `min(count + floor(elapsed_ms / interval_ms), max_count)`. Integer
    /// floor division; a fractional interval never grants a partial heart.
    pub fn effective_count(&self, now: DateTime<Utc>, interval_ms: i64) -> u32 {
        let elapsed_ms = (now - self.last_refill).num_milliseconds().max(0);
        let recovered = (elapsed_ms / interval_ms.max(1)).min(i64::from(self.max_count)) as u32;
        self.count.saturating_add(recovered).min(self.max_count)
    }
}

/// Tunable hearts rules. Defaults are the production values.
#[derive(Debug, Clone, Copy)]
pub struct HeartsRules {
    /// Capacity given to a lazily created user.
    pub default_max: u32,
    /// Milliseconds to regenerate one heart.
    pub recovery_interval_ms: i64,
}

impl Default for HeartsRules {
    fn default() -> Self {
        Self {
            default_max: DEFAULT_MAX_HEARTS,
            recovery_interval_ms: RECOVERY_INTERVAL_MS,
        }
    }
}

/// Outcome of one consume call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartsOutcome {
    pub consumed: u32,
    pub remaining: u32,
    pub last_refill: DateTime<Utc>,
}

/// Owns recovery math and the consume path for heart balances.
///
/// All operations take a `&Connection`; pass the deref of an open
/// [`rusqlite::Transaction`] to run them inside a caller's transaction.
#[derive(Debug, Clone)]
pub struct HeartsLedger {
    clock: GameClock,
    rules: HeartsRules,
}

impl HeartsLedger {
    pub fn new(clock: GameClock, rules: HeartsRules) -> Self {
        Self { clock, rules }
    }

    /// Read one user's heart state, creating and persisting the default
    /// (full balance, anchor = now) on first read.
    ///
    /// Never mutates the stored count from elapsed time at rest; recovery is
    /// applied only on the consume path.
    pub fn get_hearts(&self, conn: &Connection, user_id: &str) -> Result<HeartsState> {
        match ports::find_hearts(conn, user_id).map_err(DatabaseError::from)? {
            Some(state) => Ok(state),
            None => {
                let state = HeartsState {
                    count: self.rules.default_max,
                    max_count: self.rules.default_max,
                    last_refill: self.clock.now(),
                };
                ports::upsert_hearts(conn, user_id, &state).map_err(DatabaseError::from)?;
                Ok(state)
            }
        }
    }

    /// Debit `amount` hearts (>= 1) against the effective balance.
    ///
    /// Fails with [`CoreError::InsufficientHearts`] when the effective count
    /// cannot cover the amount; nothing is written in that case.
    ///
    /// If any recovery occurred this call, the anchor resets to now: the
    /// partial-interval credit already consumed is discarded, and the
    /// recovery clock restarts at the moment the most recent recovered heart
    /// was used. With no recovery, the anchor is left untouched.
    pub fn consume_hearts(
        &self,
        conn: &Connection,
        user_id: &str,
        amount: u32,
    ) -> Result<HeartsOutcome> {
        if amount == 0 {
            return Err(CoreError::Custom(
                "heart amount must be at least 1".to_string(),
            ));
        }

        let state = self.get_hearts(conn, user_id)?;
        let now = self.clock.now();
        let effective = state.effective_count(now, self.rules.recovery_interval_ms);

        if effective < amount {
            return Err(CoreError::InsufficientHearts {
                requested: amount,
                available: effective,
            });
        }

        let remaining = effective - amount;
        let last_refill = if effective > state.count {
            now
        } else {
            state.last_refill
        };
        let updated = HeartsState {
            count: remaining,
            max_count: state.max_count,
            last_refill,
        };
        ports::upsert_hearts(conn, user_id, &updated).map_err(DatabaseError::from)?;

        Ok(HeartsOutcome {
            consumed: amount,
            remaining,
            last_refill,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GameDb;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn fixed_ledger(now: DateTime<Utc>) -> HeartsLedger {
        HeartsLedger::new(GameClock::fixed(now, 9), HeartsRules::default())
    }

    fn seed(db: &GameDb, user: &str, count: u32, max: u32, last_refill: DateTime<Utc>) {
        ports::upsert_hearts(
            db.conn(),
            user,
            &HeartsState {
                count,
                max_count: max,
                last_refill,
            },
        )
        .unwrap();
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_read_creates_full_default() {
        let db = GameDb::open_memory().unwrap();
        let ledger = fixed_ledger(t0());

        let state = ledger.get_hearts(db.conn(), "u1").unwrap();
        assert_eq!(state.count, 10);
        assert_eq!(state.max_count, 10);
        assert_eq!(state.last_refill, t0());

        // The default was persisted, not just returned.
        let stored = ports::find_hearts(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(stored, state);
    }

    #[test]
    fn recovery_is_floor_division() {
        let state = HeartsState {
            count: 3,
            max_count: 10,
            last_refill: t0(),
        };
        // 59 minutes: no heart yet.
        assert_eq!(
            state.effective_count(t0() + Duration::minutes(59), RECOVERY_INTERVAL_MS),
            3
        );
        // 2 hours and change: exactly two hearts.
        assert_eq!(
            state.effective_count(t0() + Duration::minutes(125), RECOVERY_INTERVAL_MS),
            5
        );
        // Far future: clamped to capacity.
        assert_eq!(
            state.effective_count(t0() + Duration::days(365), RECOVERY_INTERVAL_MS),
            10
        );
    }

    #[test]
    fn consume_with_recovery_resets_anchor() {
        // Worked example: count=3, 2h elapsed, consume 4 -> effective 5,
        // remaining 1, anchor reset to now.
        let db = GameDb::open_memory().unwrap();
        let now = t0() + Duration::hours(2);
        seed(&db, "u1", 3, 10, t0());

        let ledger = fixed_ledger(now);
        let outcome = ledger.consume_hearts(db.conn(), "u1", 4).unwrap();
        assert_eq!(outcome.consumed, 4);
        assert_eq!(outcome.remaining, 1);
        assert_eq!(outcome.last_refill, now);

        let stored = ports::find_hearts(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(stored.count, 1);
        assert_eq!(stored.last_refill, now);
    }

    #[test]
    fn consume_without_recovery_keeps_anchor() {
        let db = GameDb::open_memory().unwrap();
        let now = t0() + Duration::minutes(30);
        seed(&db, "u1", 5, 10, t0());

        let ledger = fixed_ledger(now);
        let outcome = ledger.consume_hearts(db.conn(), "u1", 2).unwrap();
        assert_eq!(outcome.remaining, 3);
        assert_eq!(outcome.last_refill, t0());

        let stored = ports::find_hearts(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(stored.last_refill, t0());
    }

    #[test]
    fn insufficient_balance_writes_nothing() {
        let db = GameDb::open_memory().unwrap();
        seed(&db, "u1", 1, 10, t0());

        let ledger = fixed_ledger(t0());
        let err = ledger.consume_hearts(db.conn(), "u1", 2).unwrap_err();
        match err {
            CoreError::InsufficientHearts {
                requested,
                available,
            } => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        let stored = ports::find_hearts(db.conn(), "u1").unwrap().unwrap();
        assert_eq!(stored.count, 1);
        assert_eq!(stored.last_refill, t0());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let db = GameDb::open_memory().unwrap();
        let ledger = fixed_ledger(t0());
        assert!(ledger.consume_hearts(db.conn(), "u1", 0).is_err());
    }

    #[test]
    fn consume_on_fresh_user_starts_from_full() {
        let db = GameDb::open_memory().unwrap();
        let ledger = fixed_ledger(t0());
        let outcome = ledger.consume_hearts(db.conn(), "u1", 1).unwrap();
        assert_eq!(outcome.remaining, 9);
    }

    proptest! {
        // Effective count equals min(count + floor(elapsed/interval), max)
        // and is non-decreasing in elapsed time.
        #[test]
        fn recovery_monotonicity(
            count in 0u32..=10,
            elapsed_a in 0i64..1_000_000_000,
            elapsed_b in 0i64..1_000_000_000,
        ) {
            let state = HeartsState { count, max_count: 10, last_refill: t0() };
            let (lo, hi) = if elapsed_a <= elapsed_b {
                (elapsed_a, elapsed_b)
            } else {
                (elapsed_b, elapsed_a)
            };
            let at_lo = state.effective_count(t0() + Duration::milliseconds(lo), RECOVERY_INTERVAL_MS);
            let at_hi = state.effective_count(t0() + Duration::milliseconds(hi), RECOVERY_INTERVAL_MS);
            prop_assert!(at_lo <= at_hi);
            prop_assert!(at_hi <= 10);
            prop_assert_eq!(
                at_hi,
                (count + (hi / RECOVERY_INTERVAL_MS).min(10) as u32).min(10)
            );
        }

        // Consume either fails with InsufficientHearts or leaves
        // remaining = effective - amount, never negative.
        #[test]
        fn no_over_consumption(
            count in 0u32..=10,
            elapsed_hours in 0i64..24,
            amount in 1u32..=12,
        ) {
            let db = GameDb::open_memory().unwrap();
            let now = t0() + Duration::hours(elapsed_hours);
            seed(&db, "u1", count, 10, t0());

            let ledger = fixed_ledger(now);
            let effective = (count + (elapsed_hours as u32).min(10)).min(10);
            match ledger.consume_hearts(db.conn(), "u1", amount) {
                Ok(outcome) => {
                    prop_assert!(amount <= effective);
                    prop_assert_eq!(outcome.remaining, effective - amount);
                }
                Err(CoreError::InsufficientHearts { available, .. }) => {
                    prop_assert!(amount > effective);
                    prop_assert_eq!(available, effective);
                }
                Err(other) => return Err(TestCaseError::fail(format!("{other}"))),
            }
        }
    }
}
