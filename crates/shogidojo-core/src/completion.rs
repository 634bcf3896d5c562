//! Atomic content-completion protocol.
//!
//! One completion event — a lesson finished, a tsumeshogi puzzle solved —
//! may spend hearts and always attempts a streak update. Both writes happen
//! in a single `BEGIN IMMEDIATE` transaction: either the heart debit and the
//! streak update both become visible, or neither does.
//!
//! Policy: the streak is recorded unconditionally once the hearts phase
//! succeeds or is skipped. A failed hearts phase aborts the whole call, so an
//! ungated attempt never counts as daily activity through this path. Whether
//! a given content type consumes a heart at all is the caller's choice via
//! [`CompletionOptions`].

use serde::{Deserialize, Serialize};

use crate::clock::GameClock;
use crate::error::{DatabaseError, Result};
use crate::hearts::{HeartsLedger, HeartsOutcome, HeartsRules, HeartsState};
use crate::storage::GameDb;
use crate::streak::{StreakTracker, StreakUpdate, StreakView};

/// Per-call options for [`CompletionCoordinator::record_completion`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Whether this completion spends hearts (false for free content).
    #[serde(default = "default_consume_heart")]
    pub consume_heart: bool,
    /// Hearts to spend when `consume_heart` is set.
    #[serde(default = "default_heart_amount")]
    pub heart_amount: u32,
}

fn default_consume_heart() -> bool {
    true
}
fn default_heart_amount() -> u32 {
    1
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            consume_heart: true,
            heart_amount: 1,
        }
    }
}

impl CompletionOptions {
    /// Free content: advances the streak without touching hearts.
    pub fn free() -> Self {
        Self {
            consume_heart: false,
            heart_amount: 0,
        }
    }

    /// Gated content spending `amount` hearts.
    pub fn consuming(amount: u32) -> Self {
        Self {
            consume_heart: true,
            heart_amount: amount,
        }
    }
}

/// Streak side of a completion result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakOutcome {
    pub current_count: u32,
    pub longest_count: u32,
    pub updated: bool,
    /// A freshly tied-or-broken personal best, excluding the trivial first
    /// day: `updated && current == longest && current > 1`.
    pub is_new_record: bool,
}

/// Ephemeral outcome of one completion call. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    pub streak: StreakOutcome,
    /// `None` when the hearts phase was skipped.
    pub hearts: Option<HeartsOutcome>,
}

/// Composes [`HeartsLedger`] and [`StreakTracker`] inside one atomic unit of
/// work per completion event. Holds no state of its own.
#[derive(Debug, Clone)]
pub struct CompletionCoordinator {
    hearts: HeartsLedger,
    streak: StreakTracker,
}

impl CompletionCoordinator {
    pub fn new(clock: GameClock, rules: HeartsRules) -> Self {
        Self {
            hearts: HeartsLedger::new(clock.clone(), rules),
            streak: StreakTracker::new(clock),
        }
    }

    /// Current heart state, lazily created on first read.
    pub fn get_hearts(&self, db: &GameDb, user_id: &str) -> Result<HeartsState> {
        self.hearts.get_hearts(db.conn(), user_id)
    }

    /// Current streak view. Read-only.
    pub fn get_streak(&self, db: &GameDb, user_id: &str) -> Result<StreakView> {
        self.streak.get_streak(db.conn(), user_id)
    }

    /// Record one completion: spend hearts if requested, then record today's
    /// activity, committing both writes together.
    ///
    /// On any failure — insufficient hearts, store error in either phase —
    /// the transaction rolls back entirely and the error propagates; neither
    /// the heart debit nor the streak update is persisted.
    pub fn record_completion(
        &self,
        db: &GameDb,
        user_id: &str,
        options: CompletionOptions,
    ) -> Result<CompletionResult> {
        let tx = db.begin_immediate()?;

        let hearts = if options.consume_heart {
            Some(self.hearts.consume_hearts(&tx, user_id, options.heart_amount)?)
        } else {
            None
        };

        let update = self.streak.record_streak(&tx, user_id)?;

        tx.commit().map_err(DatabaseError::from)?;

        Ok(CompletionResult {
            streak: streak_outcome(update),
            hearts,
        })
    }
}

impl Default for CompletionCoordinator {
    fn default() -> Self {
        Self::new(GameClock::default(), HeartsRules::default())
    }
}

fn streak_outcome(update: StreakUpdate) -> StreakOutcome {
    let is_new_record =
        update.updated && update.current_count == update.longest_count && update.current_count > 1;
    StreakOutcome {
        current_count: update.current_count,
        longest_count: update.longest_count,
        updated: update.updated,
        is_new_record,
    }
}
