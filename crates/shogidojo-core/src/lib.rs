//! # Shogidojo Core Library
//!
//! Gamification core for the Shogidojo learning backend. Two resource-like
//! invariants are enforced per user:
//!
//! - **Hearts**: a recovering practice budget. The balance regenerates one
//!   heart per hour, computed lazily from a stored anchor timestamp -- there
//!   is no background job.
//! - **Streak**: consecutive calendar days with at least one completion,
//!   evaluated at a configurable day boundary (UTC+9 on the server).
//!
//! The two compose in [`CompletionCoordinator::record_completion`]: one
//! `BEGIN IMMEDIATE` transaction spends hearts and records the day's
//! activity, all-or-nothing, for every content type (lessons, tsumeshogi
//! puzzles, future content).
//!
//! HTTP routing, validation, and authentication live outside this crate;
//! callers serialize the returned results however they need.
//!
//! ## Key Components
//!
//! - [`HeartsLedger`]: recovery math and the consume path
//! - [`StreakTracker`]: one-per-day increment/reset logic
//! - [`CompletionCoordinator`]: the atomic completion protocol
//! - [`GameDb`]: SQLite persistence, one row per user per ledger
//! - [`Config`]: TOML-based rules configuration

pub mod clock;
pub mod completion;
pub mod error;
pub mod hearts;
pub mod storage;
pub mod streak;

pub use clock::{FixedTimeSource, GameClock, SystemTimeSource, TimeSource};
pub use completion::{CompletionCoordinator, CompletionOptions, CompletionResult, StreakOutcome};
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use hearts::{HeartsLedger, HeartsOutcome, HeartsRules, HeartsState};
pub use storage::{Config, GameDb};
pub use streak::{StreakState, StreakTracker, StreakUpdate, StreakView};
