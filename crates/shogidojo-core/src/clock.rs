//! Time source and calendar-day boundary.
//!
//! Heart recovery and streak updates both depend on "now", and the streak
//! additionally depends on which calendar day "now" falls in. The server
//! evaluates days at a fixed offset (UTC+9 by default); clients may render
//! with their own local time, but every persisted decision goes through
//! [`GameClock`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Default day-boundary offset, in hours east of UTC.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Supplier of the current instant.
///
/// Production code uses [`SystemTimeSource`]; tests pin the instant with
/// [`FixedTimeSource`].
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time source pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub DateTime<Utc>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock pairing a [`TimeSource`] with the configured day-boundary offset.
#[derive(Clone)]
pub struct GameClock {
    source: Arc<dyn TimeSource>,
    offset: FixedOffset,
}

impl GameClock {
    /// Create a clock with an explicit source and offset in hours.
    ///
    /// Out-of-range offsets fall back to UTC.
    pub fn new(source: Arc<dyn TimeSource>, utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        Self { source, offset }
    }

    /// Wall clock at the given offset.
    pub fn system(utc_offset_hours: i32) -> Self {
        Self::new(Arc::new(SystemTimeSource), utc_offset_hours)
    }

    /// Clock frozen at `instant` (for tests and replay).
    pub fn fixed(instant: DateTime<Utc>, utc_offset_hours: i32) -> Self {
        Self::new(Arc::new(FixedTimeSource(instant)), utc_offset_hours)
    }

    /// Current instant in UTC.
    pub fn now(&self) -> DateTime<Utc> {
        self.source.now()
    }

    /// The configured day-boundary offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's calendar date at the configured offset.
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }

    /// Yesterday's calendar date at the configured offset.
    ///
    /// `None` only at the representable minimum date.
    pub fn yesterday(&self) -> Option<NaiveDate> {
        self.today().pred_opt()
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::system(DEFAULT_UTC_OFFSET_HOURS)
    }
}

impl fmt::Debug for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameClock")
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_boundary_follows_offset() {
        // 2025-03-09 16:00 UTC is already 2025-03-10 01:00 at UTC+9.
        let instant = Utc.with_ymd_and_hms(2025, 3, 9, 16, 0, 0).unwrap();
        let jst = GameClock::fixed(instant, 9);
        let utc = GameClock::fixed(instant, 0);

        assert_eq!(jst.today(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    }

    #[test]
    fn yesterday_is_previous_calendar_day() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = GameClock::fixed(instant, 9);
        assert_eq!(clock.yesterday(), NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn invalid_offset_falls_back_to_utc() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let clock = GameClock::fixed(instant, 99);
        assert_eq!(clock.today(), instant.date_naive());
    }
}
