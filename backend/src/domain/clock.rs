//! Site-local time.
//!
//! The makerspace runs on a single fixed UTC offset (+08:00 by default, which
//! matches Asia/Manila). All "now" and "today" values come from a `SiteClock`
//! that is created at startup and handed to every service that needs it.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Long form used for the "current time" banner, e.g. `January 05, 2025 09:30 AM`
pub const LONG_DISPLAY_FORMAT: &str = "%B %d, %Y %I:%M %p";
/// Time of day shown for check-in and check-out, e.g. `09:30 AM`
pub const TIME_DISPLAY_FORMAT: &str = "%I:%M %p";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct SiteClock {
    offset: FixedOffset,
    /// When set, the clock reads this instant instead of the system time
    pinned: Option<Arc<Mutex<DateTime<Utc>>>>,
}

impl SiteClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            pinned: None,
        }
    }

    /// Clock for a whole-hour offset, `None` if the offset is out of range.
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(Self::new)
    }

    /// Clock frozen at `instant` until moved with [`SiteClock::advance`].
    pub fn fixed(offset: FixedOffset, instant: DateTime<Utc>) -> Self {
        Self {
            offset,
            pinned: Some(Arc::new(Mutex::new(instant))),
        }
    }

    /// Move a fixed clock. Has no effect on a system clock.
    pub fn advance(&self, by: Duration) {
        if let Some(pinned) = &self.pinned {
            let mut instant = pinned.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *instant += by;
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        let utc_now = match &self.pinned {
            Some(pinned) => *pinned.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
            None => Utc::now(),
        };
        utc_now.with_timezone(&self.offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn to_site<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// The UTC instant at which `date` begins in site time, or `None` at the
    /// edges of the representable range.
    pub fn start_of_day_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        // A fixed offset maps every local time to exactly one instant
        date.and_time(NaiveTime::MIN)
            .checked_sub_signed(Duration::seconds(i64::from(self.offset.local_minus_utc())))
            .map(|naive| naive.and_utc())
    }
}

pub fn format_long(instant: &DateTime<FixedOffset>) -> String {
    instant.format(LONG_DISPLAY_FORMAT).to_string()
}

pub fn format_time(instant: &DateTime<FixedOffset>) -> String {
    instant.format(TIME_DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manila_clock_at(rfc3339: &str) -> SiteClock {
        let instant = DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
        SiteClock::fixed(FixedOffset::east_opt(8 * 3600).unwrap(), instant)
    }

    #[test]
    fn test_today_uses_site_offset() {
        // 20:30 UTC is already the next day in Manila
        let clock = manila_clock_at("2024-03-09T20:30:00Z");
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(clock.now().to_rfc3339(), "2024-03-10T04:30:00+08:00");
    }

    #[test]
    fn test_advance_moves_fixed_clock() {
        let clock = manila_clock_at("2024-03-10T01:00:00Z");
        let shared = clock.clone();
        clock.advance(Duration::minutes(90));
        assert_eq!(shared.now().to_rfc3339(), "2024-03-10T10:30:00+08:00");
    }

    #[test]
    fn test_start_of_day_utc() {
        let clock = manila_clock_at("2024-03-10T01:00:00Z");
        let start = clock
            .start_of_day_utc(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
            .unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-09T16:00:00+00:00");

        assert!(clock.start_of_day_utc(NaiveDate::MIN).is_none());
    }

    #[test]
    fn test_offset_bounds() {
        assert!(SiteClock::from_utc_offset_hours(8).is_some());
        assert!(SiteClock::from_utc_offset_hours(-11).is_some());
        assert!(SiteClock::from_utc_offset_hours(25).is_none());
    }

    #[test]
    fn test_display_formats() {
        let clock = manila_clock_at("2025-01-05T01:30:00Z");
        let now = clock.now();
        assert_eq!(format_long(&now), "January 05, 2025 09:30 AM");
        assert_eq!(format_time(&now), "09:30 AM");
    }
}
