//! Date arithmetic at the heart of the check-in service.
//!
//! Both functions are pure: they read only their arguments, so they can be
//! called from any handler or thread without coordination.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Whole years elapsed between `birthdate` and `today`.
///
/// The anniversary check compares `(month, day)` pairs rather than day of
/// year, so a February 29 birthday only counts as reached on March 1 in
/// non-leap years. Callers pass `birthdate <= today`.
pub fn calculate_age(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years - 1
    } else {
        years
    }
}

/// Elapsed time between two instants in fractional hours.
///
/// Both instants are normalised to UTC before subtracting, so they may carry
/// different offsets. The result is not clamped: a check-out earlier than
/// the check-in yields a negative value.
pub fn calculate_duration_hours<A: TimeZone, B: TimeZone>(
    check_in: &DateTime<A>,
    check_out: &DateTime<B>,
) -> f64 {
    let elapsed = check_out.with_timezone(&Utc) - check_in.with_timezone(&Utc);
    elapsed.num_milliseconds() as f64 / MILLIS_PER_HOUR
}
