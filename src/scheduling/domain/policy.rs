//! Due-date policy: priority offsets and the weekly rest-day adjustment.
//!
//! All functions here are pure; "now" is supplied by callers so behaviour is
//! deterministic under test.

use super::Priority;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Weekday on which computed due dates are never allowed to land.
pub const REST_DAY: Weekday = Weekday::Sun;

/// Days a sibling task's due date is pushed out when a high-priority task
/// enters the tracked section.
pub const EXTENSION_DAYS: u64 = 2;

/// Computes the default due date for a priority level from a baseline date.
///
/// The offset is [`Priority::offset_days`]; the result is then advanced past
/// the rest day if it lands on one.
#[must_use]
pub fn compute_due_date(priority: Priority, from: NaiveDate) -> NaiveDate {
    next_valid_due_date(add_days(from, priority.offset_days()))
}

/// Pushes an existing due date out by [`EXTENSION_DAYS`], rest-day adjusted.
#[must_use]
pub fn extended_due_date(current: NaiveDate) -> NaiveDate {
    next_valid_due_date(add_days(current, EXTENSION_DAYS))
}

/// Advances a date day-by-day until it no longer falls on the rest day.
///
/// Already-valid dates are returned unchanged, so re-applying the adjustment
/// is a no-op.
#[must_use]
pub fn next_valid_due_date(date: NaiveDate) -> NaiveDate {
    let mut due = date;
    while due.weekday() == REST_DAY {
        match due.succ_opt() {
            Some(next) => due = next,
            None => break,
        }
    }
    due
}

/// Saturating day addition; dates at the calendar boundary stay put.
fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}
