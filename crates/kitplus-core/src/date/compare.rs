//! Ordering helpers on instants.

use chrono::{DateTime, Utc};

pub fn is_earlier_than(date: &DateTime<Utc>, other: &DateTime<Utc>) -> bool {
    date < other
}

pub fn is_later_than(date: &DateTime<Utc>, other: &DateTime<Utc>) -> bool {
    date > other
}

pub fn is_equal_or_earlier_than(date: &DateTime<Utc>, other: &DateTime<Utc>) -> bool {
    date <= other
}

pub fn is_equal_or_later_than(date: &DateTime<Utc>, other: &DateTime<Utc>) -> bool {
    date >= other
}

/// Earliest of `dates` strictly after `date`.
pub fn closest_future_date(date: &DateTime<Utc>, dates: &[DateTime<Utc>]) -> Option<DateTime<Utc>> {
    dates.iter().filter(|d| *d > date).min().copied()
}

/// Earliest of `dates` strictly before `date`.
///
/// This is the oldest past date, not the nearest one.
pub fn closest_past_date(date: &DateTime<Utc>, dates: &[DateTime<Utc>]) -> Option<DateTime<Utc>> {
    dates.iter().filter(|d| *d < date).min().copied()
}
