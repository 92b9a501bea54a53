//! Calendar arithmetic in an explicit time zone.
//!
//! Instants are always `DateTime<Utc>`. A [`Calendar`] decides how an instant
//! is split into wall-clock components and how components are turned back
//! into an instant. Local times that do not exist (a DST gap) resolve one
//! hour later; ambiguous ones resolve to the earlier instant.

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc, Weekday,
};
use thiserror::Error;

/// Errors from building dates out of components.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    /// Components do not describe a representable date.
    #[error("Date out of range: year {year}, month {month}, day {day}")]
    OutOfRange { year: i64, month: i64, day: i64 },

    /// The wall-clock time does not exist in the calendar's time zone.
    #[error("Local time {0} does not exist in this time zone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("Invalid format pattern: {0}")]
    InvalidPattern(String),

    #[error("Failed to parse {input:?}: {reason}")]
    Parse { input: String, reason: String },
}

/// A time zone plus the weekday weeks start on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
    first_weekday: Weekday,
}

impl Calendar<Utc> {
    /// Gregorian calendar in UTC with weeks starting on Sunday.
    pub fn utc() -> Self {
        Self::gregorian(Utc)
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(tz: Tz, first_weekday: Weekday) -> Self {
        Self { tz, first_weekday }
    }

    /// Gregorian calendar in `tz` with weeks starting on Sunday.
    pub fn gregorian(tz: Tz) -> Self {
        Self::new(tz, Weekday::Sun)
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// Wall-clock components of `date` in this calendar's zone.
    pub fn local(&self, date: &DateTime<Utc>) -> NaiveDateTime {
        date.with_timezone(&self.tz).naive_local()
    }

    /// Instant of a wall-clock time in this calendar's zone.
    pub fn resolve(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, DateError> {
        if let Some(date) = self.tz.from_local_datetime(&naive).earliest() {
            return Ok(date.with_timezone(&Utc));
        }
        let shifted = naive + Duration::hours(1);
        self.tz
            .from_local_datetime(&shifted)
            .earliest()
            .map(|date| date.with_timezone(&Utc))
            .ok_or(DateError::NonexistentLocalTime(naive))
    }

    fn midnight(&self, day: NaiveDate) -> Result<DateTime<Utc>, DateError> {
        self.resolve(day.and_time(NaiveTime::MIN))
    }

    // ------------------------------------------------------------------
    // Boundaries
    // ------------------------------------------------------------------

    pub fn start_of_day(&self, date: &DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
        self.midnight(self.local(date).date())
    }

    /// 23:59:59 on the same local day.
    pub fn end_of_day(&self, date: &DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
        let day = self.local(date).date();
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.resolve(day.and_time(end))
    }

    /// Midnight of the most recent `first_weekday` on or before `date`.
    pub fn start_of_week(&self, date: &DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
        let day = self.local(date).date();
        let offset = self.weekday_offset(day.weekday());
        self.midnight(day - Duration::days(offset))
    }

    pub fn start_of_month(&self, date: &DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
        let day = self.local(date).date();
        self.midnight(day.with_day(1).unwrap_or(day))
    }

    /// Midnight of the last day of the month.
    pub fn end_of_month(&self, date: &DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
        let day = self.local(date).date();
        let last = day.with_day(days_in_month_of(day)).unwrap_or(day);
        self.midnight(last)
    }

    /// Midnight of `day` in the month of `date`. Days past the end of the
    /// month roll into the next one.
    pub fn date_with_day(&self, date: &DateTime<Utc>, day: i64) -> Result<DateTime<Utc>, DateError> {
        let local = self.local(date).date();
        self.date_from_parts(day, local.month() as i64, local.year() as i64)
    }

    /// Midnight of the given day. Out-of-range days and months roll over, so
    /// day 0 is the last day of the previous month and month 13 is January of
    /// the next year.
    pub fn date_from_parts(&self, day: i64, month: i64, year: i64) -> Result<DateTime<Utc>, DateError> {
        let naive = lenient_date(year, month, day).ok_or(DateError::OutOfRange { year, month, day })?;
        self.midnight(naive)
    }

    /// The Sunday strictly after `start_of_week(date) - 7 days`.
    pub fn week_start(&self, date: &DateTime<Utc>) -> Result<DateTime<Utc>, DateError> {
        let base = self.local(&self.start_of_week(date)?).date() - Duration::days(7);
        let ahead = 7 - base.weekday().num_days_from_sunday() as i64;
        self.midnight(base + Duration::days(ahead))
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    pub fn adding_seconds(&self, date: &DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
        Duration::try_seconds(seconds)
            .and_then(|d| date.checked_add_signed(d))
            .unwrap_or(*date)
    }

    pub fn adding_minutes(&self, date: &DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        Duration::try_minutes(minutes)
            .and_then(|d| date.checked_add_signed(d))
            .unwrap_or(*date)
    }

    /// Add calendar days keeping the wall-clock time.
    pub fn adding_days(&self, date: &DateTime<Utc>, days: i64) -> DateTime<Utc> {
        Duration::try_days(days)
            .and_then(|d| self.local(date).checked_add_signed(d))
            .and_then(|naive| self.resolve(naive).ok())
            .unwrap_or(*date)
    }

    /// Add calendar months keeping the wall-clock time. The day is clamped to
    /// the length of the target month.
    pub fn adding_months(&self, date: &DateTime<Utc>, months: i64) -> DateTime<Utc> {
        let local = self.local(date);
        let shifted = match u32::try_from(months.unsigned_abs()) {
            Ok(n) if months >= 0 => local.checked_add_months(Months::new(n)),
            Ok(n) => local.checked_sub_months(Months::new(n)),
            Err(_) => None,
        };
        shifted
            .and_then(|naive| self.resolve(naive).ok())
            .unwrap_or(*date)
    }

    pub fn adding_years(&self, date: &DateTime<Utc>, years: i64) -> DateTime<Utc> {
        match years.checked_mul(12) {
            Some(months) => self.adding_months(date, months),
            None => *date,
        }
    }

    pub fn subtracting_seconds(&self, date: &DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
        self.adding_seconds(date, seconds.saturating_neg())
    }

    pub fn subtracting_minutes(&self, date: &DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        self.adding_minutes(date, minutes.saturating_neg())
    }

    pub fn subtracting_days(&self, date: &DateTime<Utc>, days: i64) -> DateTime<Utc> {
        self.adding_days(date, days.saturating_neg())
    }

    pub fn subtracting_months(&self, date: &DateTime<Utc>, months: i64) -> DateTime<Utc> {
        self.adding_months(date, months.saturating_neg())
    }

    pub fn subtracting_years(&self, date: &DateTime<Utc>, years: i64) -> DateTime<Utc> {
        self.adding_years(date, years.saturating_neg())
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    pub fn hour(&self, date: &DateTime<Utc>) -> u32 {
        self.local(date).hour()
    }

    pub fn minute(&self, date: &DateTime<Utc>) -> u32 {
        self.local(date).minute()
    }

    pub fn second(&self, date: &DateTime<Utc>) -> u32 {
        self.local(date).second()
    }

    pub fn day(&self, date: &DateTime<Utc>) -> u32 {
        self.local(date).day()
    }

    pub fn month(&self, date: &DateTime<Utc>) -> u32 {
        self.local(date).month()
    }

    pub fn year(&self, date: &DateTime<Utc>) -> i32 {
        self.local(date).year()
    }

    pub fn weekday(&self, date: &DateTime<Utc>) -> Weekday {
        self.local(date).weekday()
    }

    /// 1-based week of the month, weeks starting on `first_weekday`. The
    /// partial week containing the 1st is week 1.
    pub fn week_of_month(&self, date: &DateTime<Utc>) -> u32 {
        let day = self.local(date).date();
        let first = day.with_day(1).unwrap_or(day);
        let lead = self.weekday_offset(first.weekday()) as u32;
        (day.day() + lead - 1) / 7 + 1
    }

    /// Which occurrence of its weekday `date` is within the month (1..=5).
    pub fn nth_weekday(&self, date: &DateTime<Utc>) -> u32 {
        (self.day(date) - 1) / 7 + 1
    }

    pub fn days_in_month(&self, date: &DateTime<Utc>) -> u32 {
        days_in_month_of(self.local(date).date())
    }

    /// Day numbers of `month` in its next occurrence: this year if the same
    /// day of `month` has not passed yet relative to `now`, otherwise next year.
    pub fn days_of_month_list(&self, month: u32, now: &DateTime<Utc>) -> Result<Vec<u32>, DateError> {
        let local = self.local(now).date();
        let day = local.day() as i64;
        let year = local.year() as i64;

        let mut date = self.date_from_parts(day, month as i64, year)?;
        if date < *now {
            date = self.date_from_parts(day, month as i64, year + 1)?;
        }
        Ok((1..=self.days_in_month(&date)).collect())
    }

    /// Whole weeks of wall-clock time from `from` to `to`, truncated toward zero.
    pub fn weeks_between(&self, from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
        (self.local(to) - self.local(from)).num_weeks()
    }

    /// True when the whole weeks from `date` to 1970-01-04 are even.
    ///
    /// The count runs backwards for any date after the reference, so odd
    /// counts come out negative and never match.
    pub fn is_odd_week(&self, date: &DateTime<Utc>) -> Result<bool, DateError> {
        let reference = self.date_from_parts(4, 1, 1970)?;
        Ok(self.weeks_between(date, &reference) % 2 == 0)
    }

    // ------------------------------------------------------------------
    // Comparisons ignoring the time of day
    // ------------------------------------------------------------------

    pub fn is_equal_ignoring_time(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        self.local(a).date() == self.local(b).date()
    }

    pub fn is_equal_or_earlier_ignoring_time(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        self.local(a).date() <= self.local(b).date()
    }

    pub fn is_equal_or_later_ignoring_time(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        self.local(a).date() >= self.local(b).date()
    }

    // ------------------------------------------------------------------
    // Time zone conversions
    // ------------------------------------------------------------------

    /// Offset from UTC at `date`, in seconds.
    pub fn utc_offset_seconds(&self, date: &DateTime<Utc>) -> i64 {
        (self.local(date) - date.naive_utc()).num_seconds()
    }

    /// Shift `date` back by the zone offset, treating it as a local reading.
    pub fn to_global_time(&self, date: &DateTime<Utc>) -> DateTime<Utc> {
        self.adding_seconds(date, -self.utc_offset_seconds(date))
    }

    /// Shift `date` forward by the zone offset.
    pub fn to_local_time(&self, date: &DateTime<Utc>) -> DateTime<Utc> {
        self.adding_seconds(date, self.utc_offset_seconds(date))
    }

    pub fn utc_offset_minutes(&self, date: &DateTime<Utc>) -> i64 {
        self.utc_offset_seconds(date) / 60
    }

    /// Days from `first_weekday` to `weekday`, 0..=6.
    fn weekday_offset(&self, weekday: Weekday) -> i64 {
        let diff = weekday.num_days_from_sunday() as i64
            - self.first_weekday.num_days_from_sunday() as i64;
        (diff + 7) % 7
    }
}

fn days_in_month_of(day: NaiveDate) -> u32 {
    let first = day.with_day(1).unwrap_or(day);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        None => 31,
    }
}

fn lenient_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let months = month.checked_sub(1)?;
    let year = i32::try_from(year.checked_add(months.div_euclid(12))?).ok()?;
    let month = months.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)
}

/// Split a duration in seconds into whole hours, minutes and seconds.
/// Fractions are truncated.
pub fn seconds_to_hms(seconds: f64) -> (i64, i64, i64) {
    let total = seconds as i64;
    (total / 3600, (total % 3600) / 60, total % 60)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
