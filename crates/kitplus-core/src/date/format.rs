//! Explicitly constructed date formatters.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::{Calendar, DateError};

/// A strftime pattern bound to a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormat {
    pub pattern: String,
    /// Offset east of UTC used for formatting and for parsing input
    /// without an offset of its own.
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>, utc_offset_seconds: i32) -> Self {
        Self {
            pattern: pattern.into(),
            utc_offset_seconds,
        }
    }

    /// `2022-02-22T10:00:00.000+0000`
    pub fn iso8601() -> Self {
        Self::utc("%Y-%m-%dT%H:%M:%S%.3f%z")
    }

    /// `2022-02-22T10:00:00Z`
    pub fn iso8601_no_fractional() -> Self {
        Self::utc("%Y-%m-%dT%H:%M:%SZ")
    }

    pub fn utc(pattern: impl Into<String>) -> Self {
        Self::new(pattern, 0)
    }

    fn offset(&self) -> Result<FixedOffset, DateError> {
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            DateError::InvalidPattern(format!("UTC offset {}s", self.utc_offset_seconds))
        })
    }

    pub fn format(&self, date: &DateTime<Utc>) -> Result<String, DateError> {
        let offset = self.offset()?;
        format_in(&date.with_timezone(&offset), &self.pattern)
    }

    /// Parse `text`. An offset in the text wins over `utc_offset_seconds`;
    /// date-only patterns yield midnight.
    pub fn parse(&self, text: &str) -> Result<DateTime<Utc>, DateError> {
        let offset = self.offset()?;
        let err = |reason: chrono::ParseError| DateError::Parse {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let first = match DateTime::parse_from_str(text, &self.pattern) {
            Ok(date) => return Ok(date.with_timezone(&Utc)),
            Err(e) => e,
        };
        let naive = NaiveDateTime::parse_from_str(text, &self.pattern)
            .or_else(|_| {
                NaiveDate::parse_from_str(text, &self.pattern).map(|d| d.and_time(NaiveTime::MIN))
            })
            .map_err(|_| err(first))?;

        offset
            .from_local_datetime(&naive)
            .single()
            .map(|date| date.with_timezone(&Utc))
            .ok_or(DateError::NonexistentLocalTime(naive))
    }
}

impl<Tz: TimeZone> Calendar<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    /// Format `date` as wall-clock time in this calendar's zone.
    pub fn format(&self, date: &DateTime<Utc>, pattern: &str) -> Result<String, DateError> {
        format_in(&date.with_timezone(self.time_zone()), pattern)
    }
}

fn format_in<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str) -> Result<String, DateError>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", date.format(pattern))
        .map_err(|_| DateError::InvalidPattern(pattern.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 2, 22, 10, 4, 5).unwrap() + chrono::Duration::milliseconds(250)
    }

    #[test]
    fn test_iso8601_format() {
        assert_eq!(
            DateFormat::iso8601().format(&sample()).unwrap(),
            "2022-02-22T10:04:05.250+0000"
        );
        assert_eq!(
            DateFormat::iso8601_no_fractional().format(&sample()).unwrap(),
            "2022-02-22T10:04:05Z"
        );
    }

    #[test]
    fn test_iso8601_parse() {
        let parsed = DateFormat::iso8601()
            .parse("2022-02-22T12:04:05.250+0200")
            .unwrap();
        assert_eq!(parsed, sample());

        let parsed = DateFormat::iso8601_no_fractional()
            .parse("2022-02-22T10:04:05Z")
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 2, 22, 10, 4, 5).unwrap());
    }

    #[test]
    fn test_offset_format_and_parse() {
        let format = DateFormat::new("%d.%m.%Y %H:%M", 3600);
        assert_eq!(format.format(&sample()).unwrap(), "22.02.2022 11:04");
        assert_eq!(
            format.parse("22.02.2022 11:04").unwrap(),
            Utc.with_ymd_and_hms(2022, 2, 22, 10, 4, 0).unwrap()
        );
    }

    #[test]
    fn test_date_only_pattern_parses_to_midnight() {
        let parsed = DateFormat::utc("%Y-%m-%d").parse("2022-02-22").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 2, 22, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_failure() {
        let result = DateFormat::iso8601().parse("not a date");
        assert!(matches!(result, Err(DateError::Parse { .. })));
    }

    #[test]
    fn test_invalid_pattern_and_offset() {
        assert!(matches!(
            DateFormat::utc("%Q").format(&sample()),
            Err(DateError::InvalidPattern(_))
        ));
        assert!(DateFormat::new("%Y", 100_000).format(&sample()).is_err());
    }

    #[test]
    fn test_calendar_format_uses_zone() {
        let cal = Calendar::gregorian(FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(cal.format(&sample(), "%H:%M").unwrap(), "05:04");
    }

    #[test]
    fn test_format_deserializes() {
        let format: DateFormat = serde_json::from_str(r#"{"pattern":"%Y"}"#).unwrap();
        assert_eq!(format, DateFormat::utc("%Y"));
    }
}
