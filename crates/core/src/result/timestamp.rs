use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A decoded `timestamp_value` literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Accepts RFC 3339, naive date-times with `T` or a space separator, and bare dates.
    pub fn parse(literal: &str) -> Option<Self> {
        let literal = literal.trim();

        if let Ok(zoned) = DateTime::parse_from_rfc3339(literal) {
            return Some(Self::Zoned(zoned));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(literal, format) {
                return Some(Self::Naive(naive));
            }
        }

        NaiveDate::parse_from_str(literal, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
    }

    /// Instant used for ordering; zoned values are normalised to UTC.
    pub fn sort_key(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(zoned) => zoned.naive_utc(),
            Self::Naive(naive) => *naive,
        }
    }

    pub fn to_literal(&self) -> String {
        match self {
            Self::Zoned(zoned) => zoned.to_rfc3339(),
            Self::Naive(naive) => naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(zoned) => write!(f, "{}", zoned.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::Timestamp;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = Timestamp::parse("2024-01-15T10:30:00+02:00").expect("rfc3339 literal");
        assert!(matches!(parsed, Timestamp::Zoned(_)));
        assert_eq!(parsed.sort_key().hour(), 8);
    }

    #[test]
    fn parses_space_separated_naive_literal() {
        let parsed = Timestamp::parse("2024-01-15 10:30:00.250").expect("naive literal");
        let Timestamp::Naive(naive) = parsed else {
            panic!("expected naive timestamp");
        };
        assert_eq!(naive.day(), 15);
        assert_eq!(naive.nanosecond(), 250_000_000);
    }

    #[test]
    fn bare_date_becomes_midnight() {
        let parsed = Timestamp::parse("2024-03-01").expect("date literal");
        assert_eq!(parsed.to_literal(), "2024-03-01T00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::parse("last tuesday").is_none());
    }

    #[test]
    fn literal_reparses_to_same_instant() {
        let parsed = Timestamp::parse("2024-01-15T10:30:00Z").expect("utc literal");
        assert_eq!(Timestamp::parse(&parsed.to_literal()), Some(parsed));
    }
}
