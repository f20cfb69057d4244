//! `Cache-Control` composition for edge caches.
//!
//! Successful pages are marked cacheable by shared caches with a fresh window
//! (`s-maxage`) and a stale-while-revalidate window. Unit conversion is plain
//! arithmetic so the header is a pure function of configuration.

use std::{fmt, str::FromStr};

use axum::http::{HeaderMap, HeaderValue, header::CACHE_CONTROL};
use thiserror::Error;

/// Second conversions for the symbolic units used in configuration.
pub mod seconds {
    pub const MINUTE: u64 = 60;
    pub const HOUR: u64 = 3_600;
    pub const DAY: u64 = 86_400;

    pub const fn from_minutes(minutes: u64) -> u64 {
        minutes.saturating_mul(MINUTE)
    }

    pub const fn from_hours(hours: u64) -> u64 {
        hours.saturating_mul(HOUR)
    }

    pub const fn from_days(days: u64) -> u64 {
        days.saturating_mul(DAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDuration {
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
    Days(u64),
}

impl CacheDuration {
    pub const fn as_secs(self) -> u64 {
        match self {
            CacheDuration::Seconds(value) => value,
            CacheDuration::Minutes(value) => seconds::from_minutes(value),
            CacheDuration::Hours(value) => seconds::from_hours(value),
            CacheDuration::Days(value) => seconds::from_days(value),
        }
    }
}

impl fmt::Display for CacheDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheDuration::Seconds(value) => write!(f, "{value}s"),
            CacheDuration::Minutes(value) => write!(f, "{value}m"),
            CacheDuration::Hours(value) => write!(f, "{value}h"),
            CacheDuration::Days(value) => write!(f, "{value}d"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheDurationError {
    #[error("duration is empty")]
    Empty,
    #[error("`{0}` is not a whole number followed by s, m, h or d")]
    Malformed(String),
}

impl FromStr for CacheDuration {
    type Err = CacheDurationError;

    /// Accepts `600`, `600s`, `10m`, `2h` or `30d`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CacheDurationError::Empty);
        }

        let (digits, unit) = match trimmed.char_indices().last() {
            Some((index, c)) if c.is_ascii_alphabetic() => (&trimmed[..index], Some(c)),
            _ => (trimmed, None),
        };

        let value: u64 = digits
            .parse()
            .map_err(|_| CacheDurationError::Malformed(raw.to_string()))?;

        match unit {
            None | Some('s') => Ok(CacheDuration::Seconds(value)),
            Some('m') => Ok(CacheDuration::Minutes(value)),
            Some('h') => Ok(CacheDuration::Hours(value)),
            Some('d') => Ok(CacheDuration::Days(value)),
            Some(_) => Err(CacheDurationError::Malformed(raw.to_string())),
        }
    }
}

/// `public, s-maxage=<fresh>, stale-while-revalidate=<stale>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDirective {
    pub s_maxage: CacheDuration,
    pub stale_while_revalidate: CacheDuration,
}

impl CacheDirective {
    pub fn new(s_maxage: CacheDuration, stale_while_revalidate: CacheDuration) -> Self {
        Self {
            s_maxage,
            stale_while_revalidate,
        }
    }

    pub fn header_value(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.s_maxage.as_secs(),
            self.stale_while_revalidate.as_secs()
        )
    }

    /// Set the header on an outgoing response, replacing any earlier value.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.header_value()) {
            headers.insert(CACHE_CONTROL, value);
        }
    }
}

impl Default for CacheDirective {
    fn default() -> Self {
        Self::new(CacheDuration::Minutes(10), CacheDuration::Days(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversions() {
        assert_eq!(seconds::from_minutes(10), 600);
        assert_eq!(seconds::from_hours(2), 7_200);
        assert_eq!(seconds::from_days(30), 2_592_000);
    }

    #[test]
    fn ten_minutes_fresh_thirty_days_stale() {
        let directive = CacheDirective::new(CacheDuration::Minutes(10), CacheDuration::Days(30));
        assert_eq!(
            directive.header_value(),
            "public, s-maxage=600, stale-while-revalidate=2592000"
        );
    }

    #[test]
    fn apply_sets_a_single_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        CacheDirective::default().apply(&mut headers);

        let values: Vec<_> = headers.get_all(CACHE_CONTROL).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(
            values[0],
            "public, s-maxage=600, stale-while-revalidate=2592000"
        );
    }

    #[test]
    fn parse_symbolic_durations() {
        assert_eq!("600".parse::<CacheDuration>(), Ok(CacheDuration::Seconds(600)));
        assert_eq!("45s".parse::<CacheDuration>(), Ok(CacheDuration::Seconds(45)));
        assert_eq!("10m".parse::<CacheDuration>(), Ok(CacheDuration::Minutes(10)));
        assert_eq!(" 2h ".parse::<CacheDuration>(), Ok(CacheDuration::Hours(2)));
        assert_eq!("30d".parse::<CacheDuration>(), Ok(CacheDuration::Days(30)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<CacheDuration>(), Err(CacheDurationError::Empty));
        assert!("10w".parse::<CacheDuration>().is_err());
        assert!("m".parse::<CacheDuration>().is_err());
        assert!("-5m".parse::<CacheDuration>().is_err());
    }

    #[test]
    fn display_round_trips_the_unit() {
        assert_eq!(CacheDuration::Days(30).to_string(), "30d");
    }
}
