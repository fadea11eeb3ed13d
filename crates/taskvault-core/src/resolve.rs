//! Due-time resolution.
//!
//! Turning a caller-supplied due-time string into epoch seconds is a
//! pluggable capability: the store depends on [`DueTimeResolver`] but does
//! not care how the text is interpreted. [`WallClockResolver`] is the shipped
//! implementation; tests inject fixed-output resolvers instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;

/// Resolves due-time text to epoch seconds.
pub trait DueTimeResolver: Send + Sync {
    fn resolve(&self, input: &str) -> Result<i64, ValidationError>;
}

/// Resolver backed by the real clock.
///
/// Accepted forms, tried in order:
/// - raw epoch seconds (`"1735689600"`)
/// - RFC 3339 (`"2025-01-01T09:00:00Z"`)
/// - `YYYY-MM-DD HH:MM[:SS]` and bare `YYYY-MM-DD`, interpreted as UTC
/// - relative offsets: `"in 2 hours"` or `"+45m"`, resolved against now
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClockResolver;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

impl DueTimeResolver for WallClockResolver {
    fn resolve(&self, input: &str) -> Result<i64, ValidationError> {
        let trimmed = input.trim();
        let unresolvable = || ValidationError::UnresolvableDueTime {
            input: input.to_string(),
        };

        if trimmed.is_empty() {
            return Err(unresolvable());
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed.parse::<i64>().map_err(|_| unresolvable());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.timestamp());
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(naive.and_utc().timestamp());
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            // A bare date means the start of that day.
            return Ok(date.and_hms_opt(0, 0, 0).ok_or_else(unresolvable)?.and_utc().timestamp());
        }

        let relative = trimmed
            .strip_prefix("in ")
            .or_else(|| trimmed.strip_prefix('+'));
        if let Some(rest) = relative {
            let duration = humantime::parse_duration(rest.trim()).map_err(|_| unresolvable())?;
            return Ok(Utc::now().timestamp() + duration.as_secs() as i64);
        }

        Err(unresolvable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_raw_epoch_seconds() {
        assert_eq!(WallClockResolver.resolve("1735689600").unwrap(), 1735689600);
    }

    #[test]
    fn resolves_rfc3339() {
        let ts = WallClockResolver.resolve("2025-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, 1735689600);
    }

    #[test]
    fn resolves_naive_datetime_as_utc() {
        let ts = WallClockResolver.resolve("2025-01-01 00:00:00").unwrap();
        assert_eq!(ts, 1735689600);
        let ts = WallClockResolver.resolve("2025-01-01 00:00").unwrap();
        assert_eq!(ts, 1735689600);
        let ts = WallClockResolver.resolve("2025-01-01").unwrap();
        assert_eq!(ts, 1735689600);
    }

    #[test]
    fn resolves_relative_offsets_against_now() {
        let now = Utc::now().timestamp();
        let ts = WallClockResolver.resolve("in 2 hours").unwrap();
        assert!(ts >= now + 7200 && ts <= now + 7200 + 5);
        let ts = WallClockResolver.resolve("+45m").unwrap();
        assert!(ts >= now + 2700 && ts <= now + 2700 + 5);
    }

    #[test]
    fn rejects_unparseable_text() {
        for input in ["", "   ", "someday", "13 o'clock", "-5"] {
            assert!(matches!(
                WallClockResolver.resolve(input),
                Err(ValidationError::UnresolvableDueTime { .. })
            ));
        }
    }
}
