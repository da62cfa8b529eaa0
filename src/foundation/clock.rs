use chrono::{DateTime, FixedOffset};

use crate::foundation::error::{SnaptureError, SnaptureResult};

/// Source of "now" for footer stamps and export file names.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        chrono::Local::now().fixed_offset()
    }
}

/// Frozen clock for reproducible exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// UTC instant from milliseconds since the Unix epoch.
    pub fn from_unix_millis(ms: i64) -> SnaptureResult<Self> {
        DateTime::from_timestamp_millis(ms)
            .map(|dt| Self(dt.fixed_offset()))
            .ok_or_else(|| SnaptureError::validation(format!("timestamp {ms} is out of range")))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Reject strftime patterns chrono cannot render.
pub fn validate_timestamp_format(fmt: &str) -> SnaptureResult<()> {
    let bad = chrono::format::StrftimeItems::new(fmt)
        .any(|item| matches!(item, chrono::format::Item::Error));
    if bad {
        return Err(SnaptureError::config(format!(
            "invalid timestamp format '{fmt}'"
        )));
    }
    Ok(())
}

/// Render `now` with `fmt` without panicking on malformed patterns.
pub fn format_timestamp(now: &DateTime<FixedOffset>, fmt: &str) -> SnaptureResult<String> {
    use std::fmt::Write as _;

    validate_timestamp_format(fmt)?;
    let mut out = String::new();
    write!(out, "{}", now.format(fmt))
        .map_err(|_| SnaptureError::render(format!("cannot format timestamp with '{fmt}'")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let c = FixedClock::from_unix_millis(1_700_000_000_000).unwrap();
        assert_eq!(c.now(), c.now());
        assert_eq!(c.now().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn formats_date_and_minutes() {
        let c = FixedClock::from_unix_millis(1_700_000_000_000).unwrap();
        // 2023-11-14 22:13:20 UTC
        let s = format_timestamp(&c.now(), "%-m/%-d/%Y • %I:%M %p").unwrap();
        assert_eq!(s, "11/14/2023 • 10:13 PM");
    }

    #[test]
    fn bad_pattern_is_an_error_not_a_panic() {
        let c = FixedClock::from_unix_millis(0).unwrap();
        assert!(format_timestamp(&c.now(), "%Q").is_err());
        assert!(validate_timestamp_format("%H:%M").is_ok());
    }
}
