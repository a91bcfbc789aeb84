// Time source for operations that stamp or compare instants

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can hand one clone to a `Store`
/// and advance the other.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse RFC 3339, or a bare `YYYY-MM-DDTHH:MM` / `YYYY-MM-DD HH:MM`
/// (taken as UTC)
pub fn parse_timestamp(s: &str) -> eyre::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(eyre::eyre!("Invalid timestamp: {} (expected RFC 3339 or YYYY-MM-DDTHH:MM)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-10T14:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-03-10T21:30:00+07:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-03-10T14:30").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2025-03-10 14:30 ").unwrap(), expected);
        assert!(parse_timestamp("tomorrow").is_err());
    }

    #[test]
    fn test_system_clock_is_recent() {
        // after 2020-09-13
        assert!(SystemClock.now().timestamp() > 1_600_000_000);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        handle.advance(Duration::hours(25));
        assert_eq!(clock.now(), start + Duration::hours(25));

        clock.set(start);
        assert_eq!(handle.now(), start);
    }
}
