use chrono::{DateTime, Utc};

/// Source of wall-clock time for billing evaluations.
///
/// The calculator reads the clock once per evaluation to stamp the next
/// charge date. Injecting it keeps evaluations deterministic under test.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System-clock time source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time source pinned to a single instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub DateTime<Utc>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_time_source_returns_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let clock = FixedTimeSource(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }
}
