use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Wall-clock source for timestamps and elapsed-time stats.
///
/// `Fixed` keeps drills and sessions deterministic in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// One observation from a running countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ClockEvent {
    Tick { remaining: u32 },
    Expired,
}

/// Pure one-per-second countdown.
///
/// Each call to [`Countdown::tick`] stands for one elapsed second. The tick
/// that brings the remaining time to zero reports `Expired` instead of a
/// `Tick`, exactly once; afterwards the countdown yields nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    expired: bool,
    stopped: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(total_secs: u32) -> Self {
        Self {
            remaining: total_secs,
            expired: false,
            stopped: false,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.expired && !self.stopped
    }

    /// Advance one second. Returns `None` once expired or stopped.
    pub fn tick(&mut self) -> Option<ClockEvent> {
        if !self.is_running() {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            return Some(ClockEvent::Expired);
        }
        Some(ClockEvent::Tick {
            remaining: self.remaining,
        })
    }

    /// Idempotent; safe after expiry.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Render seconds as `MM:SS`.
#[must_use]
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_expires_exactly_once() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.tick(), Some(ClockEvent::Tick { remaining: 2 }));
        assert_eq!(countdown.tick(), Some(ClockEvent::Tick { remaining: 1 }));
        assert_eq!(countdown.tick(), Some(ClockEvent::Expired));
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(countdown.tick(), None);
        assert!(!countdown.is_running());
    }

    #[test]
    fn zero_budget_expires_on_first_tick() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick(), Some(ClockEvent::Expired));
        assert_eq!(countdown.tick(), None);
    }

    #[test]
    fn stop_is_idempotent_and_silences_ticks() {
        let mut countdown = Countdown::new(5);
        countdown.stop();
        countdown.stop();
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.remaining(), 5);
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(30));
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
    }
}
