//! Time sources for request records
//!
//! Records carry two kinds of time: a monotonic millisecond reading used
//! for start/end/duration, and a wall-clock completion timestamp.

use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};

/// Source of page time
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock's origin (never decreasing)
    fn now_ms(&self) -> f64;

    /// Current wall-clock time
    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Monotonic clock anchored at construction, like a page's performance timer
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for deterministic tests
#[derive(Debug)]
pub struct ManualClock {
    millis: Mutex<f64>,
    wall: DateTime<Utc>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            millis: Mutex::new(start_ms),
            wall: Utc::now(),
        }
    }

    /// Move the clock forward; negative deltas are ignored
    pub fn advance(&self, delta_ms: f64) {
        if delta_ms <= 0.0 {
            return;
        }
        if let Ok(mut millis) = self.millis.lock() {
            *millis += delta_ms;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.millis.lock().map(|millis| *millis).unwrap_or_default()
    }

    fn wall(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::microseconds((self.now_ms() * 1000.0) as i64);
        self.wall + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(second >= first);
    }

    #[test]
    fn manual_clock_advances_by_hand() {
        let clock = ManualClock::new(5.0);
        clock.advance(12.5);
        assert_eq!(clock.now_ms(), 17.5);
    }

    #[test]
    fn manual_clock_ignores_negative_advance() {
        let clock = ManualClock::new(5.0);
        clock.advance(-3.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn manual_clock_wall_time_follows_page_time() {
        let clock = ManualClock::new(0.0);
        let before = clock.wall();
        clock.advance(1000.0);
        assert_eq!(clock.wall() - before, chrono::Duration::seconds(1));
    }
}
