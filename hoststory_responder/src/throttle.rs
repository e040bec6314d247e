// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw throttling.
//!
//! The scene does not repaint while a long synchronous handler runs, so the
//! dispatch interceptor forces repaints itself. [`RedrawThrottle`] limits that
//! to one repaint per interval, independent of how many events pass.

/// Millisecond clock.
///
/// All time the throttle sees flows through this trait so tests can drive it.
pub trait Clock {
    /// Milliseconds since an unspecified epoch, monotonically increasing.
    fn now_millis(&self) -> u64;
}

/// [`Clock`] backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Redraw settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RedrawConfig {
    /// Minimum milliseconds between forced repaints.
    pub interval: u64,
    /// Also flush to the window system after a forced repaint.
    pub flush_after_repaint: bool,
}

impl RedrawConfig {
    /// Default interval: 25 repaints per second.
    pub const INTERVAL: u64 = 40;
}

impl Default for RedrawConfig {
    fn default() -> Self {
        Self {
            interval: Self::INTERVAL,
            flush_after_repaint: false,
        }
    }
}

/// Decides when a forced repaint is due.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RedrawThrottle {
    interval: u64,
    last: u64,
}

impl RedrawThrottle {
    /// Start the interval at `now`.
    pub fn new(interval: u64, now: u64) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Returns `true`, and restarts the interval, if at least `interval`
    /// milliseconds passed since the last forced repaint.
    pub fn poll(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut throttle = RedrawThrottle::new(40, 1000);
        assert!(!throttle.poll(1000));
        assert!(!throttle.poll(1039));
        assert!(throttle.poll(1040));
        assert!(!throttle.poll(1041));
        assert!(!throttle.poll(1079));
        assert!(throttle.poll(1200));
        assert!(!throttle.poll(1239));
    }

    #[test]
    fn clock_going_backwards_never_fires() {
        let mut throttle = RedrawThrottle::new(40, 1000);
        assert!(!throttle.poll(10));
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::default();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a, "clock went backwards");
    }
}
