//! Millisecond countdown timers for the device state machines.
//!
//! The original firmware decremented global `volatile` counters from a
//! periodic interrupt. Here the scheduler passes the elapsed milliseconds
//! into every `step` call instead, and each machine feeds its own
//! [`CountdownTimer`]. Same non-blocking polling contract, no hidden state.

/// A saturating millisecond countdown.
#[derive(Clone, Copy, Debug)]
pub struct CountdownTimer {
    remaining_ms: u32,
}

impl CountdownTimer {
    /// Create an already-expired timer.
    #[must_use]
    pub const fn new() -> Self { Self { remaining_ms: 0 } }

    /// Create a timer armed with `duration_ms`.
    #[must_use]
    pub const fn armed(duration_ms: u32) -> Self {
        Self {
            remaining_ms: duration_ms,
        }
    }

    /// Re-arm the countdown.
    pub fn arm(
        &mut self,
        duration_ms: u32,
    ) {
        self.remaining_ms = duration_ms;
    }

    /// Consume elapsed time, saturating at zero.
    pub fn tick(
        &mut self,
        elapsed_ms: u32,
    ) {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
    }

    /// True once the countdown reached zero.
    #[must_use]
    pub const fn expired(&self) -> bool { self.remaining_ms == 0 }
}

impl Default for CountdownTimer {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_expired() {
        assert!(CountdownTimer::new().expired());
    }

    #[test]
    fn test_armed_timer_counts_down() {
        let mut t = CountdownTimer::armed(3);
        assert!(!t.expired());
        t.tick(1);
        t.tick(1);
        assert!(!t.expired());
        t.tick(1);
        assert!(t.expired());
    }

    #[test]
    fn test_tick_saturates() {
        let mut t = CountdownTimer::armed(5);
        t.tick(100);
        assert!(t.expired());
        t.tick(100);
        assert!(t.expired());
    }

    #[test]
    fn test_rearm() {
        let mut t = CountdownTimer::armed(1);
        t.tick(1);
        assert!(t.expired());
        t.arm(10);
        assert!(!t.expired());
    }
}
