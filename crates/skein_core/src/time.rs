//! Simulation tick clock
//!
//! The scheduler advances once per tick; an external loop decides when.

use std::time::Duration;

/// Default tick rate for drivers that do not configure one.
pub const DEFAULT_TICK_RATE_HZ: u32 = 10;

/// Wall-clock duration of one tick at `tick_rate_hz` (clamped to at least 1 Hz).
pub fn tick_duration(tick_rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / tick_rate_hz.max(1) as f64)
}

/// Counts completed ticks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    tick_count: u64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
    }

    pub fn reset(&mut self) {
        self.tick_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_duration_matches_rate() {
        assert_eq!(tick_duration(10), Duration::from_millis(100));
        assert_eq!(tick_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn clock_counts_and_resets() {
        let mut clock = TickClock::new();
        clock.advance_tick();
        clock.advance_tick();
        assert_eq!(clock.tick_count(), 2);
        clock.reset();
        assert_eq!(clock.tick_count(), 0);
    }
}
