//! Frame timing and the per-frame completion budget.
//!
//! The host calls [`FrameClock::tick`] once per rendered frame. The time
//! spent draining completed asset jobs is capped by
//! [`FrameClock::drain_budget`]: the configured drain slice, or whatever
//! is left of the target frame time if that is less.
//!
//! # Examples
//!
//! ```
//! use asset_runtime::config::RuntimeConfig;
//! use asset_runtime::frame::FrameClock;
//!
//! let config = RuntimeConfig::default();
//! let mut clock = FrameClock::new();
//!
//! // In your game loop:
//! clock.tick();
//! let budget = clock.drain_budget(&config);
//! assert!(budget <= config.drain_budget());
//! ```

use crate::config::RuntimeConfig;
use std::time::{Duration, Instant};

/// Frame timing for the asset runtime
#[derive(Clone, Debug)]
pub struct FrameClock {
    /// Time between the last two ticks
    delta: Duration,
    /// Time since the clock was created
    elapsed: Duration,
    frame_count: u64,
    startup_time: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            startup_time: now,
            last_tick: now,
        }
    }

    /// Start a new frame (call once per frame)
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.advance(now.duration_since(self.last_tick));
        self.last_tick = now;
        self.elapsed = now.duration_since(self.startup_time);
    }

    /// Record a frame of the given length without reading the clock
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time the host may spend finalizing asset jobs this frame
    ///
    /// `min(drain_budget, target_frame - delta)`, never negative. A frame
    /// that already overran its target gets a zero budget, which still
    /// finalizes one completion.
    pub fn drain_budget(&self, config: &RuntimeConfig) -> Duration {
        let remaining = config.target_frame().saturating_sub(self.delta);
        config.drain_budget().min(remaining)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.frame_count(), 2);
        assert!(clock.elapsed() >= clock.delta());
    }

    #[test]
    fn test_fast_frame_gets_full_slice() {
        let config = RuntimeConfig::default();
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(2));
        assert_eq!(clock.drain_budget(&config), config.drain_budget());
    }

    #[test]
    fn test_slow_frame_gets_remainder() {
        let config = RuntimeConfig {
            drain_budget_ms: 8.0,
            target_frame_ms: 16.0,
            ..Default::default()
        };
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(12));
        let budget = clock.drain_budget(&config).as_secs_f64();
        assert!((budget - 0.004).abs() < 1e-6, "budget was {budget}");
    }

    #[test]
    fn test_overrun_frame_gets_zero() {
        let config = RuntimeConfig::default();
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(40));
        assert_eq!(clock.drain_budget(&config), Duration::ZERO);
    }
}
