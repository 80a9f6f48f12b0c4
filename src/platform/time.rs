//! Fixed-timestep accumulator
//!
//! Wall-clock deltas are accumulated as `Duration` (integer nanoseconds), so
//! any split of the same elapsed time yields the same number of ticks.

use std::time::Duration;

use crate::consts::MAX_FRAME_DELTA_MS;

/// One 60 Hz tick
pub const FIXED_DT: Duration = Duration::from_nanos(16_666_667);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedStep {
    step: Duration,
    max_frame_delta: Duration,
    last: Option<Duration>,
    accumulator: Duration,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(FIXED_DT, Duration::from_millis(MAX_FRAME_DELTA_MS))
    }
}

impl FixedStep {
    /// A zero `step` falls back to 60 Hz
    pub fn new(step: Duration, max_frame_delta: Duration) -> Self {
        Self {
            step: normalize_non_zero_duration(step, FIXED_DT),
            max_frame_delta,
            last: None,
            accumulator: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Time banked toward the next tick
    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Feed a monotonic clock sample; returns how many ticks to run now
    ///
    /// The first sample only sets the reference point. Deltas are capped so
    /// a long stall never turns into a burst of catch-up ticks.
    pub fn advance(&mut self, now: Duration) -> u32 {
        let Some(last) = self.last.replace(now) else {
            return 0;
        };
        let frame_dt = clamp_frame_delta(now.saturating_sub(last), self.max_frame_delta);
        self.accumulator = self.accumulator.saturating_add(frame_dt);

        let mut ticks = 0u32;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks = ticks.saturating_add(1);
        }
        ticks
    }

}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() { fallback } else { value }
}
