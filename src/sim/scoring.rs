//! Score multiplier with step-up on scoring events and timed decay

use crate::consts::{MULTIPLIER_DECAY_MS, MULTIPLIER_DECAY_STEP, MULTIPLIER_STEP};

/// Scoring multiplier, always within `[1.0, ceiling]`
#[derive(Debug, Clone, PartialEq)]
pub struct Multiplier {
    value: f32,
    ceiling: f32,
    /// Time since the last scoring event or decay step (ms)
    decay_timer: f32,
}

impl Multiplier {
    pub fn new(ceiling: f32) -> Self {
        Self {
            value: 1.0,
            ceiling: ceiling.max(1.0),
            decay_timer: 0.0,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    pub fn decay_timer(&self) -> f32 {
        self.decay_timer
    }

    /// Force a value (clamped into range); used when restoring or testing
    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(1.0, self.ceiling);
    }

    /// A scoring event happened: step up and restart the decay window
    pub fn bump(&mut self) {
        self.value = (self.value + MULTIPLIER_STEP).min(self.ceiling);
        self.decay_timer = 0.0;
    }

    /// Advance the decay window; steps down once a full window passes quietly
    pub fn advance(&mut self, dt: f32) {
        self.decay_timer += dt;
        if self.decay_timer > MULTIPLIER_DECAY_MS {
            self.value = (self.value - MULTIPLIER_DECAY_STEP).max(1.0);
            self.decay_timer = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FIXED_DT_MS, MULTIPLIER_MAX};
    use proptest::prelude::*;

    #[test]
    fn test_bump_and_cap() {
        let mut m = Multiplier::new(MULTIPLIER_MAX);
        m.bump();
        assert_eq!(m.value(), 1.5);
        for _ in 0..40 {
            m.bump();
        }
        assert_eq!(m.value(), MULTIPLIER_MAX);
    }

    #[test]
    fn test_decays_after_quiet_window() {
        let mut m = Multiplier::new(MULTIPLIER_MAX);
        m.set(3.0);
        // Just short of a window: nothing happens
        m.advance(MULTIPLIER_DECAY_MS);
        assert_eq!(m.value(), 3.0);
        m.advance(1.0);
        assert!((m.value() - 2.9).abs() < 1e-6);
        assert_eq!(m.decay_timer(), 0.0);
    }

    #[test]
    fn test_bump_restarts_window() {
        let mut m = Multiplier::new(MULTIPLIER_MAX);
        m.set(2.0);
        m.advance(2900.0);
        m.bump();
        m.advance(2900.0);
        assert_eq!(m.value(), 2.5);
    }

    #[test]
    fn test_floor_at_one() {
        let mut m = Multiplier::new(MULTIPLIER_MAX);
        m.set(0.2);
        assert_eq!(m.value(), 1.0);
        m.advance(MULTIPLIER_DECAY_MS + 1.0);
        assert_eq!(m.value(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_multiplier_stays_in_range(
            events in prop::collection::vec(any::<bool>(), 0..2000),
            hard in any::<bool>(),
        ) {
            let ceiling = if hard { MULTIPLIER_MAX * 1.5 } else { MULTIPLIER_MAX };
            let mut m = Multiplier::new(ceiling);
            for scored in events {
                let before = m.value();
                if scored {
                    m.bump();
                    prop_assert!(m.value() >= before);
                } else {
                    m.advance(FIXED_DT_MS * 20.0);
                    prop_assert!(m.value() <= before);
                }
                prop_assert!(m.value() >= 1.0 && m.value() <= ceiling);
            }
        }
    }
}
