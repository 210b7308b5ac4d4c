//! Frame clock.
//!
//! `requestAnimationFrame` hands us a monotonically increasing timestamp in
//! milliseconds. The simulations integrate against a delta normalized so that
//! 1.0 equals one 60 Hz frame; a tab that was throttled or hidden produces a
//! clamped delta rather than one giant integration step.

use crate::consts::{FRAME_MS, MAX_FRAME_DELTA};

/// Converts raw frame timestamps into normalized, clamped deltas.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Forget the previous timestamp. The next `tick` yields exactly 1.0,
    /// so resuming from a pause never replays the pause as elapsed time.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Advance to `now_ms` and return the normalized delta in
    /// `[0, MAX_FRAME_DELTA]`. Non-monotonic input clamps to 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => {
                let elapsed = (now_ms - last).max(0.0) as f32;
                (elapsed / FRAME_MS).min(MAX_FRAME_DELTA)
            }
            None => 1.0,
        };
        self.last_ms = Some(now_ms);
        dt
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
    use proptest::prelude::*;

    #[test]
    fn first_tick_is_one_frame() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1234.5), 1.0);
    }

    #[test]
    fn steady_sixty_hz_yields_unit_delta() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let dt = clock.tick(FRAME_MS as f64);
        assert!((dt - 1.0).abs() < 1e-4);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        // Five seconds in the background
        assert_eq!(clock.tick(5000.0), MAX_FRAME_DELTA);
    }

    #[test]
    fn backwards_timestamp_yields_zero() {
        let mut clock = FrameClock::new();
        clock.tick(1000.0);
        assert_eq!(clock.tick(900.0), 0.0);
    }

    #[test]
    fn reset_forgets_elapsed_time() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.reset();
        assert_eq!(clock.tick(60_000.0), 1.0);
    }

    proptest! {
        #[test]
        fn delta_always_in_range(a in 0.0f64..1e9, b in 0.0f64..1e9) {
            let mut clock = FrameClock::new();
            clock.tick(a);
            let dt = clock.tick(b);
            prop_assert!(dt >= 0.0);
            prop_assert!(dt <= MAX_FRAME_DELTA);
        }
    }
}
