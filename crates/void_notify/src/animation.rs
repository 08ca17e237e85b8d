//! Per-tick tweening along a Bézier curve
//!
//! A [`Tween`] is advanced by the host's update loop with the frame delta.
//! It produces a finite sequence of values and always finishes on the exact
//! end value of its curve.

use crate::curve::BezierCurve;

/// Duration substituted for zero, negative or non-finite durations (seconds)
pub const MIN_DURATION: f32 = 1e-5;

/// Drives a value along a curve over a fixed duration
#[derive(Debug, Clone)]
pub struct Tween {
    curve: BezierCurve,
    duration: f32,
    elapsed: f32,
    finished: bool,
}

impl Tween {
    /// Create a tween lasting `duration` seconds
    pub fn new(curve: BezierCurve, duration: f32) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            log::debug!(
                "Tween duration {} is not positive, using {}s to prevent division by zero",
                duration,
                MIN_DURATION
            );
            MIN_DURATION
        };

        Self {
            curve,
            duration,
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Advance by `delta_time` seconds and return the value for this tick
    ///
    /// The tick on which the duration is reached yields the curve's end value
    /// exactly. Every call after that returns `None`.
    pub fn advance(&mut self, delta_time: f32) -> Option<f32> {
        if self.finished {
            return None;
        }

        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed += delta_time;
        }

        let t = self.elapsed / self.duration;
        if t >= 1.0 {
            self.finished = true;
            self.elapsed = self.duration;
            return Some(self.curve.end());
        }

        Some(self.curve.evaluate(t))
    }

    /// Iterate the remaining ticks at a constant frame time
    ///
    /// A zero, negative or non-finite frame time is replaced with
    /// [`MIN_DURATION`] so the sequence always ends.
    pub fn fixed_steps(self, delta_time: f32) -> FixedSteps {
        let delta_time = if delta_time.is_finite() && delta_time > 0.0 {
            delta_time
        } else {
            MIN_DURATION
        };

        FixedSteps {
            tween: self,
            delta_time,
        }
    }

    /// Normalized progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the end value has been produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Effective duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// The curve being followed
    pub fn curve(&self) -> &BezierCurve {
        &self.curve
    }
}

/// Iterator over a tween's values at a constant frame time
#[derive(Debug, Clone)]
pub struct FixedSteps {
    tween: Tween,
    delta_time: f32,
}

impl Iterator for FixedSteps {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.tween.advance(self.delta_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_finishes_on_end_value() {
        let curve = BezierCurve::new(0.0, 3.0, -1.0, 7.5);
        let values: Vec<f32> = Tween::new(curve, 0.5).fixed_steps(0.016).collect();

        // ceil(0.5 / 0.016) ticks
        assert_eq!(values.len(), 32);
        assert_eq!(*values.last().unwrap(), 7.5);
    }

    #[test]
    fn test_tween_is_not_restartable() {
        let mut tween = Tween::new(BezierCurve::linear(0.0, 1.0), 0.1);

        assert_eq!(tween.advance(0.2), Some(1.0));
        assert!(tween.is_finished());
        assert_eq!(tween.advance(0.2), None);
        assert_eq!(tween.advance(0.0), None);
    }

    #[test]
    fn test_zero_duration_is_substituted() {
        let mut tween = Tween::new(BezierCurve::linear(5.0, 10.0), 0.0);
        assert_eq!(tween.duration(), MIN_DURATION);
        assert_eq!(tween.advance(0.016), Some(10.0));

        let tween = Tween::new(BezierCurve::linear(5.0, 10.0), -2.0);
        assert_eq!(tween.duration(), MIN_DURATION);

        let tween = Tween::new(BezierCurve::linear(5.0, 10.0), f32::NAN);
        assert_eq!(tween.duration(), MIN_DURATION);
    }

    #[test]
    fn test_progress_tracks_elapsed_time() {
        let mut tween = Tween::new(BezierCurve::linear(0.0, 100.0), 1.0);

        tween.advance(0.25);
        assert!((tween.progress() - 0.25).abs() < 1e-6);

        let value = tween.advance(0.25).unwrap();
        assert!((value - 50.0).abs() < 1e-3);
        assert!(!tween.is_finished());
    }

    #[test]
    fn test_fixed_steps_with_bad_frame_time_still_ends() {
        for delta_time in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let values: Vec<f32> = Tween::new(BezierCurve::linear(0.0, 1.0), 0.01)
                .fixed_steps(delta_time)
                .take(10_000)
                .collect();

            assert!(values.len() < 10_000);
            assert_eq!(*values.last().unwrap(), 1.0);
        }
    }

    #[test]
    fn test_zero_delta_does_not_finish() {
        let mut tween = Tween::new(BezierCurve::linear(2.0, 4.0), 1.0);

        assert_eq!(tween.advance(0.0), Some(2.0));
        assert_eq!(tween.advance(-1.0), Some(2.0));
        assert!(!tween.is_finished());
    }
}
