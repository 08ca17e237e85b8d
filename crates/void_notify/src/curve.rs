//! Cubic Bézier curves over scalar values

use serde::{Deserialize, Serialize};

/// One-dimensional cubic Bézier curve
///
/// `B(t) = (1-t)^3 * P0 + 3(1-t)^2 t * P1 + 3(1-t) t^2 * P2 + t^3 * P3`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BezierCurve {
    /// Start value
    pub p0: f32,
    /// First control value
    pub p1: f32,
    /// Second control value
    pub p2: f32,
    /// End value
    pub p3: f32,
}

impl BezierCurve {
    /// Create a curve from its four control values
    pub const fn new(p0: f32, p1: f32, p2: f32, p3: f32) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight line from `start` to `end`
    pub fn linear(start: f32, end: f32) -> Self {
        let third = (end - start) / 3.0;
        Self::new(start, start + third, end - third, end)
    }

    /// Evaluate the curve at `t`, clamped to `[0, 1]`
    ///
    /// The endpoints are returned exactly.
    pub fn evaluate(&self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return self.p0;
        }
        if t >= 1.0 {
            return self.p3;
        }

        let u = 1.0 - t;
        u * u * u * self.p0
            + 3.0 * u * u * t * self.p1
            + 3.0 * u * t * t * self.p2
            + t * t * t * self.p3
    }

    /// Start value
    pub fn start(&self) -> f32 {
        self.p0
    }

    /// End value
    pub fn end(&self) -> f32 {
        self.p3
    }
}
