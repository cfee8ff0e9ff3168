//! Piecewise-linear membership functions.

use serde::{Deserialize, Serialize};

/// A triangular or trapezoidal fuzzy set over the real line.
///
/// Breakpoints must be ordered (`a ≤ b ≤ c [≤ d]`).  Equal neighbouring
/// breakpoints give vertical edges, which is how shoulder sets such as
/// "Low = trap(0, 0, .25, .5)" are written.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MembershipFn {
    /// Rises on `[a, b]`, falls on `[b, c]`.
    Triangle { a: f32, b: f32, c: f32 },
    /// Rises on `[a, b]`, is 1 on `[b, c]`, falls on `[c, d]`.
    Trapezoid { a: f32, b: f32, c: f32, d: f32 },
}

impl MembershipFn {
    pub fn triangle(a: f32, b: f32, c: f32) -> Self {
        MembershipFn::Triangle { a, b, c }
    }

    pub fn trapezoid(a: f32, b: f32, c: f32, d: f32) -> Self {
        MembershipFn::Trapezoid { a, b, c, d }
    }

    /// The four breakpoints, with a triangle's peak repeated.
    #[inline]
    fn corners(&self) -> (f32, f32, f32, f32) {
        match *self {
            MembershipFn::Triangle { a, b, c }     => (a, b, b, c),
            MembershipFn::Trapezoid { a, b, c, d } => (a, b, c, d),
        }
    }

    /// Degree of membership of `x`, in `[0, 1]`.
    pub fn degree(&self, x: f32) -> f32 {
        let (a, b, c, d) = self.corners();
        if x < a || x > d {
            0.0
        } else if x >= b && x <= c {
            1.0
        } else if x < b {
            (x - a) / (b - a)
        } else {
            (d - x) / (d - c)
        }
    }

    /// Area under the membership curve.
    pub fn area(&self) -> f32 {
        let (a, b, c, d) = self.corners();
        ((d - a) + (c - b)) * 0.5
    }

    /// x-coordinate of the centroid of the area under the curve.
    ///
    /// Degenerate (zero-area) sets return their left breakpoint.
    pub fn centroid(&self) -> f32 {
        let (a, b, c, d) = self.corners();
        let den = 3.0 * ((d + c) - (a + b));
        if den <= f32::EPSILON {
            return a;
        }
        ((d * d + c * d + c * c) - (a * a + a * b + b * b)) / den
    }

    /// `true` if the breakpoints are finite and ordered.
    pub fn is_well_formed(&self) -> bool {
        let (a, b, c, d) = self.corners();
        [a, b, c, d].iter().all(|v| v.is_finite()) && a <= b && b <= c && c <= d
    }
}
