//! Tolerance policy and polygon winding.

use nalgebra::Vector2;

/// Geometry tolerances used by every predicate in the solver.
///
/// All fields are absolute. The default reproduces the fixed `1e-8` used by the
/// reference behaviour; `scaled` and `for_vertices` grow the distance-type
/// epsilons with the input extent. The absolute default is scale-dependent on
/// large coordinates and is kept as the default on purpose (see DESIGN.md).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    /// Threshold on the cross product of two unit directions (parallel test),
    /// and on offset rates (stalled bisectors).
    pub eps_parallel: f64,
    /// Offset-distance equality: slice ties and the phantom-offset test.
    pub eps_offset: f64,
    /// Node position equality for deduplication.
    pub eps_merge: f64,
    /// Distance equality along and across rays (identical source, collinear).
    pub eps_length: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            eps_parallel: 1e-8,
            eps_offset: 1e-8,
            eps_merge: 1e-8,
            eps_length: 1e-8,
        }
    }
}

impl Tolerance {
    /// Scale the distance-type epsilons by `scale` (angular ones stay fixed).
    pub fn scaled(self, scale: f64) -> Self {
        let s = if scale.is_finite() && scale > 1.0 {
            scale
        } else {
            1.0
        };
        Self {
            eps_parallel: self.eps_parallel,
            eps_offset: self.eps_offset * s,
            eps_merge: self.eps_merge * s,
            eps_length: self.eps_length * s,
        }
    }

    /// Default tolerance scaled by the bounding-box diagonal of `vertices`.
    pub fn for_vertices(vertices: &[Vector2<f64>]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::default();
        };
        let (mut lo, mut hi) = (*first, *first);
        for v in vertices {
            lo = lo.inf(v);
            hi = hi.sup(v);
        }
        Self::default().scaled((hi - lo).norm())
    }
}

/// Boundary orientation in math (y-up) convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Winding {
    /// Positive shoelace area; interior on the left of each edge.
    #[default]
    CounterClockwise,
    /// Negative shoelace area; interior on the right of each edge.
    Clockwise,
}

impl Winding {
    #[inline]
    pub fn from_area(area: f64) -> Self {
        if area < 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }

    /// `+1` for counter-clockwise, `-1` for clockwise.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Winding::CounterClockwise => 1.0,
            Winding::Clockwise => -1.0,
        }
    }
}

/// Shoelace area (positive for counter-clockwise rings).
pub fn signed_area(vertices: &[Vector2<f64>]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let p = vertices[i];
        let q = vertices[(i + 1) % n];
        twice += p.x * q.y - q.x * p.y;
    }
    0.5 * twice
}
