//! Ray/ray intersection with an explicit relation tag.
//!
//! The pair is canonicalized so that `cross(d1, d2) > 0` before solving the
//! 2×2 system, then results are swapped back. Signs of `t1`, `t2` are thus
//! computed from one formula only.

use nalgebra::Vector2;

use super::types::Tolerance;
use super::vector::cross;

/// Ray `origin + t * dir`, `dir` unit length, `t >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray2 {
    pub origin: Vector2<f64>,
    pub dir: Vector2<f64>,
}

impl Ray2 {
    #[inline]
    pub fn new(origin: Vector2<f64>, dir: Vector2<f64>) -> Self {
        Self { origin, dir }
    }
    #[inline]
    pub fn at(&self, t: f64) -> Vector2<f64> {
        self.origin + self.dir * t
    }
}

/// How two rays relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RayRelation {
    /// Lines cross ahead of both sources.
    Converging,
    /// Lines cross behind at least one source, or collinear rays point apart.
    Diverging,
    /// Anti-parallel, collinear and facing each other.
    HeadOn,
    /// Parallel (or anti-parallel) on distinct lines.
    Parallel,
    /// Sources coincide.
    IdenticalSource,
    /// Same direction, collinear, ray 2's source lies ahead of ray 1's.
    CoLinearFrom1,
    /// Same direction, collinear, ray 1's source lies ahead of ray 2's.
    CoLinearFrom2,
}

/// Result of `intersect_rays`.
///
/// `t1`, `t2` are signed distances along each ray to the meeting point:
/// - crossing lines: the crossing point;
/// - `HeadOn`: both equal the distance between the sources;
/// - `CoLinearFrom1`/`CoLinearFrom2`: the trailing ray's distance to the leading
///   source, and `0` for the leading ray;
/// - `Parallel`: both infinite; `IdenticalSource`: both zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayIntersection {
    pub t1: f64,
    pub t2: f64,
    pub kind: RayRelation,
}

pub fn intersect_rays(r1: &Ray2, r2: &Ray2, tol: &Tolerance) -> RayIntersection {
    let w = r2.origin - r1.origin;
    if w.norm() <= tol.eps_length {
        return RayIntersection {
            t1: 0.0,
            t2: 0.0,
            kind: RayRelation::IdenticalSource,
        };
    }
    let det = cross(r1.dir, r2.dir);
    if det.abs() <= tol.eps_parallel {
        return parallel_case(r1, r2, w, tol);
    }
    // Canonical order: det > 0.
    let (a, b, swapped) = if det > 0.0 {
        (r1, r2, false)
    } else {
        (r2, r1, true)
    };
    let wab = b.origin - a.origin;
    let d = cross(a.dir, b.dir);
    let ta = cross(wab, b.dir) / d;
    let tb = cross(wab, a.dir) / d;
    let (t1, t2) = if swapped { (tb, ta) } else { (ta, tb) };
    let kind = if t1 > -tol.eps_length && t2 > -tol.eps_length {
        RayRelation::Converging
    } else {
        RayRelation::Diverging
    };
    RayIntersection { t1, t2, kind }
}

fn parallel_case(r1: &Ray2, r2: &Ray2, w: Vector2<f64>, tol: &Tolerance) -> RayIntersection {
    if cross(r1.dir, w).abs() > tol.eps_length {
        return RayIntersection {
            t1: f64::INFINITY,
            t2: f64::INFINITY,
            kind: RayRelation::Parallel,
        };
    }
    let along = w.dot(&r1.dir);
    if r1.dir.dot(&r2.dir) > 0.0 {
        if along > 0.0 {
            RayIntersection {
                t1: along,
                t2: 0.0,
                kind: RayRelation::CoLinearFrom1,
            }
        } else {
            RayIntersection {
                t1: 0.0,
                t2: -along,
                kind: RayRelation::CoLinearFrom2,
            }
        }
    } else if along > 0.0 {
        RayIntersection {
            t1: along,
            t2: along,
            kind: RayRelation::HeadOn,
        }
    } else {
        RayIntersection {
            t1: along,
            t2: along,
            kind: RayRelation::Diverging,
        }
    }
}
