//! 2D geometry primitives for the wavefront solver.
//!
//! Purpose
//! - Vector helpers on `nalgebra::Vector2<f64>` (normalize with length, cross,
//!   perpendicular, angle bisection).
//! - The classifying ray/ray intersection predicate that every collision test
//!   goes through.
//! - `Tolerance`: the one place where epsilons live; it is threaded through
//!   every predicate instead of scattering constants.
//!
//! Conventions
//! - Math orientation (y up). `Winding::CounterClockwise` means positive
//!   shoelace area, i.e. the interior lies to the left of every boundary edge.
//!   Screen-space clockwise input (y down) lands here.
//! - Rays carry unit directions; intersection parameters are distances.

mod ray;
mod types;
mod vector;

pub use ray::{intersect_rays, Ray2, RayIntersection, RayRelation};
pub use types::{signed_area, Tolerance, Winding};
pub use vector::{bisect, cross, normalize, perp};

#[cfg(test)]
mod tests;
