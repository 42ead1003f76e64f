//! Straight skeletons of simple polygons by wavefront collapse.
//!
//! Every polygon edge moves inward at unit speed; the paths traced by the
//! wavefront's corners form the skeleton. The solver is event driven: it finds
//! the earliest collisions between bisector rays, resolves them into graph
//! nodes and new bisectors, and splits the wavefront into independent loops
//! when the polygon pinches apart.
//!
//! Entry points: [`solver::solve`] and [`solver::solve_with`]. The result is a
//! [`graph::Graph`] that callers can walk without solver state.

pub mod api;
pub mod geom;
pub mod graph;
pub mod solver;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom::{Tolerance, Winding};
    pub use crate::graph::{EdgeId, Graph, NodeId};
    pub use crate::solver::{solve, solve_with, SolverCfg, SolverError};
    pub use nalgebra::Vector2 as Vec2;
}
