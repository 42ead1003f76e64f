//! Curated surface for callers (renderers, the CLI).
//!
//! Not a stability promise; re-exports move with the modules they come from.

// geometry
pub use crate::geom::{
    intersect_rays, signed_area, Ray2, RayIntersection, RayRelation, Tolerance, Winding,
};
// skeleton graph
pub use crate::graph::{
    build_graph, EdgeId, Graph, InteriorEdge, NodeId, PolygonEdge, PolygonNode,
};
// solver
pub use crate::solver::{
    create_collision_events, solve, solve_with, CollisionEvent, CollisionKind, SolverCfg,
    SolverContext, SolverError,
};
