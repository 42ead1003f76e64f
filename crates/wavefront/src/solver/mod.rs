//! Wavefront-collapse solver.
//!
//! Purpose
//! - Drive the inward propagation of every polygon edge, detect where bisector
//!   rays collide, and grow the skeleton graph until every exterior edge has
//!   collapsed.
//!
//! Layout
//! - `context`: graph wrapper with acceptance flags, edge classification,
//!   bisector direction policy and node deduplication.
//! - `detect`: interior × interior and interior × exterior collisions, candidate
//!   lists, slice selection.
//! - `resolve`: events → nodes, targets and proposed bisectors; `materialize`.
//! - `schedule`: the partition stack and the public entry points.
//!
//! Determinism
//! - Every ordering is total: offset (`total_cmp`), kind priority, instigator id,
//!   target id. Maps keyed by ids are `BTreeMap`s.

mod context;
mod detect;
mod resolve;
mod schedule;
mod types;

pub use context::SolverContext;
pub use detect::{
    best_event, candidate_lists, collide_against_exterior, collide_edges, collide_interior_pair,
    create_collision_events, is_within_wavefront_boundary, select_slice, CollisionEvent,
    CollisionKind,
};
pub use resolve::{materialize, nearest_hits, resolve_slice, ProposedBisector, SliceOutcome};
pub use schedule::{solve, solve_with, split_into_loops, Partition};
pub use types::{EdgeRank, SolverCfg, SolverError};

#[cfg(test)]
mod tests;
