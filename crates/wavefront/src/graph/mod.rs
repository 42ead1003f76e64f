//! Skeleton graph: arena of nodes and edges addressed by integer ids.
//!
//! Layout
//! - Exterior nodes/edges use ids `0..num_exterior`; edge `i` runs from node `i`
//!   to node `(i + 1) % n`.
//! - Interior edges (bisector rays) use ids `>= num_exterior` and carry an
//!   `InteriorEdge` record with their two exterior parents.
//! - Nodes are never deleted; an edge's `target` is set at most once.
//!
//! This is the only structure consumers (renderers, the CLI) need to read.

mod build;
mod types;

pub use build::build_graph;
pub use types::{EdgeId, Graph, InteriorEdge, NodeId, PolygonEdge, PolygonNode};
