//! Solver configuration, failure kinds and shared small types.

use thiserror::Error;

use crate::geom::Tolerance;
use crate::graph::EdgeId;

/// Solver configuration.
///
/// `max_steps = None` derives the cap from the vertex count (see [`SolverCfg::step_cap`]).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolverCfg {
    pub tolerance: Tolerance,
    pub max_steps: Option<usize>,
}

impl SolverCfg {
    /// Configuration whose distance tolerances follow the input's extent.
    pub fn scaled_for(vertices: &[nalgebra::Vector2<f64>]) -> Self {
        Self {
            tolerance: Tolerance::for_vertices(vertices),
            max_steps: None,
        }
    }

    /// Number of scheduler steps allowed for a polygon with `num_exterior` edges.
    #[inline]
    pub fn step_cap(&self, num_exterior: usize) -> usize {
        self.max_steps.unwrap_or(32 * num_exterior + 64)
    }
}

/// Failure kinds surfaced by the scheduler.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("no collision events for {} unresolved edges: {edges:?}", edges.len())]
    NoCollisionsGenerable { edges: Vec<EdgeId> },
    #[error("edge {edge:?} fits no wavefront loop after split; partition {partition:?}")]
    UnassignableEdge { edge: EdgeId, partition: Vec<EdgeId> },
    #[error("step cap exceeded after {steps} steps")]
    IterationCapExceeded { steps: usize },
}

/// Classification of an edge id against the current graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRank {
    /// Boundary segment (`id < num_exterior`).
    Exterior,
    /// Bisector whose source is a polygon vertex.
    Primary,
    /// Bisector created by an earlier collision.
    Secondary,
}
