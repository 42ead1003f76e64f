//! Step scheduler: repeatedly resolve the earliest collision slice of a partition.
//!
//! Pending work is an explicit stack of partitions (the unresolved edges of one
//! wavefront loop plus the offset it was created at). One step pops a partition,
//! builds candidate lists, selects and resolves a slice, materializes proposals,
//! sweeps collapsed exterior edges, then pushes the surviving edges back, split
//! into loops if a node emitted two or more bisectors.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::geom::signed_area;
use crate::graph::{build_graph, EdgeId, Graph};

use super::context::SolverContext;
use super::detect::{candidate_lists, select_slice, CollisionEvent};
use super::resolve::{materialize, resolve_slice};
use super::types::{SolverCfg, SolverError};

/// Unresolved edges of one wavefront loop and the offset it was formed at.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub edges: Vec<EdgeId>,
    pub floor: f64,
}

/// Compute the straight skeleton with default configuration.
pub fn solve(vertices: &[Vector2<f64>]) -> Result<Graph, SolverError> {
    solve_with(vertices, SolverCfg::default())
}

/// Compute the straight skeleton of a simple polygon given in either winding.
///
/// Fewer than three vertices give the empty graph; zero-area input gives the
/// exterior ring without interior edges.
pub fn solve_with(vertices: &[Vector2<f64>], cfg: SolverCfg) -> Result<Graph, SolverError> {
    let graph = build_graph(vertices);
    let n = graph.num_exterior;
    if n < 3 || signed_area(vertices).abs() <= cfg.tolerance.eps_length {
        debug!(n, "degenerate input, no interior edges");
        return Ok(graph);
    }
    let ctx = SolverContext::new(graph, cfg.tolerance);
    Scheduler::new(ctx, cfg.step_cap(n)).run()
}

pub(super) struct Scheduler {
    ctx: SolverContext,
    stack: Vec<Partition>,
    steps: usize,
    cap: usize,
}

impl Scheduler {
    pub(super) fn new(ctx: SolverContext, cap: usize) -> Self {
        Self {
            ctx,
            stack: Vec::new(),
            steps: 0,
            cap,
        }
    }

    fn run(mut self) -> Result<Graph, SolverError> {
        let initial = self.ctx.active_interior_edges();
        self.stack.push(Partition {
            edges: initial,
            floor: 0.0,
        });
        while let Some(part) = self.stack.pop() {
            if self.ctx.is_complete() {
                break;
            }
            self.step(part)?;
        }
        if !self.ctx.is_complete() {
            let edges = self.ctx.active_interior_edges();
            warn!(remaining = edges.len(), "wavefront did not collapse");
            return Err(SolverError::NoCollisionsGenerable { edges });
        }
        debug!(steps = self.steps, nodes = self.ctx.graph().nodes.len(), "skeleton complete");
        Ok(self.ctx.into_graph())
    }

    pub(super) fn step(&mut self, part: Partition) -> Result<(), SolverError> {
        let active: Vec<EdgeId> = part
            .edges
            .into_iter()
            .filter(|&e| !self.ctx.is_accepted(e))
            .collect();
        if active.len() < 2 {
            return Ok(());
        }
        self.steps += 1;
        if self.steps > self.cap {
            warn!(cap = self.cap, "step cap exceeded");
            return Err(SolverError::IterationCapExceeded { steps: self.cap });
        }

        let tol = self.ctx.tolerance();
        let lists = candidate_lists(&self.ctx, &active);
        self.note_lengths(&lists);
        let Some((offset, slice)) = select_slice(&lists, part.floor, tol.eps_offset) else {
            warn!(edges = ?active, floor = part.floor, "no collision events");
            return Err(SolverError::NoCollisionsGenerable { edges: active });
        };

        let outcome = resolve_slice(&mut self.ctx, &slice);
        let created = materialize(&mut self.ctx, &outcome.proposals);
        let collapsed = self.ctx.sweep_exterior();
        debug!(
            step = self.steps,
            offset,
            events = slice.len(),
            resolved = outcome.resolved,
            created = created.len(),
            collapsed = collapsed.len(),
            split = outcome.split,
            "slice resolved"
        );

        let mut next: Vec<EdgeId> = active
            .into_iter()
            .filter(|&e| !self.ctx.is_accepted(e))
            .collect();
        next.extend(created);
        if next.is_empty() {
            return Ok(());
        }
        if outcome.split {
            let loops = split_into_loops(&self.ctx, &next, offset)?;
            for edges in loops.into_iter().rev() {
                self.stack.push(Partition {
                    edges,
                    floor: offset,
                });
            }
        } else {
            self.stack.push(Partition {
                edges: next,
                floor: offset,
            });
        }
        Ok(())
    }

    fn note_lengths(&mut self, lists: &[Vec<CollisionEvent>]) {
        for ev in lists.iter().flatten().filter(|e| !e.kind.is_phantom()) {
            for id in [ev.instigator, ev.target] {
                if self.ctx.interior(id).is_some() {
                    let src = self.ctx.graph().node(self.ctx.graph().edge(id).source).position;
                    self.ctx.note_length(id, (ev.position - src).norm());
                }
            }
        }
    }
}

/// Split unresolved edges into wavefront loops at `offset`.
///
/// The successor of `x` is an edge whose widdershins parent is `x`'s clockwise
/// parent. With several candidates (pieces of a split exterior edge) the nearest
/// one ahead along that parent's direction wins; candidates sharing `x`'s source
/// at the same spot are passed over while any other remains.
pub fn split_into_loops(
    ctx: &SolverContext,
    edges: &[EdgeId],
    offset: f64,
) -> Result<Vec<Vec<EdgeId>>, SolverError> {
    let eps = ctx.tolerance().eps_length;
    let mut by_ws: BTreeMap<usize, Vec<EdgeId>> = BTreeMap::new();
    for &e in edges {
        if let Some((_, ws)) = ctx.parents(e) {
            by_ws.entry(ws).or_default().push(e);
        }
    }

    let successor = |x: EdgeId| -> Option<EdgeId> {
        let (cw, _) = ctx.parents(x)?;
        let candidates = by_ws.get(&cw)?;
        if let [only] = candidates.as_slice() {
            return Some(*only);
        }
        let dir = ctx.graph().edges[cw].basis;
        let here = dir.dot(&ctx.position_at(x, offset));
        let source = ctx.graph().edge(x).source;
        let pick = |skip_shared_source: bool| {
            candidates
                .iter()
                .copied()
                .filter(|&y| y != x)
                .map(|y| (dir.dot(&ctx.position_at(y, offset)) - here, y))
                .filter(|&(ahead, y)| {
                    let shared = ctx.graph().edge(y).source == source && ahead.abs() <= eps;
                    ahead >= -eps && !(skip_shared_source && shared)
                })
                .min_by(|(a, ya), (b, yb)| a.total_cmp(b).then(ya.cmp(yb)))
                .map(|(_, y)| y)
        };
        pick(true).or_else(|| pick(false))
    };

    let mut assigned: BTreeSet<EdgeId> = BTreeSet::new();
    let mut loops = Vec::new();
    for &start in edges {
        if assigned.contains(&start) {
            continue;
        }
        let mut cycle = vec![start];
        let mut cur = start;
        loop {
            let unassignable = || SolverError::UnassignableEdge {
                edge: cur,
                partition: edges.to_vec(),
            };
            let next = successor(cur).ok_or_else(unassignable)?;
            if next == start {
                break;
            }
            if cycle.contains(&next) || assigned.contains(&next) {
                warn!(edge = cur.0, "wavefront walk does not close");
                return Err(unassignable());
            }
            cycle.push(next);
            cur = next;
        }
        assigned.extend(cycle.iter().copied());
        loops.push(cycle);
    }
    Ok(loops)
}
