//! Solver context: the graph under construction plus acceptance flags.
//!
//! Conventions
//! - `accepted[id]` is indexed by edge id and grows with the edge list.
//! - Offsets are perpendicular wavefront distances; an interior edge's offset at
//!   distance `t` along its ray is `source_offset + t * offset_rate`.
//! - Interior nodes are indexed in a spatial hash with cells a few `eps_merge`
//!   wide; lookups scan the 3×3 neighbourhood.

use std::collections::HashMap;

use nalgebra::Vector2;

use crate::geom::{bisect, cross, Ray2, Tolerance};
use crate::graph::{EdgeId, Graph, InteriorEdge, NodeId};

use super::types::EdgeRank;

type Cell = (i64, i64);

/// Mutable solver state wrapping a [`Graph`].
#[derive(Clone, Debug)]
pub struct SolverContext {
    graph: Graph,
    accepted: Vec<bool>,
    tol: Tolerance,
    node_index: HashMap<Cell, Vec<NodeId>>,
    cell: f64,
}

impl SolverContext {
    /// Wrap a freshly built graph and seed one primary bisector per vertex.
    pub fn new(graph: Graph, tol: Tolerance) -> Self {
        let cell = (4.0 * tol.eps_merge).max(f64::MIN_POSITIVE);
        let mut ctx = Self {
            accepted: vec![false; graph.edges.len()],
            graph,
            tol,
            node_index: HashMap::new(),
            cell,
        };
        let n = ctx.graph.num_exterior;
        for k in n..ctx.graph.nodes.len() {
            let key = ctx.cell_of(ctx.graph.nodes[k].position);
            ctx.node_index.entry(key).or_default().push(NodeId(k));
        }
        if ctx.graph.interior.is_empty() {
            for i in 0..n {
                let (cw, ws) = (i, (i + n - 1) % n);
                let dir = ctx.interior_bisector(cw, ws, None);
                ctx.push_bisector(NodeId(i), cw, ws, dir);
            }
        }
        ctx
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }

    #[inline]
    pub fn num_exterior(&self) -> usize {
        self.graph.num_exterior
    }

    #[inline]
    pub fn is_accepted(&self, id: EdgeId) -> bool {
        self.accepted.get(id.0).copied().unwrap_or(false)
    }

    pub fn accepted(&self) -> &[bool] {
        &self.accepted
    }

    pub(crate) fn accept(&mut self, id: EdgeId) {
        if let Some(a) = self.accepted.get_mut(id.0) {
            *a = true;
        }
    }

    pub fn rank(&self, id: EdgeId) -> EdgeRank {
        if self.graph.is_exterior(id) {
            EdgeRank::Exterior
        } else if self.graph.edge(id).source.0 < self.graph.num_exterior {
            EdgeRank::Primary
        } else {
            EdgeRank::Secondary
        }
    }

    #[inline]
    pub fn interior(&self, id: EdgeId) -> Option<&InteriorEdge> {
        self.graph.interior_edge(id)
    }

    /// `(clockwise, widdershins)` exterior parents of an interior edge.
    pub fn parents(&self, id: EdgeId) -> Option<(usize, usize)> {
        self.interior(id).map(|ie| (ie.clockwise, ie.widdershins))
    }

    /// Unresolved interior edges in id order.
    pub fn active_interior_edges(&self) -> Vec<EdgeId> {
        self.graph
            .interior
            .iter()
            .map(|ie| ie.id)
            .filter(|&id| !self.is_accepted(id))
            .collect()
    }

    /// Unresolved exterior edge ids.
    pub fn active_exterior_edges(&self) -> Vec<usize> {
        (0..self.graph.num_exterior)
            .filter(|&i| !self.accepted[i])
            .collect()
    }

    /// Interior-pointing bisector of the wavefront corner between `ws` and `cw`.
    ///
    /// The base direction is `bisect(d_cw, -d_ws)`. Its sign is fixed by the sum of
    /// the parents' inward normals; when that sum vanishes (anti-parallel parents)
    /// the approximate direction decides, and without one the base direction stands.
    pub fn interior_bisector(
        &self,
        cw: usize,
        ws: usize,
        approx: Option<Vector2<f64>>,
    ) -> Vector2<f64> {
        let g = &self.graph;
        let u = bisect(g.edges[cw].basis, -g.edges[ws].basis);
        let normals = g.inward_normal(cw) + g.inward_normal(ws);
        if normals.norm() > self.tol.eps_parallel {
            if u.dot(&normals) < 0.0 {
                return -u;
            }
        } else if let Some(a) = approx {
            if u.dot(&a) < 0.0 {
                return -u;
            }
        }
        u
    }

    /// True if the corner between the edge's parents has an interior angle above 180°.
    pub fn is_reflex(&self, id: EdgeId) -> bool {
        let Some((cw, ws)) = self.parents(id) else {
            return false;
        };
        let g = &self.graph;
        cross(g.edges[ws].basis, g.edges[cw].basis) * g.winding.sign() < -self.tol.eps_parallel
    }

    /// Wavefront offset at the edge's source node.
    pub fn source_offset(&self, id: EdgeId) -> f64 {
        match (self.rank(id), self.parents(id)) {
            (EdgeRank::Secondary, Some((cw, _))) => {
                let s = self.graph.node(self.graph.edge(id).source).position;
                self.graph
                    .inward_normal(cw)
                    .dot(&(s - self.graph.exterior_anchor(cw)))
            }
            _ => 0.0,
        }
    }

    /// Offset gained per unit distance along the ray; zero for a stalled ridge.
    pub fn offset_rate(&self, id: EdgeId) -> f64 {
        match self.parents(id) {
            Some((cw, _)) => self.graph.edge(id).basis.dot(&self.graph.inward_normal(cw)),
            None => 0.0,
        }
    }

    #[inline]
    pub fn ray(&self, id: EdgeId) -> Ray2 {
        let e = self.graph.edge(id);
        Ray2::new(self.graph.node(e.source).position, e.basis)
    }

    /// Where the edge's wavefront corner sits at `offset` (its source if stalled).
    pub fn position_at(&self, id: EdgeId, offset: f64) -> Vector2<f64> {
        let ray = self.ray(id);
        let k = self.offset_rate(id);
        if k > self.tol.eps_parallel {
            ray.at((offset - self.source_offset(id)) / k)
        } else {
            ray.origin
        }
    }

    /// Record a forward collision distance; keeps the minimum.
    pub(crate) fn note_length(&mut self, id: EdgeId, dist: f64) {
        if let Some(ie) = self.graph.interior_edge_mut(id) {
            if dist.is_finite() && dist >= 0.0 && dist < ie.length {
                ie.length = dist;
            }
        }
    }

    fn cell_of(&self, p: Vector2<f64>) -> Cell {
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    /// Existing interior node within `eps_merge` of `pos`, if any (nearest wins).
    pub fn find_node(&self, pos: Vector2<f64>) -> Option<NodeId> {
        let (cx, cy) = self.cell_of(pos);
        let mut best: Option<(f64, NodeId)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.node_index.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &id in ids {
                    let d = (self.graph.node(id).position - pos).norm();
                    if d > self.tol.eps_merge {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((bd, bid)) => d < bd || (d == bd && id < bid),
                    };
                    if better {
                        best = Some((d, id));
                    }
                }
            }
        }
        best.map(|(_, id)| id)
    }

    /// Reuse the node at `pos` or create a new interior node there.
    pub(crate) fn find_or_insert_node(&mut self, pos: Vector2<f64>) -> NodeId {
        if let Some(id) = self.find_node(pos) {
            return id;
        }
        let id = self.graph.push_node(pos);
        let key = self.cell_of(pos);
        self.node_index.entry(key).or_default().push(id);
        id
    }

    pub(crate) fn push_bisector(
        &mut self,
        source: NodeId,
        cw: usize,
        ws: usize,
        dir: Vector2<f64>,
    ) -> EdgeId {
        let id = self.graph.push_interior_edge(source, cw, ws, dir);
        self.accepted.push(false);
        id
    }

    /// Set the edge's target and accept it. Returns `false` if a target was already set.
    pub(crate) fn resolve_edge(&mut self, edge: EdgeId, node: NodeId) -> bool {
        let fresh = self.graph.set_target(edge, node);
        self.accept(edge);
        fresh
    }

    /// Whether an exterior edge has collapsed: every bisector bounding one of its
    /// wavefront pieces has been resolved.
    pub fn exterior_collapsed(&self, exterior: usize) -> bool {
        let mut bounding = self
            .graph
            .interior
            .iter()
            .filter(|ie| ie.has_parent(exterior))
            .peekable();
        bounding.peek().is_some() && bounding.all(|ie| self.is_accepted(ie.id))
    }

    /// Accept every exterior edge that has collapsed; returns the newly accepted ids.
    pub(crate) fn sweep_exterior(&mut self) -> Vec<usize> {
        let done: Vec<usize> = self
            .active_exterior_edges()
            .into_iter()
            .filter(|&i| self.exterior_collapsed(i))
            .collect();
        for &i in &done {
            self.accepted[i] = true;
        }
        done
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.graph.is_complete(&self.accepted)
    }
}
