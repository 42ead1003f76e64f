//! Collision detection between wavefront edges.
//!
//! Detection is pure: it reads the context and returns events. Provisional ray
//! lengths are recorded by the scheduler afterwards.
//!
//! Shapes
//! - Interior × interior: the two bisector rays are classified with
//!   [`intersect_rays`]; the event offset is where each ray's wavefront corner
//!   reaches the meeting point. Disagreeing offsets mark a phantom.
//! - Interior × exterior: a reflex bisector against a non-parent exterior edge.
//!   The bisector meets the edge's wavefront where its distance to the edge's
//!   line equals its own offset; the hit must land on the part of the edge the
//!   wavefront still carries at that offset.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use nalgebra::Vector2;

use crate::geom::{intersect_rays, RayRelation};
use crate::graph::EdgeId;

use super::context::SolverContext;
use super::types::EdgeRank;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// Two bisectors sharing an exterior parent; the parent collapses.
    InteriorPair,
    /// Two bisectors without a shared parent; the region splits.
    InteriorNonAdjacent,
    /// A reflex bisector striking a distant exterior edge; the region splits.
    InteriorAgainstExterior,
    /// Ray lines cross but the wavefronts arrive at different offsets.
    PhantomDivergentOffset,
}

impl CollisionKind {
    /// Tie-break rank within an offset slice (lower resolves first).
    #[inline]
    pub fn priority(self) -> u8 {
        match self {
            CollisionKind::InteriorPair => 0,
            CollisionKind::InteriorNonAdjacent => 1,
            CollisionKind::InteriorAgainstExterior => 2,
            CollisionKind::PhantomDivergentOffset => 3,
        }
    }

    #[inline]
    pub fn is_phantom(self) -> bool {
        self == CollisionKind::PhantomDivergentOffset
    }
}

/// A detected collision; `target` is an exterior edge id for `InteriorAgainstExterior`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    pub kind: CollisionKind,
    pub instigator: EdgeId,
    pub target: EdgeId,
    pub offset: f64,
    pub position: Vector2<f64>,
    /// Both rays are stalled ridges meeting head-on; they end at each other's source.
    pub stalled: bool,
}

impl CollisionEvent {
    /// Total order: offset, kind priority, instigator id, target id.
    pub fn ordering(&self, other: &Self) -> Ordering {
        self.offset
            .total_cmp(&other.offset)
            .then(self.kind.priority().cmp(&other.kind.priority()))
            .then(self.instigator.cmp(&other.instigator))
            .then(self.target.cmp(&other.target))
    }

    /// Order used inside one slice: kind priority, then ids.
    pub fn slice_ordering(&self, other: &Self) -> Ordering {
        self.kind
            .priority()
            .cmp(&other.kind.priority())
            .then(self.instigator.cmp(&other.instigator))
            .then(self.target.cmp(&other.target))
    }
}

/// Collide two unresolved edges; `active` bounds the exterior wavefront extents.
///
/// Returns `None` if either edge is accepted, if `a` is exterior, or if the pair
/// does not collide.
pub fn collide_edges(
    ctx: &SolverContext,
    a: EdgeId,
    b: EdgeId,
    active: &[EdgeId],
) -> Option<CollisionEvent> {
    if a == b || ctx.is_accepted(a) || ctx.is_accepted(b) {
        return None;
    }
    match (ctx.rank(a), ctx.rank(b)) {
        (EdgeRank::Exterior, _) => None,
        (_, EdgeRank::Exterior) if ctx.is_reflex(a) => {
            collide_against_exterior(ctx, a, b.0, active)
        }
        (_, EdgeRank::Exterior) => None,
        _ => collide_interior_pair(ctx, a, b),
    }
}

/// Interior × interior collision.
pub fn collide_interior_pair(ctx: &SolverContext, a: EdgeId, b: EdgeId) -> Option<CollisionEvent> {
    let tol = ctx.tolerance();
    let (pa, pb) = (ctx.parents(a)?, ctx.parents(b)?);
    let (ra, rb) = (ctx.ray(a), ctx.ray(b));
    let (oa, ob) = (ctx.source_offset(a), ctx.source_offset(b));
    let (ka, kb) = (ctx.offset_rate(a), ctx.offset_rate(b));
    let hit = intersect_rays(&ra, &rb, &tol);

    let (position, off_a, off_b, stalled) = match hit.kind {
        RayRelation::Converging => (ra.at(hit.t1), oa + hit.t1 * ka, ob + hit.t2 * kb, false),
        RayRelation::HeadOn => {
            let gap = hit.t1;
            if ka + kb <= tol.eps_parallel {
                (ra.at(0.5 * gap), oa, ob, true)
            } else {
                let s = ((ob - oa + gap * kb) / (ka + kb)).clamp(0.0, gap);
                (ra.at(s), oa + s * ka, ob + (gap - s) * kb, false)
            }
        }
        RayRelation::CoLinearFrom1 => (rb.origin, oa + hit.t1 * ka, ob, false),
        RayRelation::Diverging
        | RayRelation::Parallel
        | RayRelation::IdenticalSource
        | RayRelation::CoLinearFrom2 => return None,
    };

    let kind = if (off_a - off_b).abs() > tol.eps_offset {
        CollisionKind::PhantomDivergentOffset
    } else if pa.0 == pb.1 || pa.1 == pb.0 {
        CollisionKind::InteriorPair
    } else {
        CollisionKind::InteriorNonAdjacent
    };
    Some(CollisionEvent {
        kind,
        instigator: a,
        target: b,
        offset: off_a.max(off_b),
        position,
        stalled: stalled && !kind.is_phantom(),
    })
}

/// Reflex interior edge `a` against exterior edge `exterior`.
pub fn collide_against_exterior(
    ctx: &SolverContext,
    a: EdgeId,
    exterior: usize,
    active: &[EdgeId],
) -> Option<CollisionEvent> {
    let tol = ctx.tolerance();
    let (cw, ws) = ctx.parents(a)?;
    if exterior == cw || exterior == ws || exterior >= ctx.num_exterior() {
        return None;
    }
    let g = ctx.graph();
    let normal = g.inward_normal(exterior);
    let ray = ctx.ray(a);
    let (o, k) = (ctx.source_offset(a), ctx.offset_rate(a));

    // distance to the edge's line changes at `m` per unit length, the own offset at `k`
    let h = normal.dot(&(ray.origin - g.exterior_anchor(exterior)));
    let m = normal.dot(&ray.dir);
    let closing = k - m;
    if closing <= tol.eps_parallel {
        return None;
    }
    let gap = h - o;
    if gap < -tol.eps_length {
        return None;
    }
    let s = gap.max(0.0) / closing;
    let offset = o + s * k;
    if offset <= tol.eps_offset {
        return None;
    }
    let position = ray.at(s);
    if !is_within_wavefront_boundary(ctx, exterior, position, offset, active) {
        return None;
    }
    Some(CollisionEvent {
        kind: CollisionKind::InteriorAgainstExterior,
        instigator: a,
        target: EdgeId(exterior),
        offset,
        position,
        stalled: false,
    })
}

/// Whether `position` lies on a piece of `exterior`'s wavefront at `offset`.
///
/// Each piece is bounded by an active bisector with `exterior` as clockwise parent
/// (its start) and one with it as widdershins parent (its end); both ends are
/// advanced to `offset` and compared along the edge direction.
pub fn is_within_wavefront_boundary(
    ctx: &SolverContext,
    exterior: usize,
    position: Vector2<f64>,
    offset: f64,
    active: &[EdgeId],
) -> bool {
    let eps = ctx.tolerance().eps_length;
    let dir = ctx.graph().edges[exterior].basis;
    let proj = dir.dot(&position);

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for &id in active {
        let Some((cw, ws)) = ctx.parents(id) else {
            continue;
        };
        if cw != exterior && ws != exterior {
            continue;
        }
        let p = dir.dot(&ctx.position_at(id, offset));
        if cw == exterior {
            starts.push(p);
        }
        if ws == exterior {
            ends.push(p);
        }
    }

    let lo = starts
        .iter()
        .copied()
        .filter(|&p| p <= proj + eps)
        .max_by(f64::total_cmp);
    let hi = ends
        .iter()
        .copied()
        .filter(|&p| p >= proj - eps)
        .min_by(f64::total_cmp);
    let (Some(lo), Some(hi)) = (lo, hi) else {
        return false;
    };
    let piece_ends_before = ends.iter().any(|&p| p > lo + eps && p < proj - eps);
    let piece_starts_after = starts.iter().any(|&p| p > proj + eps && p < hi - eps);
    !(piece_ends_before || piece_starts_after)
}

/// Per-instigator candidate lists for a partition, each sorted by [`CollisionEvent::ordering`].
///
/// Every unresolved edge is collided against the rest of the partition; reflex
/// instigators are also collided against the partition's unresolved exterior parents.
pub fn candidate_lists(ctx: &SolverContext, partition: &[EdgeId]) -> Vec<Vec<CollisionEvent>> {
    let active: Vec<EdgeId> = partition
        .iter()
        .copied()
        .filter(|&e| !ctx.is_accepted(e))
        .collect();
    let exteriors: BTreeSet<usize> = active
        .iter()
        .filter_map(|&e| ctx.parents(e))
        .flat_map(|(cw, ws)| [cw, ws])
        .filter(|&x| !ctx.is_accepted(EdgeId(x)))
        .collect();

    let mut lists = Vec::with_capacity(active.len());
    for &a in &active {
        let mut list: Vec<CollisionEvent> = active
            .iter()
            .filter_map(|&b| collide_edges(ctx, a, b, &active))
            .collect();
        if ctx.is_reflex(a) {
            list.extend(
                exteriors
                    .iter()
                    .filter_map(|&x| collide_edges(ctx, a, EdgeId(x), &active)),
            );
        }
        if !list.is_empty() {
            list.sort_by(CollisionEvent::ordering);
            lists.push(list);
        }
    }
    lists
}

/// Best event of a sorted candidate list.
///
/// The earliest genuine event wins over phantoms; among genuine events within
/// `eps_offset` of it the lowest kind priority is taken.
pub fn best_event(list: &[CollisionEvent], eps_offset: f64) -> Option<CollisionEvent> {
    let Some(first) = list.iter().find(|e| !e.kind.is_phantom()) else {
        return list.first().copied();
    };
    list.iter()
        .filter(|e| !e.kind.is_phantom() && e.offset <= first.offset + eps_offset)
        .min_by(|x, y| x.slice_ordering(y))
        .copied()
}

/// Best event per unresolved interior edge, flattened and sorted by offset.
///
/// Pure: calling it twice on the same context returns identical results.
pub fn create_collision_events(ctx: &SolverContext) -> Vec<CollisionEvent> {
    let eps = ctx.tolerance().eps_offset;
    let mut events: Vec<CollisionEvent> = candidate_lists(ctx, &ctx.active_interior_edges())
        .iter()
        .filter_map(|list| best_event(list, eps))
        .collect();
    events.sort_by(CollisionEvent::ordering);
    events
}

/// Select the earliest slice holding a genuine event.
///
/// Events below `floor - eps_offset` are ignored. Slices are formed from the
/// smallest remaining offset plus `eps_offset`; slices made only of phantoms are
/// discarded. Returns the slice offset and its genuine events in resolution order.
pub fn select_slice(
    lists: &[Vec<CollisionEvent>],
    floor: f64,
    eps_offset: f64,
) -> Option<(f64, Vec<CollisionEvent>)> {
    let mut pending: Vec<CollisionEvent> = lists
        .iter()
        .flatten()
        .copied()
        .filter(|e| e.offset >= floor - eps_offset)
        .collect();
    pending.sort_by(CollisionEvent::ordering);

    let mut start = 0;
    while start < pending.len() {
        let min = pending[start].offset;
        let end = pending[start..]
            .iter()
            .position(|e| e.offset > min + eps_offset)
            .map_or(pending.len(), |k| start + k);
        let mut slice: Vec<CollisionEvent> = pending[start..end]
            .iter()
            .copied()
            .filter(|e| !e.kind.is_phantom())
            .collect();
        if !slice.is_empty() {
            slice.sort_by(CollisionEvent::slice_ordering);
            return Some((min, slice));
        }
        start = end;
    }
    None
}
