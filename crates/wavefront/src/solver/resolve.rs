//! Collision resolution: turn selected events into nodes, targets and proposals.
//!
//! A single event at a node proposes bisectors by its kind:
//! - pair: one bisector between the clockwise collider's clockwise parent and the
//!   widdershins collider's widdershins parent;
//! - non-adjacent: two bisectors, one per resulting span;
//! - against exterior: two bisectors on either side of the struck edge.
//!
//! Several events landing on one node form a junction. Its arrivals are sorted by
//! angle around the node and every gap whose facing parents differ emits one
//! bisector (clockwise parent of the earlier arrival, widdershins parent of the
//! later). A struck exterior edge passing through the node adds its two halves
//! as arrivals. Proposals are realized by [`materialize`], which re-derives the
//! direction from the parents.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;

use nalgebra::Vector2;
use tracing::trace;

use crate::geom::{bisect, normalize, perp};
use crate::graph::{EdgeId, NodeId};

use super::context::SolverContext;
use super::detect::{CollisionEvent, CollisionKind};

/// A bisector to be created at `source` between two exterior parents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProposedBisector {
    pub source: NodeId,
    pub clockwise: usize,
    pub widdershins: usize,
    /// Only disambiguates the sign when the parents are anti-parallel.
    pub approx_direction: Vector2<f64>,
}

/// What lies on one side of an arrival at a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Face {
    /// The wavefront of this exterior edge.
    Exterior(usize),
    /// Region already swept by this exterior edge (behind its wavefront).
    Swept(usize),
}

#[derive(Clone, Copy, Debug)]
struct Arrival {
    /// `None` for the two halves of a struck exterior edge.
    edge: Option<EdgeId>,
    /// Unit vector from the node back along the arrival.
    back: Vector2<f64>,
    clockwise: Face,
    widdershins: Face,
}

#[derive(Clone, Debug, Default)]
struct Junction {
    events: Vec<CollisionEvent>,
    arrivals: Vec<Arrival>,
}

impl Junction {
    fn add(&mut self, arrival: Arrival) {
        let dup = self.arrivals.iter().any(|a| match (a.edge, arrival.edge) {
            (Some(x), Some(y)) => x == y,
            (None, None) => a.clockwise == arrival.clockwise,
            _ => false,
        });
        if !dup {
            self.arrivals.push(arrival);
        }
    }

    /// Both halves of a struck exterior edge, unless the node is a corner of its wavefront.
    fn add_struck_edge(&mut self, exterior: usize, dir: Vector2<f64>) {
        self.add(Arrival {
            edge: None,
            back: dir,
            clockwise: Face::Exterior(exterior),
            widdershins: Face::Swept(exterior),
        });
        self.add(Arrival {
            edge: None,
            back: -dir,
            clockwise: Face::Swept(exterior),
            widdershins: Face::Exterior(exterior),
        });
    }
}

/// Result of resolving one slice.
#[derive(Clone, Debug, Default)]
pub struct SliceOutcome {
    pub proposals: Vec<ProposedBisector>,
    /// Some node emitted two or more proposals: the region split.
    pub split: bool,
    /// Events that changed the graph.
    pub resolved: usize,
}

/// Resolve the genuine events of a slice, given in resolution order.
///
/// Only the nearest hits on each stalled ridge take part (see [`nearest_hits`]).
/// An event is skipped if all its interior edges are already accepted, or if one
/// of them already ends at a different node.
pub fn resolve_slice(ctx: &mut SolverContext, events: &[CollisionEvent]) -> SliceOutcome {
    let mut junctions: BTreeMap<NodeId, Junction> = BTreeMap::new();
    let mut out = SliceOutcome::default();
    for ev in &nearest_hits(ctx, events) {
        let applied = if ev.stalled {
            resolve_stalled(ctx, ev)
        } else {
            attach_event(ctx, ev, &mut junctions)
        };
        if applied {
            trace!(
                kind = ?ev.kind,
                instigator = ev.instigator.0,
                target = ev.target.0,
                offset = ev.offset,
                "resolved"
            );
            out.resolved += 1;
        }
    }
    for (node, j) in &junctions {
        let proposals = match j.events.as_slice() {
            [single] => single_event_proposals(ctx, *node, single),
            _ => fan_proposals(ctx, *node, j),
        };
        out.split |= proposals.len() >= 2;
        out.proposals.extend(proposals);
    }
    out
}

/// Distance `e` travels from its source to take part in `ev`.
///
/// Head-on stalled ridges run all the way to the other's source.
fn reach(ctx: &SolverContext, ev: &CollisionEvent, e: EdgeId) -> f64 {
    let g = ctx.graph();
    let d = (ev.position - g.node(g.edge(e).source).position).norm();
    if ev.stalled {
        2.0 * d
    } else {
        d
    }
}

/// Drop events that are not the nearest hit for one of their stalled edges.
///
/// A stalled ridge sits at the same offset along its whole ray, so one slice can
/// hold several hits on it; it must end at the first.
pub fn nearest_hits(ctx: &SolverContext, events: &[CollisionEvent]) -> Vec<CollisionEvent> {
    let tol = ctx.tolerance();
    let stalled = |ev: &CollisionEvent| {
        interior_edges(ev)
            .into_iter()
            .filter(|&e| ctx.offset_rate(e).abs() <= tol.eps_parallel)
            .collect::<Vec<_>>()
    };
    let mut best: BTreeMap<EdgeId, f64> = BTreeMap::new();
    for ev in events {
        for e in stalled(ev) {
            let r = reach(ctx, ev, e);
            best.entry(e).and_modify(|b| *b = b.min(r)).or_insert(r);
        }
    }
    events
        .iter()
        .filter(|&ev| {
            stalled(ev)
                .into_iter()
                .all(|e| best.get(&e).map_or(true, |&b| reach(ctx, ev, e) <= b + tol.eps_length))
        })
        .copied()
        .collect()
}

/// Interior edges taking part in an event (the target only if interior).
fn interior_edges(ev: &CollisionEvent) -> Vec<EdgeId> {
    match ev.kind {
        CollisionKind::InteriorAgainstExterior => vec![ev.instigator],
        _ => vec![ev.instigator, ev.target],
    }
}

fn resolve_stalled(ctx: &mut SolverContext, ev: &CollisionEvent) -> bool {
    let (a, b) = (ev.instigator, ev.target);
    if ctx.is_accepted(a) || ctx.is_accepted(b) {
        return false;
    }
    let (sa, sb) = (ctx.graph().edge(a).source, ctx.graph().edge(b).source);
    ctx.resolve_edge(a, sb);
    ctx.resolve_edge(b, sa);
    true
}

fn attach_event(
    ctx: &mut SolverContext,
    ev: &CollisionEvent,
    junctions: &mut BTreeMap<NodeId, Junction>,
) -> bool {
    let edges = interior_edges(ev);
    let existing = ctx.find_node(ev.position);
    for &e in &edges {
        if ctx.is_accepted(e) && (existing.is_none() || ctx.graph().edge(e).target != existing) {
            return false;
        }
    }
    if edges.iter().all(|&e| ctx.is_accepted(e)) {
        // a reflex bisector that already ended here may still bring a struck edge
        if let (CollisionKind::InteriorAgainstExterior, Some(node)) = (ev.kind, existing) {
            if let Some(j) = junctions.get_mut(&node) {
                j.add_struck_edge(ev.target.0, ctx.graph().edges[ev.target.0].basis);
                j.events.push(*ev);
            }
        }
        return false;
    }
    let node = ctx.find_or_insert_node(ev.position);
    for &e in &edges {
        if !ctx.is_accepted(e) {
            ctx.resolve_edge(e, node);
        }
    }

    let j = junctions.entry(node).or_default();
    for &e in &edges {
        if let Some((cw, ws)) = ctx.parents(e) {
            j.add(Arrival {
                edge: Some(e),
                back: -ctx.graph().edge(e).basis,
                clockwise: Face::Exterior(cw),
                widdershins: Face::Exterior(ws),
            });
        }
    }
    if ev.kind == CollisionKind::InteriorAgainstExterior {
        j.add_struck_edge(ev.target.0, ctx.graph().edges[ev.target.0].basis);
    }
    j.events.push(*ev);
    true
}

fn single_event_proposals(
    ctx: &SolverContext,
    node: NodeId,
    ev: &CollisionEvent,
) -> Vec<ProposedBisector> {
    let propose = |clockwise, widdershins, approx_direction| ProposedBisector {
        source: node,
        clockwise,
        widdershins,
        approx_direction,
    };
    let g = ctx.graph();
    let (i, t) = (ev.instigator, ev.target);
    let Some((i_cw, i_ws)) = ctx.parents(i) else {
        return Vec::new();
    };
    match ev.kind {
        CollisionKind::InteriorPair => {
            let Some((t_cw, t_ws)) = ctx.parents(t) else {
                return Vec::new();
            };
            // clockwise collider first
            let ((c_cw, _), (_, w_ws)) = if t_ws == i_cw {
                ((t_cw, t_ws), (i_cw, i_ws))
            } else {
                ((i_cw, i_ws), (t_cw, t_ws))
            };
            if c_cw == w_ws {
                return Vec::new();
            }
            let approx = bisect(g.edge(i).basis, g.edge(t).basis);
            vec![propose(c_cw, w_ws, approx)]
        }
        CollisionKind::InteriorNonAdjacent => {
            let Some((t_cw, t_ws)) = ctx.parents(t) else {
                return Vec::new();
            };
            let (ui, ut) = (g.edge(i).basis, g.edge(t).basis);
            let (mut d, len) = normalize(-perp(ui - ut) * g.winding.sign());
            if len <= ctx.tolerance().eps_parallel {
                d = -perp(ui) * g.winding.sign();
            }
            vec![propose(i_cw, t_ws, d), propose(t_cw, i_ws, -d)]
        }
        CollisionKind::InteriorAgainstExterior => {
            let x = t.0;
            let d = g.edges[x].basis;
            vec![propose(i_cw, x, -d), propose(x, i_ws, d)]
        }
        CollisionKind::PhantomDivergentOffset => Vec::new(),
    }
}

/// Angle of `v` in the counter-clockwise frame of the polygon.
#[inline]
fn fan_angle(v: Vector2<f64>, sign: f64) -> f64 {
    (sign * v.y).atan2(v.x)
}

fn fan_proposals(ctx: &SolverContext, node: NodeId, j: &Junction) -> Vec<ProposedBisector> {
    let sign = ctx.graph().winding.sign();
    // a struck edge that also parents an arrival ends at this node: its corner is already present
    let cornered: BTreeSet<usize> = j
        .arrivals
        .iter()
        .filter_map(|a| a.edge.and_then(|e| ctx.parents(e)))
        .flat_map(|(cw, ws)| [cw, ws])
        .collect();
    let mut fan: Vec<(f64, Arrival)> = j
        .arrivals
        .iter()
        .filter(|a| match (a.edge, a.clockwise) {
            (None, Face::Exterior(x) | Face::Swept(x)) => !cornered.contains(&x),
            _ => true,
        })
        .map(|a| (fan_angle(a.back, sign), *a))
        .collect();
    if fan.len() < 2 {
        return Vec::new();
    }
    fan.sort_by(|(ax, x), (ay, y)| {
        ax.total_cmp(ay)
            .then(x.edge.map(|e| e.0).cmp(&y.edge.map(|e| e.0)))
    });

    let mut proposals = Vec::new();
    for k in 0..fan.len() {
        let (alpha, x) = fan[k];
        let (beta, y) = fan[(k + 1) % fan.len()];
        let (Face::Exterior(cw), Face::Exterior(ws)) = (x.clockwise, y.widdershins) else {
            continue;
        };
        if cw == ws {
            continue;
        }
        let mut span = beta - alpha;
        if k + 1 == fan.len() {
            span += TAU;
        }
        let mid = alpha + 0.5 * span;
        proposals.push(ProposedBisector {
            source: node,
            clockwise: cw,
            widdershins: ws,
            approx_direction: Vector2::new(mid.cos(), sign * mid.sin()),
        });
    }
    proposals
}

/// Create the proposed bisectors that are still meaningful; returns their ids.
///
/// A proposal is dropped if its parents coincide, if either parent has already
/// collapsed, or if an identical one (same source and parents) was realized.
pub fn materialize(ctx: &mut SolverContext, proposals: &[ProposedBisector]) -> Vec<EdgeId> {
    let mut seen: BTreeSet<(NodeId, usize, usize)> = BTreeSet::new();
    let mut created = Vec::new();
    for p in proposals {
        if p.clockwise == p.widdershins {
            continue;
        }
        if ctx.is_accepted(EdgeId(p.clockwise)) || ctx.is_accepted(EdgeId(p.widdershins)) {
            trace!(cw = p.clockwise, ws = p.widdershins, "stale proposal dropped");
            continue;
        }
        if !seen.insert((p.source, p.clockwise, p.widdershins)) {
            continue;
        }
        let dir = ctx.interior_bisector(p.clockwise, p.widdershins, Some(p.approx_direction));
        created.push(ctx.push_bisector(p.source, p.clockwise, p.widdershins, dir));
    }
    created
}
