use super::*;
use crate::geom::Tolerance;
use crate::graph::{build_graph, EdgeId, NodeId};
use nalgebra::{vector, Vector2};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_8};

fn pts(xy: &[(f64, f64)]) -> Vec<Vector2<f64>> {
    xy.iter().map(|&(x, y)| vector![x, y]).collect()
}

fn ctx_for(xy: &[(f64, f64)]) -> SolverContext {
    SolverContext::new(build_graph(&pts(xy)), Tolerance::default())
}

fn rect() -> SolverContext {
    ctx_for(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)])
}

const L_SHAPE: [(f64, f64); 6] = [
    (0.0, 0.0),
    (2.0, 0.0),
    (2.0, 1.0),
    (1.0, 1.0),
    (1.0, 2.0),
    (0.0, 2.0),
];

// reflex vertex 4 at (5, 3)
fn notch() -> SolverContext {
    ctx_for(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 4.0),
        (6.0, 4.0),
        (5.0, 3.0),
        (4.0, 4.0),
        (0.0, 4.0),
    ])
}

fn near(a: Vector2<f64>, b: Vector2<f64>) -> bool {
    (a - b).norm() < 1e-9
}

fn event(kind: CollisionKind, instigator: usize, target: usize, offset: f64) -> CollisionEvent {
    CollisionEvent {
        kind,
        instigator: EdgeId(instigator),
        target: EdgeId(target),
        offset,
        position: Vector2::zeros(),
        stalled: false,
    }
}

#[test]
fn primary_bisectors_are_seeded_per_vertex() {
    let ctx = rect();
    assert_eq!(ctx.graph().interior.len(), 4);
    assert_eq!(ctx.graph().edges.len(), 8);
    for i in 0..4 {
        let id = EdgeId(4 + i);
        assert_eq!(ctx.parents(id), Some((i, (i + 3) % 4)));
        assert_eq!(ctx.rank(id), EdgeRank::Primary);
        assert_eq!(ctx.rank(EdgeId(i)), EdgeRank::Exterior);
        assert_eq!(ctx.graph().edge(id).source, NodeId(i));
        assert_eq!(ctx.source_offset(id), 0.0);
        assert!(!ctx.is_accepted(id));
    }
    let s = FRAC_1_SQRT_2;
    assert!(near(ctx.graph().edge(EdgeId(4)).basis, vector![s, s]));
    assert!(near(ctx.graph().edge(EdgeId(6)).basis, vector![-s, -s]));
    assert!(!ctx.is_complete());
}

#[test]
fn bisector_sign_prefers_normals_over_approximation() {
    let ctx = rect();
    let s = FRAC_1_SQRT_2;
    let u = ctx.interior_bisector(0, 3, Some(vector![-1.0, -1.0]));
    assert!(near(u, vector![s, s]));
    // anti-parallel parents: only the approximate direction can decide
    let fwd = ctx.interior_bisector(0, 2, Some(vector![1.0, 0.2]));
    assert!(near(fwd, vector![1.0, 0.0]));
    let back = ctx.interior_bisector(0, 2, Some(vector![-1.0, 0.0]));
    assert!(near(back, vector![-1.0, 0.0]));
}

#[test]
fn reflex_corners_follow_the_winding() {
    let ctx = ctx_for(&L_SHAPE);
    let reflex: Vec<usize> = (6..12).filter(|&i| ctx.is_reflex(EdgeId(i))).collect();
    assert_eq!(reflex, vec![9]);
    let s = FRAC_1_SQRT_2;
    assert!(near(ctx.graph().edge(EdgeId(9)).basis, vector![-s, -s]));

    let mut reversed = L_SHAPE.to_vec();
    reversed.reverse();
    let ctx = ctx_for(&reversed);
    let reflex: Vec<usize> = (6..12).filter(|&i| ctx.is_reflex(EdgeId(i))).collect();
    assert_eq!(reflex, vec![8]);
}

#[test]
fn offset_rate_tracks_the_parent_wavefront() {
    let ctx = ctx_for(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    let k = ctx.offset_rate(EdgeId(4));
    assert!((k - FRAC_1_SQRT_2).abs() < 1e-12);
    assert!(near(ctx.position_at(EdgeId(4), 1.0), vector![1.0, 1.0]));
    assert!(near(ctx.position_at(EdgeId(6), 0.5), vector![1.5, 1.5]));
    assert_eq!(ctx.offset_rate(EdgeId(0)), 0.0);
}

#[test]
fn adjacent_bisectors_collide_as_a_pair() {
    let ctx = rect();
    let active = ctx.active_interior_edges();
    let ev = collide_edges(&ctx, EdgeId(4), EdgeId(7), &active).unwrap();
    assert_eq!(ev.kind, CollisionKind::InteriorPair);
    assert!((ev.offset - 1.0).abs() < 1e-9);
    assert!(near(ev.position, vector![1.0, 1.0]));
    assert!(!ev.stalled);

    let far = collide_edges(&ctx, EdgeId(4), EdgeId(5), &active).unwrap();
    assert_eq!(far.kind, CollisionKind::InteriorPair);
    assert!((far.offset - 2.0).abs() < 1e-9);

    // opposite corners run parallel
    assert!(collide_edges(&ctx, EdgeId(4), EdgeId(6), &active).is_none());
    // exterior edges never instigate
    assert!(collide_edges(&ctx, EdgeId(0), EdgeId(4), &active).is_none());
    assert!(collide_edges(&ctx, EdgeId(4), EdgeId(4), &active).is_none());
}

#[test]
fn convex_corner_ignores_exterior_edges() {
    let ctx = rect();
    let active = ctx.active_interior_edges();
    assert!(collide_edges(&ctx, EdgeId(4), EdgeId(2), &active).is_none());
}

#[test]
fn disagreeing_offsets_are_phantoms() {
    let ctx = notch();
    let active = ctx.active_interior_edges();
    let ev = collide_edges(&ctx, EdgeId(7), EdgeId(12), &active).unwrap();
    assert_eq!(ev.kind, CollisionKind::PhantomDivergentOffset);
    assert!((ev.offset - 4.0).abs() < 1e-9);
    assert!(ev.kind.is_phantom());
}

#[test]
fn reflex_bisector_strikes_the_far_edge() {
    let ctx = notch();
    let active = ctx.active_interior_edges();
    let h = 3.0 / (1.0 + 2f64.sqrt());
    let ev = collide_edges(&ctx, EdgeId(11), EdgeId(0), &active).unwrap();
    assert_eq!(ev.kind, CollisionKind::InteriorAgainstExterior);
    assert_eq!(ev.target, EdgeId(0));
    assert!((ev.offset - h).abs() < 1e-9);
    assert!(near(ev.position, vector![5.0, h]));
    // parents are never struck
    assert!(collide_edges(&ctx, EdgeId(11), EdgeId(3), &active).is_none());
    assert!(collide_edges(&ctx, EdgeId(11), EdgeId(4), &active).is_none());
}

#[test]
fn boundary_check_bounds_the_shrunk_edge() {
    let ctx = notch();
    let active = ctx.active_interior_edges();
    let h = 3.0 / (1.0 + 2f64.sqrt());
    assert!(is_within_wavefront_boundary(&ctx, 0, vector![5.0, h], h, &active));
    assert!(!is_within_wavefront_boundary(&ctx, 0, vector![9.5, h], h, &active));
    assert!(!is_within_wavefront_boundary(&ctx, 0, vector![-1.0, h], h, &active));
}

#[test]
fn candidate_lists_are_sorted_and_reflex_first() {
    let ctx = notch();
    let lists = candidate_lists(&ctx, &ctx.active_interior_edges());
    for list in &lists {
        assert!(list.windows(2).all(|w| w[0].offset <= w[1].offset));
    }
    let reflex = lists
        .iter()
        .find(|l| l[0].instigator == EdgeId(11))
        .unwrap();
    assert_eq!(reflex[0].kind, CollisionKind::InteriorAgainstExterior);
    assert!(lists
        .iter()
        .flatten()
        .any(|e| e.kind == CollisionKind::PhantomDivergentOffset));
}

#[test]
fn collision_events_are_pure_and_ordered() {
    let ctx = notch();
    let a = create_collision_events(&ctx);
    let b = create_collision_events(&ctx);
    assert_eq!(a, b);
    assert_eq!(a.len(), 7);
    assert_eq!(a[0].kind, CollisionKind::InteriorAgainstExterior);
    assert_eq!(a[0].instigator, EdgeId(11));
    assert!(a.windows(2).all(|w| w[0].ordering(&w[1]).is_le()));
}

#[test]
fn best_event_skips_phantoms_and_breaks_ties_by_kind() {
    let list = vec![
        event(CollisionKind::PhantomDivergentOffset, 5, 6, 0.5),
        event(CollisionKind::InteriorAgainstExterior, 5, 1, 1.0),
        event(CollisionKind::InteriorNonAdjacent, 5, 7, 1.0 + 1e-12),
        event(CollisionKind::InteriorPair, 5, 8, 3.0),
    ];
    let best = best_event(&list, 1e-8).unwrap();
    assert_eq!(best.kind, CollisionKind::InteriorNonAdjacent);

    let phantoms = vec![event(CollisionKind::PhantomDivergentOffset, 5, 6, 0.5)];
    assert!(best_event(&phantoms, 1e-8).unwrap().kind.is_phantom());
    assert!(best_event(&[], 1e-8).is_none());
}

#[test]
fn slice_selection_drops_phantom_only_slices() {
    let lists = vec![
        vec![
            event(CollisionKind::PhantomDivergentOffset, 4, 5, 0.5),
            event(CollisionKind::InteriorAgainstExterior, 4, 0, 1.0),
        ],
        vec![event(CollisionKind::InteriorPair, 6, 7, 1.0 + 1e-10)],
        vec![event(CollisionKind::InteriorPair, 8, 9, 2.0)],
    ];
    let (offset, slice) = select_slice(&lists, 0.0, 1e-8).unwrap();
    assert_eq!(offset, 1.0);
    let kinds: Vec<CollisionKind> = slice.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![CollisionKind::InteriorPair, CollisionKind::InteriorAgainstExterior]
    );

    let (offset, slice) = select_slice(&lists, 1.5, 1e-8).unwrap();
    assert_eq!(offset, 2.0);
    assert_eq!(slice.len(), 1);
    assert!(select_slice(&lists, 5.0, 1e-8).is_none());
}

#[test]
fn pair_resolution_creates_one_bisector() {
    let mut ctx = rect();
    let active = ctx.active_interior_edges();
    let ev = collide_edges(&ctx, EdgeId(4), EdgeId(7), &active).unwrap();
    let outcome = resolve_slice(&mut ctx, &[ev]);
    assert_eq!(outcome.resolved, 1);
    assert!(!outcome.split);
    assert_eq!(outcome.proposals.len(), 1);
    let p = outcome.proposals[0];
    assert_eq!((p.clockwise, p.widdershins), (0, 2));

    let created = materialize(&mut ctx, &outcome.proposals);
    assert_eq!(created, vec![EdgeId(8)]);
    assert!(near(ctx.graph().edge(EdgeId(8)).basis, vector![1.0, 0.0]));
    assert_eq!(ctx.rank(EdgeId(8)), EdgeRank::Secondary);
    assert!((ctx.source_offset(EdgeId(8)) - 1.0).abs() < 1e-9);
    assert_eq!(ctx.offset_rate(EdgeId(8)), 0.0);

    let node = NodeId(4);
    assert!(near(ctx.graph().node(node).position, vector![1.0, 1.0]));
    assert_eq!(ctx.graph().edge(EdgeId(4)).target, Some(node));
    assert_eq!(ctx.graph().edge(EdgeId(7)).target, Some(node));
    assert!(ctx.is_accepted(EdgeId(4)) && ctx.is_accepted(EdgeId(7)));

    assert_eq!(ctx.sweep_exterior(), vec![3]);
    assert!(ctx.is_accepted(EdgeId(3)));
    assert!(!ctx.is_complete());
}

#[test]
fn repeated_event_is_resolved_once() {
    let mut ctx = rect();
    let active = ctx.active_interior_edges();
    let ev = collide_edges(&ctx, EdgeId(4), EdgeId(7), &active).unwrap();
    let mirrored = collide_edges(&ctx, EdgeId(7), EdgeId(4), &active).unwrap();
    assert_eq!(nearest_hits(&ctx, &[ev, mirrored]).len(), 2);
    let outcome = resolve_slice(&mut ctx, &[ev, mirrored]);
    assert_eq!(outcome.resolved, 1);
    assert_eq!(outcome.proposals.len(), 1);
    assert_eq!(ctx.graph().nodes.len(), 5);
}

#[test]
fn stalled_ridge_keeps_only_its_nearest_hit() {
    let mut ctx = rect();
    let active = ctx.active_interior_edges();
    let ev = collide_edges(&ctx, EdgeId(4), EdgeId(7), &active).unwrap();
    let outcome = resolve_slice(&mut ctx, &[ev]);
    materialize(&mut ctx, &outcome.proposals);
    assert_eq!(ctx.offset_rate(EdgeId(8)), 0.0);

    let hit = |instigator, x| CollisionEvent {
        position: vector![x, 1.0],
        ..event(CollisionKind::InteriorPair, instigator, 8, 1.0)
    };
    let (far, close) = (hit(5, 3.0), hit(6, 2.0));
    assert_eq!(nearest_hits(&ctx, &[far, close]), vec![close]);
    assert_eq!(nearest_hits(&ctx, &[close, far]), vec![close]);
}

#[test]
fn strike_splits_the_region_into_two_loops() {
    let mut ctx = notch();
    let active = ctx.active_interior_edges();
    let ev = collide_edges(&ctx, EdgeId(11), EdgeId(0), &active).unwrap();
    let outcome = resolve_slice(&mut ctx, &[ev]);
    assert!(outcome.split);
    let parents: Vec<(usize, usize)> = outcome
        .proposals
        .iter()
        .map(|p| (p.clockwise, p.widdershins))
        .collect();
    assert_eq!(parents, vec![(4, 0), (0, 3)]);
    assert!(ctx.is_accepted(EdgeId(11)));
    assert!(!ctx.is_accepted(EdgeId(0)));

    let created = materialize(&mut ctx, &outcome.proposals);
    assert_eq!(created, vec![EdgeId(14), EdgeId(15)]);
    let (c, s) = (FRAC_PI_8.cos(), FRAC_PI_8.sin());
    assert!(near(ctx.graph().edge(EdgeId(14)).basis, vector![-c, s]));
    assert!(near(ctx.graph().edge(EdgeId(15)).basis, vector![c, s]));

    let next = ctx.active_interior_edges();
    let mut loops = split_into_loops(&ctx, &next, ev.offset).unwrap();
    for l in &mut loops {
        l.sort();
    }
    loops.sort();
    let ids = |v: &[usize]| v.iter().map(|&i| EdgeId(i)).collect::<Vec<_>>();
    assert_eq!(loops, vec![ids(&[7, 12, 13, 14]), ids(&[8, 9, 10, 15])]);
}

#[test]
fn proposals_on_collapsed_parents_are_dropped() {
    let mut ctx = rect();
    let propose = |clockwise, widdershins| ProposedBisector {
        source: NodeId(0),
        clockwise,
        widdershins,
        approx_direction: vector![1.0, 0.0],
    };
    ctx.accept(EdgeId(2));
    assert!(materialize(&mut ctx, &[propose(0, 2), propose(1, 1)]).is_empty());
    let created = materialize(&mut ctx, &[propose(1, 3), propose(1, 3)]);
    assert_eq!(created.len(), 1);
}

#[test]
fn nearby_nodes_are_merged() {
    let mut ctx = rect();
    assert!(ctx.find_node(vector![0.0, 0.0]).is_none());
    let a = ctx.find_or_insert_node(vector![1.0, 1.0]);
    assert_eq!(a, NodeId(4));
    assert_eq!(ctx.find_or_insert_node(vector![1.0 + 5e-9, 1.0]), a);
    let b = ctx.find_or_insert_node(vector![1.0 + 1e-6, 1.0]);
    assert_ne!(a, b);
    assert_eq!(ctx.find_node(vector![1.0 + 1e-6, 1.0 + 1e-9]), Some(b));
    assert!(ctx.find_node(vector![3.0, 3.0]).is_none());
}

#[test]
fn open_walk_is_unassignable() {
    // edge 5 needs a successor with widdershins parent 1, which only edge 6 has
    let ctx = rect();
    let err = split_into_loops(&ctx, &[EdgeId(4), EdgeId(5)], 0.0).unwrap_err();
    assert_eq!(
        err,
        SolverError::UnassignableEdge {
            edge: EdgeId(5),
            partition: vec![EdgeId(4), EdgeId(5)],
        }
    );
    assert!(split_into_loops(&ctx, &ctx.active_interior_edges(), 0.0).is_ok());
}

#[test]
fn partition_without_events_fails() {
    use super::schedule::Scheduler;
    // opposite corners of the rectangle run parallel and never meet
    let mut scheduler = Scheduler::new(rect(), 10);
    let part = Partition {
        edges: vec![EdgeId(4), EdgeId(6)],
        floor: 0.0,
    };
    let err = scheduler.step(part).unwrap_err();
    assert_eq!(
        err,
        SolverError::NoCollisionsGenerable {
            edges: vec![EdgeId(4), EdgeId(6)],
        }
    );
    assert!(err.to_string().contains("no collision"));
}

#[test]
fn step_cap_is_enforced() {
    let cfg = SolverCfg {
        max_steps: Some(1),
        ..SolverCfg::default()
    };
    let err = solve_with(&pts(&L_SHAPE), cfg).unwrap_err();
    assert_eq!(err, SolverError::IterationCapExceeded { steps: 1 });
    assert!(err.to_string().contains("1 steps"));
    assert_eq!(SolverCfg::default().step_cap(10), 384);
}

#[test]
fn solve_completes_the_rectangle() {
    let g = solve(&pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)])).unwrap();
    assert_eq!(g.nodes.len(), 6);
    assert_eq!(g.edges.len(), 10);
    assert!(g.interior.iter().all(|ie| g.edge(ie.id).target.is_some()));
}
