use super::*;
use nalgebra::{vector, Vector2};

fn ray(ox: f64, oy: f64, dx: f64, dy: f64) -> Ray2 {
    Ray2::new(vector![ox, oy], normalize(vector![dx, dy]).0)
}

#[test]
fn normalize_zero_vector_is_total() {
    let (u, len) = normalize(Vector2::zeros());
    assert_eq!(u, Vector2::zeros());
    assert_eq!(len, 0.0);
    let (u, len) = normalize(vector![3.0, 4.0]);
    assert!((len - 5.0).abs() < 1e-12);
    assert!((u - vector![0.6, 0.8]).norm() < 1e-12);
}

#[test]
fn bisect_opposites_falls_back_to_rotation() {
    let a = vector![1.0, 0.0];
    let b = bisect(a, -a);
    assert!((b - vector![0.0, 1.0]).norm() < 1e-12);
    let c = bisect(vector![1.0, 0.0], vector![0.0, 1.0]);
    let s = std::f64::consts::FRAC_1_SQRT_2;
    assert!((c - vector![s, s]).norm() < 1e-12);
}

#[test]
fn cross_and_perp_are_counter_clockwise() {
    assert!(cross(vector![1.0, 0.0], vector![0.0, 1.0]) > 0.0);
    assert_eq!(perp(vector![1.0, 0.0]), vector![0.0, 1.0]);
}

#[test]
fn converging_rays_report_distances() {
    let tol = Tolerance::default();
    let r1 = ray(0.0, 0.0, 1.0, 1.0);
    let r2 = ray(2.0, 0.0, -1.0, 1.0);
    let hit = intersect_rays(&r1, &r2, &tol);
    assert_eq!(hit.kind, RayRelation::Converging);
    let s2 = 2f64.sqrt();
    assert!((hit.t1 - s2).abs() < 1e-12 && (hit.t2 - s2).abs() < 1e-12);
    assert!((r1.at(hit.t1) - vector![1.0, 1.0]).norm() < 1e-12);
}

#[test]
fn swapped_order_gives_swapped_parameters() {
    let tol = Tolerance::default();
    let r1 = ray(0.0, 0.0, 1.0, 0.0);
    let r2 = ray(3.0, -1.0, 0.0, 1.0);
    let a = intersect_rays(&r1, &r2, &tol);
    let b = intersect_rays(&r2, &r1, &tol);
    assert_eq!(a.kind, RayRelation::Converging);
    assert!((a.t1 - 3.0).abs() < 1e-12 && (a.t2 - 1.0).abs() < 1e-12);
    assert!((a.t1 - b.t2).abs() < 1e-12 && (a.t2 - b.t1).abs() < 1e-12);
}

#[test]
fn crossing_behind_a_source_is_diverging() {
    let tol = Tolerance::default();
    let r1 = ray(0.0, 0.0, -1.0, -1.0);
    let r2 = ray(2.0, 0.0, -1.0, 1.0);
    assert_eq!(intersect_rays(&r1, &r2, &tol).kind, RayRelation::Diverging);
}

#[test]
fn parallel_and_collinear_relations() {
    let tol = Tolerance::default();
    let a = ray(0.0, 0.0, 1.0, 0.0);
    assert_eq!(
        intersect_rays(&a, &ray(0.0, 1.0, 1.0, 0.0), &tol).kind,
        RayRelation::Parallel
    );
    assert_eq!(
        intersect_rays(&a, &ray(0.0, 1.0, -1.0, 0.0), &tol).kind,
        RayRelation::Parallel
    );
    let head_on = intersect_rays(&a, &ray(4.0, 0.0, -1.0, 0.0), &tol);
    assert_eq!(head_on.kind, RayRelation::HeadOn);
    assert!((head_on.t1 - 4.0).abs() < 1e-12);
    assert_eq!(
        intersect_rays(&a, &ray(-4.0, 0.0, -1.0, 0.0), &tol).kind,
        RayRelation::Diverging
    );
    let from1 = intersect_rays(&a, &ray(2.0, 0.0, 1.0, 0.0), &tol);
    assert_eq!(from1.kind, RayRelation::CoLinearFrom1);
    assert!((from1.t1 - 2.0).abs() < 1e-12 && from1.t2 == 0.0);
    assert_eq!(
        intersect_rays(&a, &ray(-2.0, 0.0, 1.0, 0.0), &tol).kind,
        RayRelation::CoLinearFrom2
    );
    assert_eq!(
        intersect_rays(&a, &ray(0.0, 0.0, 0.0, 1.0), &tol).kind,
        RayRelation::IdenticalSource
    );
}

#[test]
fn tolerance_scales_with_extent() {
    let verts = vec![vector![0.0, 0.0], vector![300.0, 0.0], vector![300.0, 400.0]];
    let tol = Tolerance::for_vertices(&verts);
    assert!((tol.eps_merge - 5e-6).abs() < 1e-15);
    assert_eq!(tol.eps_parallel, Tolerance::default().eps_parallel);
    assert_eq!(Tolerance::for_vertices(&[]), Tolerance::default());
}

#[test]
fn winding_from_shoelace() {
    let ccw = vec![vector![0.0, 0.0], vector![1.0, 0.0], vector![0.0, 1.0]];
    assert!((signed_area(&ccw) - 0.5).abs() < 1e-12);
    assert_eq!(Winding::from_area(signed_area(&ccw)), Winding::CounterClockwise);
    let cw: Vec<_> = ccw.iter().rev().copied().collect();
    assert_eq!(Winding::from_area(signed_area(&cw)), Winding::Clockwise);
    assert_eq!(Winding::Clockwise.sign(), -1.0);
}
