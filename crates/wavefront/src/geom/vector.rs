use nalgebra::Vector2;

/// Below this length `a + b` counts as the zero vector in `bisect`.
const BISECT_EPS: f64 = 1e-12;

/// Unit vector and original length. The zero vector maps to `((0,0), 0)`.
#[inline]
pub fn normalize(v: Vector2<f64>) -> (Vector2<f64>, f64) {
    let len = v.norm();
    if len > 0.0 && len.is_finite() {
        (v / len, len)
    } else {
        (Vector2::zeros(), 0.0)
    }
}

/// z-component of the 3D cross product; positive when `b` is counter-clockwise of `a`.
#[inline]
pub fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// `a` rotated by +90°.
#[inline]
pub fn perp(a: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-a.y, a.x)
}

/// Unit direction of `a + b`.
///
/// When `a` and `b` cancel, falls back to `a` rotated by +90°: consistent but
/// arbitrary, callers fix the sign.
pub fn bisect(a: Vector2<f64>, b: Vector2<f64>) -> Vector2<f64> {
    let (u, len) = normalize(a + b);
    if len > BISECT_EPS {
        u
    } else {
        normalize(perp(a)).0
    }
}
