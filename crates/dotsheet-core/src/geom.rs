//! Small planar helpers shared by the detector stages.

use nalgebra::{Point2, Vector2};
use std::f32::consts::PI;

/// Four corners, top-left, top-right, bottom-right, bottom-left.
pub type Quad = [Point2<f32>; 4];

/// z-component of the 2-D cross product.
#[inline]
pub fn cross(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Direction angle of a vector, `atan2(y, x)`.
#[inline]
pub fn heading(v: Vector2<f32>) -> f32 {
    v.y.atan2(v.x)
}

/// Wrap an angle into `[-π, π)`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let two_pi = 2.0 * PI;
    let mut d = a.rem_euclid(two_pi);
    if d >= PI {
        d -= two_pi;
    }
    d
}

/// Absolute difference between two angles (radians), normalized into `[0, π]`.
#[inline]
pub fn angle_diff_abs(a: f32, b: f32) -> f32 {
    wrap_angle(b - a).abs()
}

/// Unsigned angle at `vertex` between the rays towards `a` and `b`, in `[0, π]`.
pub fn vertex_angle(vertex: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    angle_diff_abs(heading(a - vertex), heading(b - vertex))
}

/// Unit vector for an angle.
#[inline]
pub fn unit(theta: f32) -> Vector2<f32> {
    Vector2::new(theta.cos(), theta.sin())
}

/// Move every corner `amount` pixels towards each of its two neighbors.
///
/// For a rectangle this insets every edge by `amount`.
pub fn shrink_quad(amount: f32, quad: &Quad) -> Quad {
    let n = quad.len();
    std::array::from_fn(|i| {
        let p = quad[i];
        let next = quad[(i + 1) % n];
        let prev = quad[(i + n - 1) % n];
        p + along(amount, next - p) + along(amount, prev - p)
    })
}

fn along(amount: f32, v: Vector2<f32>) -> Vector2<f32> {
    let len = v.norm();
    if len <= f32::EPSILON {
        return Vector2::zeros();
    }
    v * (amount / len)
}

/// Point-in-convex-quad test by signed subtended angles.
///
/// Walks the edges in order and measures the signed angle each edge subtends
/// at `p`. The point is inside iff that angle never flips sign.
pub fn point_in_quad(p: Point2<f32>, quad: &Quad) -> bool {
    let mut positive = false;
    let mut negative = false;
    for k in 0..4 {
        let side_a = quad[k] - p;
        let side_b = quad[(k + 1) % 4] - p;
        let angle = wrap_angle(heading(side_b) - heading(side_a));
        if angle > 0.0 {
            positive = true;
        } else if angle < 0.0 {
            negative = true;
        }
        if positive && negative {
            return false;
        }
    }
    true
}

/// Arithmetic mean of a set of points.
pub fn centroid(points: &[Point2<f32>]) -> Option<Point2<f32>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f32>, p| acc + p.coords);
    Some(Point2::from(sum / points.len() as f32))
}
