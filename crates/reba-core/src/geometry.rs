//! Planar angle helpers.
//!
//! Everything here works on the image plane `(x, y)` and ignores depth.
//! Image `y` grows downward, so "up" is the `(0, -1)` direction.

use nalgebra::{Point2, Vector2};

/// Vectors shorter than this are treated as zero-length.
const MIN_NORM: f32 = 1e-6;

/// Image-plane up direction `(0, -1)`.
#[inline]
pub fn image_up() -> Vector2<f32> {
    Vector2::new(0.0, -1.0)
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns `None` when either vector is (numerically) zero-length.
pub fn angle_between_deg(u: &Vector2<f32>, v: &Vector2<f32>) -> Option<f32> {
    let nu = u.norm();
    let nv = v.norm();
    if nu < MIN_NORM || nv < MIN_NORM {
        return None;
    }
    let cos = (u.dot(v) / (nu * nv)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Angle at vertex `b` between the rays `b -> a` and `b -> c`, in degrees.
///
/// `None` if `a` or `c` coincides with `b`.
pub fn vertex_angle_deg(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> Option<f32> {
    angle_between_deg(&(a - b), &(c - b))
}

/// Angle between `v` and the image-up axis, in degrees.
pub fn angle_from_vertical_deg(v: &Vector2<f32>) -> Option<f32> {
    angle_between_deg(v, &image_up())
}

/// Orientation of the line `from -> to` via `atan2`, in degrees `(-180, 180]`.
///
/// Coincident points give `0.0`.
pub fn line_angle_deg(from: Point2<f32>, to: Point2<f32>) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Signed difference `b - a` between two orientations in degrees,
/// wrapped into `[-180, 180)`.
pub fn signed_angle_diff_deg(a: f32, b: f32) -> f32 {
    let diff = (b - a).rem_euclid(360.0);
    if diff >= 180.0 {
        diff - 360.0
    } else {
        diff
    }
}
