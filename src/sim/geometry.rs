//! Battlefield geometry
//!
//! Pure functions over field coordinates (origin at the south-west corner,
//! angles in radians counterclockwise from east). Cases where an angle or
//! distance is undefined come back as `None` so the caller picks the policy.

use glam::Vec2;

use crate::{normalize_angle, normalize_heading};

/// Euclidean distance between two points
#[inline]
pub fn distance(p1: Vec2, p2: Vec2) -> f32 {
    p1.distance(p2)
}

/// Heading of the vector from `p1` to `p2`, in [0, 2π)
///
/// Straight up is π/2 and straight down 3π/2. Coincident points have no
/// direction and resolve to 0.
pub fn heading_to(p1: Vec2, p2: Vec2) -> f32 {
    let d = p2 - p1;
    if d.x == 0.0 && d.y == 0.0 {
        return 0.0;
    }
    normalize_heading(d.y.atan2(d.x))
}

/// Whether `target` lies within `cone_width / 2` either side of `heading`
/// as seen from `origin`
///
/// Returns `None` when `origin == target`, where no bearing exists.
pub fn is_within_cone(origin: Vec2, heading: f32, cone_width: f32, target: Vec2) -> Option<bool> {
    if origin == target {
        return None;
    }
    let bearing = heading_to(origin, target);
    let offset = normalize_angle(bearing - heading);
    Some(offset.abs() <= cone_width / 2.0)
}

/// Intensity at `target` of a source at `origin` whose intensity at unit
/// range is `intensity`, falling off with the square of the distance
///
/// Returns `None` when `origin == target`.
pub fn inverse_square_intensity(origin: Vec2, target: Vec2, intensity: f32) -> Option<f32> {
    let r_squared = origin.distance_squared(target);
    if r_squared == 0.0 {
        return None;
    }
    Some(intensity / r_squared)
}
