use std::fmt::Debug;

use crate::Real;
use crate::math::{Mat2, Vec2};

/// A convex shape attached to a [`super::RigidBody`], expressed in the
/// body's local space.
///
/// Implementors need only provide a support function (the vertex/point
/// furthest along a given direction) and their local-space bounds; GJK,
/// EPA, and the broad phase are built entirely on top of these.
pub trait Collider: Debug {
    /// Returns the point of this shape (in local space) furthest along
    /// `direction` (also in local space).
    fn support(&self, direction: Vec2) -> Vec2;

    /// The shape's axis-aligned bounds in world space, given the
    /// body's position and rotation matrix.
    fn world_bounds(&self, pos: Vec2, rot: Mat2) -> (Vec2, Vec2);
}

/// A circle collider, defined by a local-space radius (circles are
/// rotation-invariant, so no local offset is tracked beyond the body's
/// own position).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CircleCollider {
    /// The circle's radius.
    pub radius: Real,
}

impl CircleCollider {
    /// Creates a new circle collider with the given radius.
    pub fn new(radius: Real) -> Self {
        CircleCollider { radius }
    }
}

impl Collider for CircleCollider {
    fn support(&self, direction: Vec2) -> Vec2 {
        direction * (self.radius / direction.length())
    }

    fn world_bounds(&self, pos: Vec2, _rot: Mat2) -> (Vec2, Vec2) {
        let size = Vec2::splat(self.radius);
        (pos - size, pos + size)
    }
}

/// A convex polygon collider. Vertices are given in local space with
/// clockwise winding (screen-space y-down convention); see
/// [`super::check_winding`].
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonCollider {
    points: Vec<Vec2>,
}

impl PolygonCollider {
    /// Creates a polygon collider from a pre-validated point list. Use
    /// [`super::validate_polygon`] first to check the vertex count.
    pub fn new(points: Vec<Vec2>) -> Self {
        PolygonCollider { points }
    }

    /// The collider's local-space vertices.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

impl Collider for PolygonCollider {
    fn support(&self, direction: Vec2) -> Vec2 {
        let mut point = self.points[0];
        let mut max_dot = point.dot(direction);
        for &candidate in &self.points[1..] {
            let dot = candidate.dot(direction);
            if dot > max_dot {
                point = candidate;
                max_dot = dot;
            }
        }
        point
    }

    fn world_bounds(&self, pos: Vec2, rot: Mat2) -> (Vec2, Vec2) {
        let first = rot.apply(self.points[0]);
        let mut min = first;
        let mut max = first;
        for &p in &self.points[1..] {
            let p = rot.apply(p);
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min + pos, max + pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_support_points_at_radius_in_direction() {
        let c = CircleCollider::new(2.0);
        let s = c.support(Vec2::new(1.0, 0.0));
        assert!((s.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn polygon_support_is_extreme_vertex() {
        let square = PolygonCollider::new(vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ]);
        let s = square.support(Vec2::new(1.0, 1.0));
        assert_eq!(s, Vec2::new(1.0, 1.0));
    }
}
