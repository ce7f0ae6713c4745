use crate::Real;
use crate::math::Vec2;

/// An axis-aligned bounding box, `lower <= upper` componentwise.
///
/// Field order here is `{lower, upper}`, per this crate's documented
/// interface; the system this is ported from orders its fields the
/// other way around, which has no semantic effect.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// The minimum corner.
    pub lower: Vec2,
    /// The maximum corner.
    pub upper: Vec2,
}

impl Aabb {
    /// A box with NaN bounds, used as a placeholder before the first
    /// real bounds computation.
    pub fn degenerate() -> Self {
        Aabb {
            lower: Vec2::splat(Real::NAN),
            upper: Vec2::splat(Real::NAN),
        }
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(self, other: Aabb) -> Aabb {
        Aabb {
            lower: Vec2::new(self.lower.x.min(other.lower.x), self.lower.y.min(other.lower.y)),
            upper: Vec2::new(self.upper.x.max(other.upper.x), self.upper.y.max(other.upper.y)),
        }
    }

    /// `self` expanded uniformly by `margin` on every side.
    pub fn expand(self, margin: Real) -> Aabb {
        Aabb {
            lower: self.lower - Vec2::splat(margin),
            upper: self.upper + Vec2::splat(margin),
        }
    }

    /// Box area.
    pub fn area(self) -> Real {
        (self.upper.x - self.lower.x) * (self.upper.y - self.lower.y)
    }

    /// Whether `self` fully contains `other`.
    pub fn contains(self, other: Aabb) -> bool {
        self.upper.x >= other.upper.x
            && self.upper.y >= other.upper.y
            && self.lower.x <= other.lower.x
            && self.lower.y <= other.lower.y
    }

    /// Whether `self` and `other` overlap (open-interval test: boxes
    /// that merely touch at an edge don't count as intersecting).
    pub fn intersects(self, other: Aabb) -> bool {
        self.upper.x > other.lower.x
            && self.lower.x < other.upper.x
            && self.upper.y > other.lower.y
            && self.lower.y < other.upper.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both() {
        let a = Aabb { lower: Vec2::new(0.0, 0.0), upper: Vec2::new(1.0, 1.0) };
        let b = Aabb { lower: Vec2::new(2.0, -1.0), upper: Vec2::new(3.0, 0.5) };
        let u = a.union(b);
        assert!(u.contains(a));
        assert!(u.contains(b));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Aabb { lower: Vec2::new(0.0, 0.0), upper: Vec2::new(1.0, 1.0) };
        let b = Aabb { lower: Vec2::new(1.0, 0.0), upper: Vec2::new(2.0, 1.0) };
        assert!(!a.intersects(b));
    }
}
