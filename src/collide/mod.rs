//! Narrow-phase collision detection: GJK for intersection testing, EPA
//! for penetration depth and contact point extraction, both running
//! directly on the Minkowski difference (CSO) of a pair of colliders.

use tracing::debug;

use crate::Real;
use crate::math::Vec2;
use crate::object::{Collider, RigidBody, check_winding_triple};

/// GJK's hardcoded initial search direction. The system this is ported
/// from always starts here rather than deriving a direction from the
/// two bodies' positions.
pub const INITIAL_DIRECTION: Vec2 = Vec2 { x: 0.7, y: 0.4 };

/// Squared-distance convergence threshold for EPA.
const EPA_EPSILON: Real = 0.03 * 0.03;
const EPA_ITERATIONS: usize = 20;
const GJK_ITERATIONS: usize = 20;

/// A single contact point produced by the narrow phase: penetration
/// depth, world-space separating normal (pointing from A to B), and the
/// contact location in each body's local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    /// Penetration depth along `normal`.
    pub penetration: Real,
    /// Separating normal, pointing from collider A to collider B.
    pub normal: Vec2,
    /// Contact point in collider A's local space.
    pub local_a: Vec2,
    /// Contact point in collider B's local space.
    pub local_b: Vec2,
}

#[derive(Copy, Clone, Debug)]
struct CsoPoint {
    /// Point on the Minkowski difference `support_a(dir) - support_b(-dir)`.
    res: Vec2,
    /// The direction that produced `res`, kept so the contact-extraction
    /// step can recompute each collider's own local support point along
    /// the same direction.
    src: Vec2,
}

fn cso_support(a: &RigidBody, ca: &dyn Collider, b: &RigidBody, cb: &dyn Collider, dir: Vec2) -> CsoPoint {
    CsoPoint {
        res: a.global_support(ca, dir) - b.global_support(cb, -dir),
        src: dir,
    }
}

/// Perpendicular-distance-to-origin of the line through `a` and `b`
/// (this is the signed distance when `a`/`b` are expressed relative to
/// no shared origin, matching the formula used for EPA edge distances).
fn origin_line_distance(a: Vec2, b: Vec2) -> Real {
    let d = a - b;
    let l2 = d.length2();
    if l2 == 0.0 {
        return a.length();
    }
    (b.x * a.y - b.y * a.x) / l2.sqrt()
}

fn outward_normal(from: Vec2, to: Vec2) -> Vec2 {
    Vec2::new(from.y - to.y, to.x - from.x)
}

/// Runs GJK intersection testing followed by EPA penetration-depth
/// extraction for a single pair of colliders. Returns `None` when the
/// shapes don't overlap, or when either phase fails to converge within
/// its iteration cap (logged at `debug` and treated as "no collision",
/// never surfaced as an error — see `crate::error`).
pub fn evaluate_collision(
    a: &RigidBody,
    collider_a: &dyn Collider,
    b: &RigidBody,
    collider_b: &dyn Collider,
    initial_dir: Vec2,
) -> Option<Collision> {
    let s0 = cso_support(a, collider_a, b, collider_b, initial_dir);
    let mut simplex = [s0, s0, s0];

    if simplex[0].res.dot(initial_dir) <= 0.0 {
        return None;
    }

    let mut direction = -simplex[0].res;
    let mut length = 1usize;
    let mut converged = false;

    for _ in 0..GJK_ITERATIONS {
        simplex[length] = cso_support(a, collider_a, b, collider_b, direction);
        if simplex[length].res.dot(direction) <= 0.0 {
            return None;
        }

        if length == 1 {
            let d = simplex[0].res - simplex[1].res;
            direction = d * d.dot(simplex[0].res) - simplex[0].res * d.length2();
            if direction == Vec2::ZERO {
                let normal = outward_normal(simplex[0].res, simplex[1].res);
                simplex[2] = cso_support(a, collider_a, b, collider_b, normal);
                if simplex[2].res == simplex[0].res || simplex[2].res == simplex[1].res {
                    simplex[2] = cso_support(a, collider_a, b, collider_b, -normal);
                }
                if !check_winding_triple(simplex[0].res, simplex[1].res, simplex[2].res) {
                    simplex.swap(0, 1);
                }
                converged = true;
                break;
            }
            length = 2;
        } else {
            if !check_winding_triple(simplex[0].res, simplex[1].res, simplex[2].res) {
                simplex.swap(0, 1);
            }

            let s0 = simplex[0];
            let s1 = simplex[1];
            let s2 = simplex[2];

            if s1.res.dot(Vec2::new(s2.res.y - s1.res.y, s1.res.x - s2.res.x)) > 0.0 {
                if (s2.res - s1.res).dot(s2.res) > 0.0 {
                    simplex[0] = s2;
                    direction = outward_normal(s1.res, s2.res);
                } else if (s2.res - s0.res).dot(s0.res) > 0.0 {
                    simplex[1] = s2;
                    direction = outward_normal(s2.res, s0.res);
                } else {
                    simplex[0] = s2;
                    direction = -s2.res;
                    length = 1;
                }
            } else if s0.res.dot(Vec2::new(s0.res.y - s2.res.y, s2.res.x - s0.res.x)) > 0.0 {
                if (s0.res - s2.res).dot(s0.res) > 0.0 {
                    simplex[1] = s2;
                    direction = outward_normal(s2.res, s0.res);
                } else {
                    simplex[0] = s2;
                    direction = -s2.res;
                    length = 1;
                }
            } else {
                converged = true;
                break;
            }
        }
    }

    if !converged {
        debug!("GJK exhausted iteration cap without converging");
        return None;
    }

    epa(a, collider_a, b, collider_b, simplex)
}

struct EpaNode {
    dist: Real,
    val: CsoPoint,
    next: usize,
}

fn epa(
    a: &RigidBody,
    collider_a: &dyn Collider,
    b: &RigidBody,
    collider_b: &dyn Collider,
    simplex: [CsoPoint; 3],
) -> Option<Collision> {
    let mut nodes: Vec<EpaNode> = Vec::with_capacity(EPA_ITERATIONS + 2);
    nodes.push(EpaNode { dist: origin_line_distance(simplex[0].res, simplex[1].res), val: simplex[0], next: 1 });
    nodes.push(EpaNode { dist: origin_line_distance(simplex[1].res, simplex[2].res), val: simplex[1], next: 2 });
    nodes.push(EpaNode { dist: origin_line_distance(simplex[2].res, simplex[0].res), val: simplex[2], next: 0 });

    let (best_idx, next_idx, dist) = loop {
        let mut best = 0usize;
        for j in 1..nodes.len() {
            if nodes[j].dist < nodes[best].dist {
                best = j;
            }
        }
        let next = nodes[best].next;

        let normal = outward_normal(nodes[best].val.res, nodes[next].val.res);
        let result = cso_support(a, collider_a, b, collider_b, normal);

        if (result.res - nodes[next].val.res).length2() < EPA_EPSILON
            || (result.res - nodes[best].val.res).length2() < EPA_EPSILON
        {
            break (best, next, nodes[best].dist);
        }

        if nodes.len() == EPA_ITERATIONS + 2 {
            debug!("EPA exhausted iteration cap without converging");
            return None;
        }

        let new_idx = nodes.len();
        let best_to_new_dist = origin_line_distance(nodes[best].val.res, result.res);
        let new_to_next_dist = origin_line_distance(result.res, nodes[next].val.res);
        nodes.push(EpaNode { dist: new_to_next_dist, val: result, next });
        nodes[best].next = new_idx;
        nodes[best].dist = best_to_new_dist;
    };

    let p_a = nodes[best_idx].val;
    let p_b = nodes[next_idx].val;

    let delta = p_b.res - p_a.res;
    // Not clamped to [0, 1]: the system this is ported from computes
    // this proportion unclamped, and nothing downstream depends on the
    // clamp despite this crate's own documentation elsewhere describing
    // it loosely as clamped.
    let proportion = -delta.dot(p_a.res) / delta.length2();

    let normal = Vec2::new(p_a.res.y - p_b.res.y, p_b.res.x - p_a.res.x).normalised();

    let local_a = collider_a.support(a.global_to_local_vec(p_a.src)) * (1.0 - proportion)
        + collider_a.support(a.global_to_local_vec(p_b.src)) * proportion;
    let local_b = collider_b.support(b.global_to_local_vec(-p_a.src)) * (1.0 - proportion)
        + collider_b.support(b.global_to_local_vec(-p_b.src)) * proportion;

    Some(Collision {
        penetration: dist,
        normal,
        local_a,
        local_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::{AabbTree, velocity_fatten};
    use crate::object::{CircleCollider, PolygonCollider, RigidBody, RigidBodyMaterial};

    fn body_with(radius: Real, pos: Vec2) -> (RigidBody, CircleCollider) {
        let mut tree = AabbTree::new(0.0);
        let node = tree.insert(crate::aabb::Aabb { lower: pos, upper: pos });
        let mut body = RigidBody::new(1.0, 1.0, RigidBodyMaterial::ROCK, node);
        body.pos = pos;
        (body, CircleCollider::new(radius))
    }

    #[test]
    fn overlapping_circles_collide() {
        let (a, ca) = body_with(1.0, Vec2::new(0.0, 0.0));
        let (b, cb) = body_with(1.0, Vec2::new(1.0, 0.0));
        let col = evaluate_collision(&a, &ca, &b, &cb, INITIAL_DIRECTION);
        let col = col.expect("circles 1 unit apart with radius 1 each should overlap");
        assert!(col.penetration > 0.9 && col.penetration < 1.1);
        assert!(col.normal.x > 0.0);
    }

    #[test]
    fn distant_circles_do_not_collide() {
        let (a, ca) = body_with(1.0, Vec2::new(0.0, 0.0));
        let (b, cb) = body_with(1.0, Vec2::new(10.0, 0.0));
        assert!(evaluate_collision(&a, &ca, &b, &cb, INITIAL_DIRECTION).is_none());
    }

    #[test]
    fn box_on_box_penetration_matches_overlap() {
        let mut tree = AabbTree::new(0.0);
        let node_a = tree.insert(crate::aabb::Aabb { lower: Vec2::ZERO, upper: Vec2::ZERO });
        let node_b = tree.insert(crate::aabb::Aabb { lower: Vec2::ZERO, upper: Vec2::ZERO });
        let mut a = RigidBody::new(-1.0, -1.0, RigidBodyMaterial::ROCK, node_a);
        a.pos = Vec2::new(0.0, 0.0);
        let mut b = RigidBody::new(1.0, 1.0, RigidBodyMaterial::ROCK, node_b);
        b.pos = Vec2::new(0.0, 1.5);

        let square = PolygonCollider::new(vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ]);

        let col = evaluate_collision(&a, &square, &b, &square, INITIAL_DIRECTION)
            .expect("boxes overlapping by 0.5 units should collide");
        assert!((col.penetration - 0.5).abs() < 1e-3);
        let _ = velocity_fatten;
    }
}
