//! Persistent contact manifolds: up to two [`ContactPoint`]s per body
//! pair, solved with warm-started sequential impulses.

use tracing::warn;

use crate::Real;
use crate::collide::Collision;
use crate::math::Vec2;
use crate::object::{BodyId, RigidBody};

use super::solver;

/// Points within this squared distance of each other are treated as the
/// same contact point across steps, so accumulated impulses persist
/// instead of restarting from zero every frame.
pub const PERSISTENCE_THRESHOLD: Real = 0.05;

/// A contact drifted more than this squared distance from its cached
/// global position since the last update and is dropped.
const POSITIONAL_DRIFT_THRESHOLD: Real = 0.1;

/// A contact whose tangential/cross drift from the contact plane
/// exceeds this is dropped.
const TANGENTIAL_DRIFT_THRESHOLD: Real = 0.05;

/// `f(x, 0) = 0`, `f(x, y) = f(y, x)`, `f(x, x) = x`: combines two
/// bodies' friction or restitution coefficients into one value for
/// their shared contact constraint.
pub fn combine_properties(a: Real, b: Real) -> Real {
    (a * b).sqrt()
}

/// A single persistent contact point within a manifold.
#[derive(Copy, Clone, Debug)]
pub struct ContactPoint {
    local_a: Vec2,
    local_b: Vec2,
    global_a: Vec2,
    global_b: Vec2,
    normal: Vec2,
    j: crate::math::Vec6,
    jt: crate::math::Vec6,
    bias: Real,
    penetration: Real,
    /// Accumulated normal impulse, warm-started across steps.
    pub n_impulse_sum: Real,
    /// Accumulated tangential (friction) impulse, reset every step.
    pub t_impulse_sum: Real,
}

impl ContactPoint {
    fn from_collision(col: Collision, global_a: Vec2, global_b: Vec2) -> Self {
        ContactPoint {
            local_a: col.local_a,
            local_b: col.local_b,
            global_a,
            global_b,
            normal: col.normal,
            j: crate::math::Vec6::ZERO,
            jt: crate::math::Vec6::ZERO,
            bias: 0.0,
            penetration: col.penetration,
            n_impulse_sum: 0.0,
            t_impulse_sum: 0.0,
        }
    }

    /// The manifold-space penetration depth as of the last
    /// [`ContactConstraint::update_points`] call.
    pub fn penetration(&self) -> Real {
        self.penetration
    }

    /// The contact normal, pointing from body A to body B.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }
}

/// A persistent contact manifold between two bodies: up to two contact
/// points, plus the combined friction/restitution for the pair.
#[derive(Debug)]
pub struct ContactConstraint {
    pub(crate) a: BodyId,
    pub(crate) b: BodyId,
    friction: Real,
    restitution: Real,
    points: Vec<ContactPoint>,
}

impl ContactConstraint {
    /// Creates an empty manifold for a body pair, with friction and
    /// restitution already combined via [`combine_properties`].
    pub fn new(a: BodyId, b: BodyId, friction: Real, restitution: Real) -> Self {
        ContactConstraint {
            a,
            b,
            friction,
            restitution,
            points: Vec::new(),
        }
    }

    /// The number of active contact points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Current contact points, for inspection/debugging.
    pub fn points(&self) -> &[ContactPoint] {
        &self.points
    }

    /// Merges a freshly-detected collision into the manifold: if it's
    /// within [`PERSISTENCE_THRESHOLD`] of an existing point (by either
    /// endpoint), that point is updated in place so its accumulated
    /// impulse survives; otherwise a new point is appended.
    pub fn add_point(&mut self, body_a: &RigidBody, body_b: &RigidBody, col: Collision) {
        let global_a = body_a.local_to_global(col.local_a);
        let global_b = body_b.local_to_global(col.local_b);

        for point in &mut self.points {
            if (point.global_a - global_a).length2() < PERSISTENCE_THRESHOLD
                || (point.global_b - global_b).length2() < PERSISTENCE_THRESHOLD
            {
                point.local_a = col.local_a;
                point.local_b = col.local_b;
                point.global_a = global_a;
                point.global_b = global_b;
                point.normal = col.normal;
                point.penetration = col.penetration;
                return;
            }
        }

        self.points.push(ContactPoint::from_collision(col, global_a, global_b));
    }

    /// Drops points that have drifted too far (by position or by
    /// cross-track distance from the contact plane), trims to the two
    /// most significant points if more than two remain, and
    /// recomputes each surviving point's Jacobians and bias term.
    pub fn update_points(
        &mut self,
        body_a: &RigidBody,
        body_b: &RigidBody,
        baumgarte_bias: Real,
        slop_p: Real,
        slop_r: Real,
        tick_gravity: Vec2,
    ) {
        self.points.retain_mut(|point| {
            let global_a = body_a.local_to_global(point.local_a);
            let global_b = body_b.local_to_global(point.local_b);

            point.penetration = (global_a - global_b).dot(point.normal);

            let keep = point.penetration >= 0.0
                && (global_a - point.global_a).length2() <= POSITIONAL_DRIFT_THRESHOLD
                && (global_b - point.global_b).length2() <= POSITIONAL_DRIFT_THRESHOLD
                && (global_a - global_b).cross(point.normal).abs() <= TANGENTIAL_DRIFT_THRESHOLD;

            if keep {
                point.global_a = global_a;
                point.global_b = global_b;
            }
            keep
        });

        if self.points.len() > 2 {
            let mut deepest = 0;
            for i in 1..self.points.len() {
                if self.points[i].penetration > self.points[deepest].penetration {
                    deepest = i;
                }
            }
            let anchor = self.points[deepest];

            let mut farthest = if deepest == 0 { 1 } else { 0 };
            let mut farthest_dist = (self.points[farthest].global_a - anchor.global_a).length2();
            for i in 0..self.points.len() {
                if i == deepest {
                    continue;
                }
                let d = (self.points[i].global_a - anchor.global_a).length2();
                if d > farthest_dist {
                    farthest = i;
                    farthest_dist = d;
                }
            }
            let kept = [anchor, self.points[farthest]];
            self.points.clear();
            self.points.extend_from_slice(&kept);
        }

        for point in &mut self.points {
            let offset_a = body_a.local_to_global_vec(point.local_a);
            let offset_b = body_b.local_to_global_vec(point.local_b);

            point.j = crate::math::Vec6::from_pair(
                -point.normal,
                point.normal.cross(offset_a),
                point.normal,
                -point.normal.cross(offset_b),
            );

            let tangent = Vec2::new(-point.normal.y, point.normal.x);
            point.jt = crate::math::Vec6::from_pair(
                -tangent,
                tangent.cross(offset_a),
                tangent,
                -tangent.cross(offset_b),
            );

            let mut vel_a = body_a.vel + Vec2::new(-offset_a.y, offset_a.x) * body_a.rot_v;
            if body_a.inv_mass() != 0.0 {
                vel_a -= tick_gravity;
            }
            let mut vel_b = body_b.vel + Vec2::new(-offset_b.y, offset_b.x) * body_b.rot_v;
            if body_b.inv_mass() != 0.0 {
                vel_b -= tick_gravity;
            }

            let closing_velocity = (vel_b - vel_a).dot(point.normal);

            point.bias = -baumgarte_bias * (point.penetration - slop_p).max(-slop_p * 0.5)
                + (closing_velocity + slop_r).min(0.0) * self.restitution;

            point.t_impulse_sum = 0.0;
        }
    }

    /// Applies the warm-started accumulated impulse of every point to
    /// the pair's current velocity state, without re-solving. Called
    /// once per step before the solver-iteration loop.
    pub fn warm_start(&self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let m = solver::inverse_mass_matrix(
            body_a.inv_mass(),
            body_a.inv_moment(),
            body_b.inv_mass(),
            body_b.inv_moment(),
        );
        let mut v = velocity_vector(body_a, body_b);
        for point in &self.points {
            v = v + solver::apply_1(point.j, m, point.n_impulse_sum);
        }
        set_velocity(body_a, body_b, v);
    }

    /// Runs one sequential-impulse solve pass over this manifold's
    /// normal and friction constraints.
    pub fn apply(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let m = solver::inverse_mass_matrix(
            body_a.inv_mass(),
            body_a.inv_moment(),
            body_b.inv_mass(),
            body_b.inv_moment(),
        );
        let mut v = velocity_vector(body_a, body_b);

        match self.points.len() {
            0 => return,
            1 => {
                let point = &mut self.points[0];
                let mut lambda = solver::resolve_1(point.j, m, v, point.bias);
                if point.n_impulse_sum + lambda < 0.0 {
                    lambda = -point.n_impulse_sum;
                    point.n_impulse_sum = 0.0;
                } else {
                    point.n_impulse_sum += lambda;
                }
                if lambda.is_nan() {
                    warn!("contact normal impulse went NaN, skipping step");
                    return;
                }
                v = v + solver::apply_1(point.j, m, lambda);
            }
            _ => {
                let j = [self.points[0].j, self.points[1].j];
                let bias = Vec2::new(self.points[0].bias, self.points[1].bias);
                let mut lambda = solver::resolve_2(j, m, v, bias);
                if lambda.x.is_nan() || lambda.y.is_nan() {
                    warn!("contact normal impulse went NaN, skipping step");
                    return;
                }

                let sep_a = lambda.x + self.points[0].n_impulse_sum < 0.0;
                let sep_b = lambda.y + self.points[1].n_impulse_sum < 0.0;

                if sep_a && !sep_b {
                    v = v + solver::apply_1(self.points[0].j, m, -self.points[0].n_impulse_sum);
                    self.points[0].n_impulse_sum = 0.0;

                    let mut lambda_b = solver::resolve_1(self.points[1].j, m, v, self.points[1].bias);
                    if self.points[1].n_impulse_sum + lambda_b < 0.0 {
                        lambda_b = -self.points[1].n_impulse_sum;
                        self.points[1].n_impulse_sum = 0.0;
                    } else {
                        self.points[1].n_impulse_sum += lambda_b;
                    }
                    v = v + solver::apply_1(self.points[1].j, m, lambda_b);
                } else if sep_b && !sep_a {
                    v = v + solver::apply_1(self.points[1].j, m, -self.points[1].n_impulse_sum);
                    self.points[1].n_impulse_sum = 0.0;

                    let mut lambda_a = solver::resolve_1(self.points[0].j, m, v, self.points[0].bias);
                    if self.points[0].n_impulse_sum + lambda_a < 0.0 {
                        lambda_a = -self.points[0].n_impulse_sum;
                        self.points[0].n_impulse_sum = 0.0;
                    } else {
                        self.points[0].n_impulse_sum += lambda_a;
                    }
                    v = v + solver::apply_1(self.points[0].j, m, lambda_a);
                } else {
                    if sep_a && sep_b {
                        lambda.x = -self.points[0].n_impulse_sum;
                        lambda.y = -self.points[1].n_impulse_sum;
                        self.points[0].n_impulse_sum = 0.0;
                        self.points[1].n_impulse_sum = 0.0;
                    } else {
                        self.points[0].n_impulse_sum += lambda.x;
                        self.points[1].n_impulse_sum += lambda.y;
                    }
                    v = v + solver::apply_2(j, m, lambda);
                }
            }
        }

        let friction = self.friction;
        let scale = if self.points.len() == 2 { 0.5 } else { 1.0 };
        for point in &mut self.points {
            let mut lambda = solver::resolve_1(point.jt, m, v, 0.0) * scale;

            let new_t_impulse_sum = (point.t_impulse_sum + lambda)
                .max(-point.n_impulse_sum * friction)
                .min(point.n_impulse_sum * friction);

            lambda = new_t_impulse_sum - point.t_impulse_sum;
            point.t_impulse_sum = new_t_impulse_sum;

            v = v + solver::apply_1(point.jt, m, lambda);
        }

        set_velocity(body_a, body_b, v);
    }
}

fn velocity_vector(a: &RigidBody, b: &RigidBody) -> crate::math::Vec6 {
    crate::math::Vec6::from_pair(a.vel, a.rot_v, b.vel, b.rot_v)
}

fn set_velocity(a: &mut RigidBody, b: &mut RigidBody, v: crate::math::Vec6) {
    let (va, wa, vb, wb) = v.into_pair();
    a.vel = va;
    a.rot_v = wa;
    b.vel = vb;
    b.rot_v = wb;
}
