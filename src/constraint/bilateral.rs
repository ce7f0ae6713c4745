//! Bilateral (non-contact) constraints: pivot, fixed, slider, and a
//! user-supplied custom constraint.

use crate::Real;
use crate::math::{Vec2, Vec3, Vec6};
use crate::object::{BodyId, RigidBody};

use super::solver;

/// A two-body constraint applied once per solver iteration, in addition
/// to contact manifolds.
pub trait BilateralConstraint: std::fmt::Debug {
    /// The first body.
    fn body_a(&self) -> BodyId;
    /// The second body.
    fn body_b(&self) -> BodyId;
    /// Whether the two bodies may still also collide with each other.
    /// `false` (the common case, e.g. a pivot holding two link
    /// segments together) excludes the pair from the broad phase.
    fn allow_collision(&self) -> bool {
        false
    }
    /// Solves and applies this constraint's velocity correction.
    fn apply(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, baumgarte_bias: Real);
}

fn velocity_vector(a: &RigidBody, b: &RigidBody) -> Vec6 {
    Vec6::from_pair(a.vel, a.rot_v, b.vel, b.rot_v)
}

fn set_velocity(a: &mut RigidBody, b: &mut RigidBody, v: Vec6) {
    let (va, wa, vb, wb) = v.into_pair();
    a.vel = va;
    a.rot_v = wa;
    b.vel = vb;
    b.rot_v = wb;
}

fn mass_matrix(a: &RigidBody, b: &RigidBody) -> Vec6 {
    solver::inverse_mass_matrix(a.inv_mass(), a.inv_moment(), b.inv_mass(), b.inv_moment())
}

/// Holds two anchor points, one on each body, coincident: a hinge with
/// no angular constraint.
#[derive(Copy, Clone, Debug)]
pub struct PivotConstraint {
    a: BodyId,
    b: BodyId,
    local_a: Vec2,
    local_b: Vec2,
}

impl PivotConstraint {
    /// Creates a pivot joining `local_a` on body `a` to `local_b` on
    /// body `b`.
    pub fn new(a: BodyId, b: BodyId, local_a: Vec2, local_b: Vec2) -> Self {
        PivotConstraint { a, b, local_a, local_b }
    }
}

impl BilateralConstraint for PivotConstraint {
    fn body_a(&self) -> BodyId {
        self.a
    }
    fn body_b(&self) -> BodyId {
        self.b
    }

    fn apply(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, baumgarte_bias: Real) {
        let r_a = body_a.local_to_global_vec(self.local_a);
        let r_b = body_b.local_to_global_vec(self.local_b);

        let m = mass_matrix(body_a, body_b);
        let mut v = velocity_vector(body_a, body_b);

        let j = [
            Vec6::from_pair(Vec2::new(-1.0, 0.0), r_a.y, Vec2::new(1.0, 0.0), -r_b.y),
            Vec6::from_pair(Vec2::new(0.0, -1.0), -r_a.x, Vec2::new(0.0, 1.0), r_b.x),
        ];

        let bias = baumgarte_bias * (body_b.pos + r_b - body_a.pos - r_a);

        v = v + solver::apply_2(j, m, solver::resolve_2(j, m, v, bias));
        set_velocity(body_a, body_b, v);
    }
}

/// Like [`PivotConstraint`], but also locks relative rotation.
#[derive(Copy, Clone, Debug)]
pub struct FixedConstraint {
    a: BodyId,
    b: BodyId,
    local_a: Vec2,
    local_b: Vec2,
}

impl FixedConstraint {
    /// Creates a fixed joint between `local_a` on body `a` and
    /// `local_b` on body `b`.
    pub fn new(a: BodyId, b: BodyId, local_a: Vec2, local_b: Vec2) -> Self {
        FixedConstraint { a, b, local_a, local_b }
    }
}

impl BilateralConstraint for FixedConstraint {
    fn body_a(&self) -> BodyId {
        self.a
    }
    fn body_b(&self) -> BodyId {
        self.b
    }

    fn apply(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, baumgarte_bias: Real) {
        let r_a = body_a.local_to_global_vec(self.local_a);
        let r_b = body_b.local_to_global_vec(self.local_b);

        let m = mass_matrix(body_a, body_b);
        let mut v = velocity_vector(body_a, body_b);

        let j = [
            Vec6::from_pair(Vec2::new(-1.0, 0.0), r_a.y, Vec2::new(1.0, 0.0), -r_b.y),
            Vec6::from_pair(Vec2::new(0.0, -1.0), -r_a.x, Vec2::new(0.0, 1.0), r_b.x),
            Vec6::from_pair(Vec2::new(0.0, 0.0), -1.0, Vec2::new(0.0, 0.0), 1.0),
        ];

        let linear_bias = baumgarte_bias * (body_b.pos + r_b - body_a.pos - r_a);
        let rotation_bias = 2.0 * baumgarte_bias * (body_b.rot - body_a.rot);
        let bias = Vec3::new(linear_bias.x, linear_bias.y, rotation_bias);

        v = v + solver::apply_3(j, m, solver::resolve_3(j, m, v, bias));
        set_velocity(body_a, body_b, v);
    }
}

/// Constrains body B to slide along an axis (`local_n`, in body A's
/// local space) relative to body A, with no relative rotation.
#[derive(Copy, Clone, Debug)]
pub struct SliderConstraint {
    a: BodyId,
    b: BodyId,
    local_a: Vec2,
    local_b: Vec2,
    local_n: Vec2,
}

impl SliderConstraint {
    /// Creates a slider between `local_a`/`local_b` along axis
    /// `local_n` (expressed in body A's local space).
    pub fn new(a: BodyId, b: BodyId, local_a: Vec2, local_b: Vec2, local_n: Vec2) -> Self {
        SliderConstraint { a, b, local_a, local_b, local_n }
    }
}

impl BilateralConstraint for SliderConstraint {
    fn body_a(&self) -> BodyId {
        self.a
    }
    fn body_b(&self) -> BodyId {
        self.b
    }

    fn apply(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, baumgarte_bias: Real) {
        let r_a = body_a.local_to_global_vec(self.local_a);
        let r_b = body_b.local_to_global_vec(self.local_b);
        let normal = body_a.local_to_global_vec(self.local_n);

        let m = mass_matrix(body_a, body_b);
        let mut v = velocity_vector(body_a, body_b);

        let d = body_b.pos + r_b - body_a.pos - r_a;

        let j1 = Vec6::from_pair(-normal, -(r_a + d).cross(normal), normal, r_b.cross(normal));
        let j2 = Vec6::from_pair(Vec2::ZERO, -1.0, Vec2::ZERO, 1.0);

        // Uses a direct 2x2 solve rather than the generic n-row
        // effective-mass helper, matching the system this is ported
        // from (`SliderConstraint::apply` special-cases this rather
        // than going through `compute_inverse_effective_mass`).
        let j1m = j1 * m;
        let j2m = j2 * m;

        let mat = crate::math::Mat2 {
            a: j1.dot(j1m),
            b: j1.dot(j2m),
            c: j2.dot(j1m),
            d: j2.dot(j2m),
        };

        let bias = Vec2::new(
            -j1.dot(v) - baumgarte_bias * d.dot(normal),
            -j2.dot(v) - 2.0 * baumgarte_bias * (body_b.rot - body_a.rot),
        );
        let l = mat.solve_vec(bias);

        v = v + j1m * l.x + j2m * l.y;
        set_velocity(body_a, body_b, v);
    }
}

/// A constraint whose velocity correction is supplied entirely by the
/// caller, for cases the built-in constraint types don't cover.
pub struct CustomConstraint {
    a: BodyId,
    b: BodyId,
    allow_collision: bool,
    callback: Box<dyn Fn(&mut RigidBody, &mut RigidBody, Real) + Send + Sync>,
}

impl std::fmt::Debug for CustomConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomConstraint")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("allow_collision", &self.allow_collision)
            .finish()
    }
}

impl CustomConstraint {
    /// Creates a custom constraint invoking `callback(body_a, body_b,
    /// baumgarte_bias)` once per solver iteration.
    pub fn new(
        a: BodyId,
        b: BodyId,
        allow_collision: bool,
        callback: impl Fn(&mut RigidBody, &mut RigidBody, Real) + Send + Sync + 'static,
    ) -> Self {
        CustomConstraint { a, b, allow_collision, callback: Box::new(callback) }
    }
}

impl BilateralConstraint for CustomConstraint {
    fn body_a(&self) -> BodyId {
        self.a
    }
    fn body_b(&self) -> BodyId {
        self.b
    }
    fn allow_collision(&self) -> bool {
        self.allow_collision
    }
    fn apply(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, baumgarte_bias: Real) {
        (self.callback)(body_a, body_b, baumgarte_bias)
    }
}
