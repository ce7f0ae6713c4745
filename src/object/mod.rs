//! Rigid bodies and their colliders.

mod collider;

pub use self::collider::{CircleCollider, Collider, PolygonCollider};

use crate::Real;
use crate::aabb::{Aabb, NodeId};
use crate::error::PhysicsError;
use crate::math::{Mat2, Vec2, rotation_matrix};

/// Identifies a [`RigidBody`] within a [`crate::world::World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

/// Named restitution/friction presets, supplementing the bare
/// per-body fields with the sort of material table a host application
/// typically wants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidBodyMaterial {
    /// Coefficient of restitution (bounciness), in `[0, 1]`.
    pub restitution: Real,
    /// Coefficient of friction.
    pub friction: Real,
}

impl RigidBodyMaterial {
    /// Dense, barely-bouncy, high-friction.
    pub const ROCK: RigidBodyMaterial = RigidBodyMaterial { restitution: 0.1, friction: 0.8 };
    /// Moderate bounce and friction.
    pub const WOOD: RigidBodyMaterial = RigidBodyMaterial { restitution: 0.2, friction: 0.4 };
    /// Low bounce, low friction.
    pub const METAL: RigidBodyMaterial = RigidBodyMaterial { restitution: 0.15, friction: 0.2 };
    /// Highly elastic, low friction.
    pub const BOUNCY_BALL: RigidBodyMaterial = RigidBodyMaterial { restitution: 0.9, friction: 0.3 };
    /// Near-zero bounce, very high friction.
    pub const PILLOW: RigidBodyMaterial = RigidBodyMaterial { restitution: 0.05, friction: 0.95 };
}

/// Handler installed via [`RigidBody::set_collision_handler`]: given the
/// id of the other body, the world-space separating normal (pointing away
/// from this body) and each body's local contact point, returns whether it
/// claimed the collision. A claimed collision is not added to the world's
/// contact constraints.
pub type CollisionHandler = Box<dyn FnMut(BodyId, Vec2, Vec2, Vec2) -> bool + Send + Sync>;

/// A rigid body: position/orientation, velocity state, mass properties,
/// and a set of attached colliders.
///
/// A negative mass or moment of inertia marks the body as static/kinematic
/// (infinite mass): its inverse is stored as zero and it is never moved
/// by impulses.
pub struct RigidBody {
    pub(crate) node: NodeId,

    mass: Real,
    inv_mass: Real,
    moment: Real,
    inv_moment: Real,

    /// Coefficient of restitution (bounciness).
    pub restitution: Real,
    /// Coefficient of friction.
    pub friction: Real,

    /// World-space position.
    pub pos: Vec2,
    /// Linear velocity.
    pub vel: Vec2,
    /// Orientation, in radians.
    pub rot: Real,
    /// Angular velocity, in radians/second.
    pub rot_v: Real,
    rot_mat: Mat2,

    colliders: Vec<Box<dyn Collider>>,
    inner_bounds: Aabb,
    collision_handler: Option<CollisionHandler>,
}

impl std::fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigidBody")
            .field("node", &self.node)
            .field("mass", &self.mass)
            .field("moment", &self.moment)
            .field("restitution", &self.restitution)
            .field("friction", &self.friction)
            .field("pos", &self.pos)
            .field("vel", &self.vel)
            .field("rot", &self.rot)
            .field("rot_v", &self.rot_v)
            .field("colliders", &self.colliders.len())
            .field("has_collision_handler", &self.collision_handler.is_some())
            .finish()
    }
}

impl RigidBody {
    pub(crate) fn new(mass: Real, moment: Real, material: RigidBodyMaterial, node: NodeId) -> Self {
        let (inv_mass, mass) = invert_mass(mass);
        let (inv_moment, moment) = invert_mass(moment);
        RigidBody {
            node,
            mass,
            inv_mass,
            moment,
            inv_moment,
            restitution: material.restitution,
            friction: material.friction,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rot: 0.0,
            rot_v: 0.0,
            rot_mat: Mat2 { a: 1.0, b: 0.0, c: 0.0, d: 1.0 },
            colliders: Vec::new(),
            inner_bounds: Aabb { lower: Vec2::ZERO, upper: Vec2::ZERO },
            collision_handler: None,
        }
    }

    /// The leaf this body occupies in the world's broad-phase tree.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Mass. A value `<= 0` means static (infinite mass).
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// `1 / mass`, or `0` for a static body.
    pub fn inv_mass(&self) -> Real {
        self.inv_mass
    }

    /// Moment of inertia. A value `<= 0` means immovable rotationally.
    pub fn moment(&self) -> Real {
        self.moment
    }

    /// `1 / moment`, or `0` for a rotationally-static body.
    pub fn inv_moment(&self) -> Real {
        self.inv_moment
    }

    /// Whether the body is static in translation and rotation.
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0 && self.inv_moment == 0.0
    }

    /// Replaces the body's mass.
    pub fn set_mass(&mut self, mass: Real) {
        let (inv_mass, mass) = invert_mass(mass);
        self.inv_mass = inv_mass;
        self.mass = mass;
    }

    /// Replaces the body's moment of inertia.
    pub fn set_moment(&mut self, moment: Real) {
        let (inv_moment, moment) = invert_mass(moment);
        self.inv_moment = inv_moment;
        self.moment = moment;
    }

    /// Attaches a collider and recomputes the body's bounds.
    pub fn add_collider(&mut self, collider: Box<dyn Collider>) {
        self.colliders.push(collider);
        self.update_bounds();
    }

    /// Transforms a point from the body's local space to world space.
    pub fn local_to_global(&self, point: Vec2) -> Vec2 {
        self.rot_mat.apply(point) + self.pos
    }

    /// Transforms a point from world space to the body's local space.
    pub fn global_to_local(&self, point: Vec2) -> Vec2 {
        self.rot_mat.apply_transposed(point - self.pos)
    }

    /// Transforms a free vector (no translation) from local to world space.
    pub fn local_to_global_vec(&self, vec: Vec2) -> Vec2 {
        self.rot_mat.apply(vec)
    }

    /// Transforms a free vector from world to local space.
    pub fn global_to_local_vec(&self, vec: Vec2) -> Vec2 {
        self.rot_mat.apply_transposed(vec)
    }

    /// The tight (unfattened) world-space AABB over all colliders.
    pub fn bounds(&self) -> Aabb {
        self.inner_bounds
    }

    /// Applies a linear+angular impulse at a world-space point. See
    /// `SPEC_FULL.md` section F.1 — this method is not documented by
    /// name in the system this crate is modeled on, but is required by
    /// the rigid-fluid coupling path.
    pub fn apply_impulse(&mut self, impulse: Vec2, world_point: Vec2) {
        if self.inv_mass != 0.0 {
            self.vel += impulse * self.inv_mass;
        }
        if self.inv_moment != 0.0 {
            let r = world_point - self.pos;
            self.rot_v += self.inv_moment * r.cross(impulse);
        }
    }

    /// Integrates position and orientation by `step_size`, using the
    /// body's current velocity. A no-op for a body at rest, matching
    /// the guard in the system this is ported from.
    pub fn integrate(&mut self, step_size: Real) {
        if self.vel != Vec2::ZERO || self.rot_v != 0.0 {
            self.pos += self.vel * step_size;
            self.rot += self.rot_v * step_size;
            self.rot_mat = rotation_matrix(self.rot);
            self.update_bounds();
        }
    }

    fn update_bounds(&mut self) {
        if self.colliders.is_empty() {
            self.inner_bounds = Aabb { lower: self.pos, upper: self.pos };
            return;
        }
        let mut lower = Vec2::splat(Real::INFINITY);
        let mut upper = Vec2::splat(Real::NEG_INFINITY);
        for collider in &self.colliders {
            let (lo, hi) = collider.world_bounds(self.pos, self.rot_mat);
            lower.x = lower.x.min(lo.x);
            lower.y = lower.y.min(lo.y);
            upper.x = upper.x.max(hi.x);
            upper.y = upper.y.max(hi.y);
        }
        self.inner_bounds = Aabb { lower, upper };
    }

    /// This body's attached colliders. Narrow phase runs once per
    /// collider pair between two broad-phase-paired bodies, matching
    /// the system this is ported from.
    pub fn colliders(&self) -> &[Box<dyn Collider>] {
        &self.colliders
    }

    /// The support point (in world space) furthest along `direction`,
    /// for a single one of this body's colliders. Used by GJK/EPA.
    pub fn global_support(&self, collider: &dyn Collider, direction: Vec2) -> Vec2 {
        let local_dir = self.global_to_local_vec(direction);
        self.local_to_global(collider.support(local_dir))
    }

    /// Installs a collision handler, replacing any previously installed one.
    pub fn set_collision_handler(
        &mut self,
        handler: impl FnMut(BodyId, Vec2, Vec2, Vec2) -> bool + Send + Sync + 'static,
    ) {
        self.collision_handler = Some(Box::new(handler));
    }

    /// Removes any installed collision handler.
    pub fn clear_collision_handler(&mut self) {
        self.collision_handler = None;
    }

    /// Invokes the installed collision handler, if any. Called by the
    /// world once per touching body, once for each side of a collision.
    pub(crate) fn try_collision_handler(
        &mut self,
        other: BodyId,
        normal: Vec2,
        local_self: Vec2,
        local_other: Vec2,
    ) -> bool {
        match &mut self.collision_handler {
            Some(handler) => handler(other, normal, local_self, local_other),
            None => false,
        }
    }
}

/// Indexed access to a collection of [`RigidBody`]s by [`BodyId`], used
/// by the SPH solver to read body transforms and apply coupling
/// impulses without depending on `crate::world` directly.
pub trait BodyAccess {
    /// Looks up a body. Panics on an unknown id.
    fn get(&self, id: BodyId) -> &RigidBody;
    /// Looks up a body mutably. Panics on an unknown id.
    fn get_mut(&mut self, id: BodyId) -> &mut RigidBody;
}

fn invert_mass(value: Real) -> (Real, Real) {
    if value < 0.0 {
        (0.0, -1.0)
    } else {
        (1.0 / value, value)
    }
}

/// Computes twice the signed area of a closed polygon; positive means
/// clockwise winding (screen-space y-down convention, matching the
/// system this is ported from).
pub fn check_winding(polygon: &[Vec2]) -> bool {
    let mut total = 0.0;
    let mut a = polygon[polygon.len() - 1];
    for &b in polygon {
        total += (b.x - a.x) * (a.y + b.y);
        a = b;
    }
    total > 0.0
}

/// Three-point winding check, used by GJK to keep its simplex in a
/// consistent orientation.
pub fn check_winding_triple(a: Vec2, b: Vec2, c: Vec2) -> bool {
    let total = (a.x - c.x) * (c.y + a.y) + (b.x - a.x) * (a.y + b.y) + (c.x - b.x) * (b.y + c.y);
    total > 0.0
}

/// Validates a polygon collider's point list: at least 3 vertices, and
/// (via the signed-area helper) consistent clockwise winding implies
/// convexity is the caller's responsibility, matching the system this
/// is ported from (`PolyCollider`'s comment: "winding must be pre
/// checked").
pub fn validate_polygon(points: &[Vec2]) -> Result<(), PhysicsError> {
    if points.len() < 3 {
        return Err(PhysicsError::DegeneratePolygon(points.len()));
    }
    Ok(())
}
