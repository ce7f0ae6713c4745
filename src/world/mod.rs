//! The simulation: owns every body, constraint and fluid particle, and
//! drives one step of broad phase, narrow phase, constraint solving and
//! fluid coupling.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::Real;
use crate::aabb::{Aabb, AabbTree, NodeId, velocity_fatten};
use crate::collide::{self, Collision};
use crate::constraint::{
    BilateralConstraint, ContactConstraint, CustomConstraint, FixedConstraint, PivotConstraint, SliderConstraint,
    combine_properties,
};
use crate::error::PhysicsError;
use crate::math::Vec2;
use crate::object::{BodyAccess, BodyId, CircleCollider, Collider, PolygonCollider, RigidBody, RigidBodyMaterial};
use crate::sph::{FluidParticle, RigidParticle, SphSolver};

const DEFAULT_SPH_SCALE_FACTOR: Real = 0.08;

/// Builder-style bundle of [`World::new`]'s parameters, for callers who'd
/// rather not track five positional arguments.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Per-step acceleration applied to every non-static body.
    pub gravity: Vec2,
    /// Positional-correction strength; divided by the step size before
    /// use, so this value is step-size-independent.
    pub baumgarte_bias: Real,
    /// Sequential-impulse iterations run per step.
    pub solver_steps: usize,
    /// Penetration allowed to persist uncorrected (a "slop" to avoid
    /// jitter from fighting floating-point noise).
    pub slop_p: Real,
    /// Closing-velocity slop used the same way, for restitution.
    pub slop_r: Real,
    /// Fixed padding applied to a leaf's tight box for the broad-phase
    /// tree, before velocity-directional fattening.
    pub aabb_margin: Real,
    /// Passed to [`SphSolver::new`].
    pub sph_scale_factor: Real,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            gravity: Vec2::new(0.0, -10.0),
            baumgarte_bias: 0.2,
            solver_steps: 8,
            slop_p: 0.005,
            slop_r: 0.0,
            aabb_margin: 0.1,
            sph_scale_factor: DEFAULT_SPH_SCALE_FACTOR,
        }
    }
}

impl WorldConfig {
    /// Overrides gravity.
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Overrides the Baumgarte bias.
    pub fn with_baumgarte_bias(mut self, baumgarte_bias: Real) -> Self {
        self.baumgarte_bias = baumgarte_bias;
        self
    }

    /// Overrides the solver iteration count.
    pub fn with_solver_steps(mut self, solver_steps: usize) -> Self {
        self.solver_steps = solver_steps;
        self
    }

    /// Overrides the penetration/restitution slop.
    pub fn with_slop(mut self, slop_p: Real, slop_r: Real) -> Self {
        self.slop_p = slop_p;
        self.slop_r = slop_r;
        self
    }

    /// Overrides the broad-phase margin.
    pub fn with_aabb_margin(mut self, aabb_margin: Real) -> Self {
        self.aabb_margin = aabb_margin;
        self
    }

    /// Overrides the SPH scale factor.
    pub fn with_sph_scale_factor(mut self, sph_scale_factor: Real) -> Self {
        self.sph_scale_factor = sph_scale_factor;
        self
    }

    /// Builds the configured [`World`].
    pub fn build(self) -> World {
        World::from_config(self)
    }
}

/// Identifies a [`BilateralConstraint`] attached to a [`World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(u32);

/// A slot-backed arena with index reuse, shared by the body store and the
/// bilateral-constraint store. The same shape as [`crate::aabb::AabbTree`]'s
/// arena, minus the tree structure.
#[derive(Debug)]
struct Slab<T> {
    items: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Slab<T> {
    fn insert(&mut self, value: T) -> u32 {
        if let Some(idx) = self.free.pop() {
            self.items[idx as usize] = Some(value);
            idx
        } else {
            self.items.push(Some(value));
            (self.items.len() - 1) as u32
        }
    }

    fn remove(&mut self, idx: u32) -> Option<T> {
        let value = self.items.get_mut(idx as usize)?.take();
        if value.is_some() {
            self.free.push(idx);
        }
        value
    }

    fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)?.as_ref()
    }

    fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.items.get_mut(idx as usize)?.as_mut()
    }

    fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.items.iter().enumerate().filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.items.iter_mut().enumerate().filter_map(|(i, slot)| slot.as_mut().map(|v| (i as u32, v)))
    }

    /// Mutable references to two distinct entries at once.
    fn get_pair_mut(&mut self, a: u32, b: u32) -> (&mut T, &mut T) {
        assert_ne!(a, b, "cannot borrow the same slab entry twice");
        let (lo, hi, swapped) = if a < b { (a, b, false) } else { (b, a, true) };
        let (left, right) = self.items.split_at_mut(hi as usize);
        let lo_ref = left[lo as usize].as_mut().expect("stale slab index");
        let hi_ref = right[0].as_mut().expect("stale slab index");
        if swapped { (hi_ref, lo_ref) } else { (lo_ref, hi_ref) }
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Slab { items: Vec::new(), free: Vec::new() }
    }
}

/// Borrows only the body store out of a [`World`], so the SPH solver (which
/// needs `&mut` body access) can run alongside the world's own `sph` field
/// without the two mutable borrows overlapping.
struct BodyStore<'a> {
    bodies: &'a mut Slab<RigidBody>,
}

impl<'a> BodyAccess for BodyStore<'a> {
    fn get(&self, id: BodyId) -> &RigidBody {
        self.bodies.get(id.0).unwrap_or_else(|| panic!("unknown body id {id:?}"))
    }

    fn get_mut(&mut self, id: BodyId) -> &mut RigidBody {
        self.bodies.get_mut(id.0).unwrap_or_else(|| panic!("unknown body id {id:?}"))
    }
}

/// Owns every [`RigidBody`], [`BilateralConstraint`], [`ContactConstraint`]
/// and SPH particle in a simulation, and advances them one step at a time.
#[derive(Debug)]
pub struct World {
    bodies: Slab<RigidBody>,
    node_to_body: HashMap<NodeId, BodyId>,
    tree: AabbTree,
    aabb_margin: Real,

    gravity: Vec2,
    baumgarte_bias: Real,
    solver_steps: usize,
    slop_p: Real,
    slop_r: Real,

    bilaterals: Slab<Box<dyn BilateralConstraint>>,
    /// Back-links from a body to the constraints attached to it, so
    /// removing a body can cascade-remove the constraints that reference
    /// it instead of leaving dangling ids behind.
    body_constraints: HashMap<BodyId, Vec<ConstraintId>>,

    /// Persistent per-pair contact manifolds, keyed with `a < b` so a
    /// given body pair always maps to the same entry regardless of which
    /// order the broad phase reports them in. A `BTreeMap` rather than a
    /// `HashMap` so the solver loop below iterates manifolds in a fixed
    /// `(a, b)` order every step instead of `HashMap`'s randomized one —
    /// required since applying one manifold's impulse mutates velocities
    /// a later manifold in the same sweep reads.
    contacts: BTreeMap<(BodyId, BodyId), ContactConstraint>,

    sph: SphSolver,
}

impl World {
    /// Creates an empty world.
    pub fn new(gravity: Vec2, baumgarte_bias: Real, solver_steps: usize, slop_p: Real, slop_r: Real, aabb_margin: Real) -> Self {
        World {
            bodies: Slab::default(),
            node_to_body: HashMap::new(),
            tree: AabbTree::new(aabb_margin),
            aabb_margin,
            gravity,
            baumgarte_bias,
            solver_steps: solver_steps.max(1),
            slop_p,
            slop_r,
            bilaterals: Slab::default(),
            body_constraints: HashMap::new(),
            contacts: BTreeMap::new(),
            sph: SphSolver::new(DEFAULT_SPH_SCALE_FACTOR),
        }
    }

    /// Creates an empty world from a [`WorldConfig`].
    pub fn from_config(config: WorldConfig) -> Self {
        let mut world = World::new(
            config.gravity,
            config.baumgarte_bias,
            config.solver_steps,
            config.slop_p,
            config.slop_r,
            config.aabb_margin,
        );
        world.sph = SphSolver::new(config.sph_scale_factor);
        world
    }

    // -- body management ---------------------------------------------

    /// Creates a body with no colliders attached yet (so its bounds are a
    /// single point at the origin until [`World::add_circle_collider`] or
    /// [`World::add_polygon_collider`] is called).
    pub fn add_object(&mut self, mass: Real, moment: Real, material: RigidBodyMaterial) -> Result<BodyId, PhysicsError> {
        require_finite("mass", mass)?;
        require_finite("moment", moment)?;
        let node = self.tree.insert(Aabb { lower: Vec2::ZERO, upper: Vec2::ZERO });
        let body = RigidBody::new(mass, moment, material, node);
        let idx = self.bodies.insert(body);
        let id = BodyId(idx);
        self.node_to_body.insert(node, id);
        Ok(id)
    }

    /// Attaches a circle collider to `id` and recomputes its tree leaf.
    pub fn add_circle_collider(&mut self, id: BodyId, radius: Real) -> Result<(), PhysicsError> {
        require_finite("radius", radius)?;
        self.attach_collider(id, Box::new(CircleCollider::new(radius)))
    }

    /// Attaches a polygon collider to `id`, reversing the winding if
    /// necessary so it is clockwise, and recomputes its tree leaf.
    pub fn add_polygon_collider(&mut self, id: BodyId, mut points: Vec<Vec2>) -> Result<(), PhysicsError> {
        for p in &points {
            require_finite_vec2("point", *p)?;
        }
        crate::object::validate_polygon(&points)?;
        if !crate::object::check_winding(&points) {
            points.reverse();
        }
        self.attach_collider(id, Box::new(PolygonCollider::new(points)))
    }

    fn attach_collider(&mut self, id: BodyId, collider: Box<dyn Collider>) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(id.0).ok_or(PhysicsError::UnknownBody(id))?;
        body.add_collider(collider);
        let node = body.node();
        let bounds = body.bounds();
        self.tree.update_leaf(node, bounds);
        Ok(())
    }

    /// Removes a body and cascades: any contact manifold or bilateral
    /// constraint touching it is removed too, so neither ever outlives
    /// the body it refers to.
    pub fn remove_object(&mut self, id: BodyId) {
        let node = match self.bodies.get(id.0) {
            Some(body) => body.node(),
            None => return,
        };

        self.tree.remove(node);
        self.node_to_body.remove(&node);
        self.contacts.retain(|&(a, b), _| a != id && b != id);

        if let Some(constraints) = self.body_constraints.remove(&id) {
            for constraint_id in constraints {
                self.remove_constraint(constraint_id);
            }
        }

        self.bodies.remove(id.0);
    }

    /// Removes every body, constraint, contact and fluid particle.
    pub fn clear(&mut self) {
        *self = World::new(self.gravity, self.baumgarte_bias, self.solver_steps, self.slop_p, self.slop_r, self.aabb_margin);
    }

    /// Looks up a body.
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.0)
    }

    /// Looks up a body mutably.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.0)
    }

    /// Every body currently in the world.
    pub fn objects(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().map(|(i, b)| (BodyId(i), b))
    }

    // -- bilateral constraints ----------------------------------------

    /// Attaches a pivot joining `local_a` on `a` to `local_b` on `b`.
    pub fn add_pivot_constraint(&mut self, a: BodyId, b: BodyId, local_a: Vec2, local_b: Vec2) -> Result<ConstraintId, PhysicsError> {
        require_finite_vec2("local_a", local_a)?;
        require_finite_vec2("local_b", local_b)?;
        self.add_bilateral(a, b, Box::new(PivotConstraint::new(a, b, local_a, local_b)))
    }

    /// Attaches a fixed joint between `local_a` on `a` and `local_b` on `b`.
    pub fn add_fixed_constraint(&mut self, a: BodyId, b: BodyId, local_a: Vec2, local_b: Vec2) -> Result<ConstraintId, PhysicsError> {
        require_finite_vec2("local_a", local_a)?;
        require_finite_vec2("local_b", local_b)?;
        self.add_bilateral(a, b, Box::new(FixedConstraint::new(a, b, local_a, local_b)))
    }

    /// Attaches a slider between `local_a`/`local_b` along axis `local_n`
    /// (in `a`'s local space).
    pub fn add_slider_constraint(
        &mut self,
        a: BodyId,
        b: BodyId,
        local_a: Vec2,
        local_b: Vec2,
        local_n: Vec2,
    ) -> Result<ConstraintId, PhysicsError> {
        require_finite_vec2("local_a", local_a)?;
        require_finite_vec2("local_b", local_b)?;
        require_finite_vec2("local_n", local_n)?;
        self.add_bilateral(a, b, Box::new(SliderConstraint::new(a, b, local_a, local_b, local_n)))
    }

    /// Attaches a caller-defined constraint, invoking `callback(body_a,
    /// body_b, baumgarte_bias)` once per solver iteration.
    pub fn add_custom_constraint(
        &mut self,
        a: BodyId,
        b: BodyId,
        allow_collision: bool,
        callback: impl Fn(&mut RigidBody, &mut RigidBody, Real) + Send + Sync + 'static,
    ) -> Result<ConstraintId, PhysicsError> {
        self.add_bilateral(a, b, Box::new(CustomConstraint::new(a, b, allow_collision, callback)))
    }

    fn add_bilateral(&mut self, a: BodyId, b: BodyId, constraint: Box<dyn BilateralConstraint>) -> Result<ConstraintId, PhysicsError> {
        if a == b {
            return Err(PhysicsError::SelfConstraint(a));
        }
        let idx = self.bilaterals.insert(constraint);
        let id = ConstraintId(idx);
        self.body_constraints.entry(a).or_default().push(id);
        self.body_constraints.entry(b).or_default().push(id);
        Ok(id)
    }

    /// Detaches a bilateral constraint.
    pub fn remove_constraint(&mut self, id: ConstraintId) {
        if let Some(constraint) = self.bilaterals.remove(id.0) {
            let a = constraint.body_a();
            let b = constraint.body_b();
            self.unlink_constraint(a, id);
            self.unlink_constraint(b, id);
        }
    }

    fn unlink_constraint(&mut self, body: BodyId, id: ConstraintId) {
        if let Some(list) = self.body_constraints.get_mut(&body) {
            list.retain(|&c| c != id);
        }
    }

    fn pair_excludes_collision(&self, a: BodyId, b: BodyId) -> bool {
        let Some(ids) = self.body_constraints.get(&a) else { return false };
        ids.iter().any(|&id| {
            self.bilaterals.get(id.0).is_some_and(|c| {
                let touches_pair = (c.body_a() == a && c.body_b() == b) || (c.body_a() == b && c.body_b() == a);
                touches_pair && !c.allow_collision()
            })
        })
    }

    // -- fluid ----------------------------------------------------------

    /// Adds a free-moving fluid sample point.
    pub fn add_fluid_particle(&mut self, pos: Vec2, vel: Vec2, color: crate::math::Vec3, mass: Real) {
        self.sph.add_fluid_particle(pos, vel, color, mass);
    }

    /// Adds a sample point rigidly attached to `body`, at `local_position`
    /// in its local space, coupling it to the surrounding fluid.
    pub fn add_rigid_particle(&mut self, body: BodyId, local_position: Vec2) {
        self.sph.add_rigid_particle(body, local_position);
    }

    /// Current fluid particles.
    pub fn fluid_particles(&self) -> &[FluidParticle] {
        self.sph.particles()
    }

    /// Current rigid-coupling particles.
    pub fn rigid_particles(&self) -> &[RigidParticle] {
        self.sph.rigid_particles()
    }

    /// The scale factor converting world space to SPH solver space.
    pub fn sph_scale_factor(&self) -> Real {
        self.sph.scale_factor()
    }

    // -- contacts (read-only) -------------------------------------------

    /// Current contact manifolds, for inspection/debugging/rendering.
    pub fn contacts(&self) -> impl Iterator<Item = &ContactConstraint> {
        self.contacts.values()
    }

    // -- stepping ---------------------------------------------------------

    /// Advances the simulation by `step_size` seconds: broad phase, narrow
    /// phase, constraint solving, integration, then a fluid step.
    pub fn update(&mut self, step_size: Real) {
        let pairs = self.broad_phase();
        trace!(pairs = pairs.len(), "broad phase done");

        for (a, b) in pairs {
            let collisions = self.narrow_phase_pair(a, b);
            for collision in collisions {
                self.resolve_collision(a, b, collision);
            }
        }

        let adjusted_baumgarte_bias = self.baumgarte_bias / step_size;
        let tick_gravity = self.gravity * step_size;

        let keys: Vec<(BodyId, BodyId)> = self.contacts.keys().copied().collect();

        for key in &keys {
            let (a, b) = self.bodies.get_pair_mut(key.0.0, key.1.0);
            self.contacts.get_mut(key).unwrap().update_points(a, b, adjusted_baumgarte_bias, self.slop_p, self.slop_r, tick_gravity);
        }

        for key in &keys {
            let (a, b) = self.bodies.get_pair_mut(key.0.0, key.1.0);
            self.contacts.get(key).unwrap().warm_start(a, b);
        }

        for _ in 0..self.solver_steps {
            for (_, constraint) in self.bilaterals.iter() {
                let (a, b) = self.bodies.get_pair_mut(constraint.body_a().0, constraint.body_b().0);
                constraint.apply(a, b, adjusted_baumgarte_bias);
            }
            for key in &keys {
                let contact = self.contacts.get_mut(key).unwrap();
                if contact.num_points() != 0 {
                    let (a, b) = self.bodies.get_pair_mut(key.0.0, key.1.0);
                    contact.apply(a, b);
                }
            }
        }

        for (_, body) in self.bodies.iter_mut() {
            body.integrate(step_size);
            if body.inv_mass() != 0.0 {
                body.vel += tick_gravity;
            }
        }

        let mut sph = std::mem::replace(&mut self.sph, SphSolver::new(DEFAULT_SPH_SCALE_FACTOR));
        sph.update(&mut BodyStore { bodies: &mut self.bodies }, step_size);
        self.sph = sph;
    }

    fn broad_phase(&mut self) -> Vec<(BodyId, BodyId)> {
        let ids: Vec<BodyId> = self.bodies.iter().map(|(i, _)| BodyId(i)).collect();
        for id in ids {
            self.sync_leaf(id);
        }

        let mut pairs = Vec::new();
        for (node_a, node_b) in self.tree.compute_pairs() {
            let mut a = self.node_to_body[&node_a];
            let mut b = self.node_to_body[&node_b];
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }

            let body_a = self.bodies.get(a.0).unwrap();
            let body_b = self.bodies.get(b.0).unwrap();
            if body_a.is_static() && body_b.is_static() {
                continue;
            }
            if self.pair_excludes_collision(a, b) {
                continue;
            }
            pairs.push((a, b));
        }
        pairs
    }

    fn sync_leaf(&mut self, id: BodyId) {
        let body = self.bodies.get(id.0).unwrap();
        let node = body.node();
        let tight = body.bounds();
        let vel = body.vel;

        self.tree.update_leaf(node, tight);
        let margined = tight.expand(self.aabb_margin);
        self.tree.fatten_leaf(node, velocity_fatten(margined, vel));
    }

    fn narrow_phase_pair(&self, a: BodyId, b: BodyId) -> Vec<Collision> {
        let body_a = self.bodies.get(a.0).unwrap();
        let body_b = self.bodies.get(b.0).unwrap();

        let mut out = Vec::new();
        for collider_a in body_a.colliders() {
            for collider_b in body_b.colliders() {
                if let Some(collision) =
                    collide::evaluate_collision(body_a, collider_a.as_ref(), body_b, collider_b.as_ref(), collide::INITIAL_DIRECTION)
                {
                    out.push(collision);
                }
            }
        }
        out
    }

    fn resolve_collision(&mut self, a: BodyId, b: BodyId, collision: Collision) {
        let handled_a = self
            .bodies
            .get_mut(a.0)
            .map(|body| body.try_collision_handler(b, -collision.normal, collision.local_a, collision.local_b))
            .unwrap_or(false);
        let handled_b = self
            .bodies
            .get_mut(b.0)
            .map(|body| body.try_collision_handler(a, collision.normal, collision.local_b, collision.local_a))
            .unwrap_or(false);
        if handled_a || handled_b {
            debug!(?a, ?b, "collision claimed by a collision handler");
            return;
        }

        let key = (a, b);
        let body_a = self.bodies.get(a.0).unwrap();
        let body_b = self.bodies.get(b.0).unwrap();

        if let Some(existing) = self.contacts.get_mut(&key) {
            existing.add_point(body_a, body_b, collision);
        } else {
            let friction = combine_properties(body_a.friction, body_b.friction);
            let restitution = combine_properties(body_a.restitution, body_b.restitution);
            let mut constraint = ContactConstraint::new(a, b, friction, restitution);
            constraint.add_point(body_a, body_b, collision);
            self.contacts.insert(key, constraint);
        }
    }
}

fn require_finite(field: &'static str, value: Real) -> Result<(), PhysicsError> {
    if value.is_finite() { Ok(()) } else { Err(PhysicsError::NonFinite { field }) }
}

fn require_finite_vec2(field: &'static str, value: Vec2) -> Result<(), PhysicsError> {
    if value.x.is_finite() && value.y.is_finite() { Ok(()) } else { Err(PhysicsError::NonFinite { field }) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        World::new(Vec2::new(0.0, -10.0), 0.2, 8, 0.005, 0.0, 0.1)
    }

    #[test]
    fn falling_circle_gains_downward_velocity() {
        let mut world = test_world();
        let ball = world.add_object(1.0, 1.0, RigidBodyMaterial::ROCK).unwrap();
        world.add_circle_collider(ball, 0.5).unwrap();

        world.update(1.0 / 60.0);

        let vel = world.body(ball).unwrap().vel;
        assert!(vel.y < 0.0);
    }

    #[test]
    fn static_floor_never_moves() {
        let mut world = test_world();
        let floor = world.add_object(-1.0, -1.0, RigidBodyMaterial::ROCK).unwrap();
        world.add_polygon_collider(floor, vec![
            Vec2::new(-10.0, -1.0),
            Vec2::new(10.0, -1.0),
            Vec2::new(10.0, 1.0),
            Vec2::new(-10.0, 1.0),
        ])
        .unwrap();

        world.update(1.0 / 60.0);

        assert_eq!(world.body(floor).unwrap().vel, Vec2::ZERO);
    }

    #[test]
    fn self_constraint_is_rejected() {
        let mut world = test_world();
        let a = world.add_object(1.0, 1.0, RigidBodyMaterial::ROCK).unwrap();
        let err = world.add_pivot_constraint(a, a, Vec2::ZERO, Vec2::ZERO).unwrap_err();
        assert!(matches!(err, PhysicsError::SelfConstraint(_)));
    }

    #[test]
    fn removing_a_body_drops_its_constraints() {
        let mut world = test_world();
        let a = world.add_object(1.0, 1.0, RigidBodyMaterial::ROCK).unwrap();
        let b = world.add_object(1.0, 1.0, RigidBodyMaterial::ROCK).unwrap();
        let constraint = world.add_pivot_constraint(a, b, Vec2::ZERO, Vec2::ZERO).unwrap();

        world.remove_object(a);

        assert!(world.bilaterals.get(constraint.0).is_none());
        assert!(world.body_constraints.get(&b).map(|v| v.is_empty()).unwrap_or(true));
    }

    #[test]
    fn two_circles_resting_on_each_other_get_a_contact() {
        let mut world = test_world();
        let floor = world.add_object(-1.0, -1.0, RigidBodyMaterial::ROCK).unwrap();
        world.body_mut(floor).unwrap().pos = Vec2::new(0.0, -5.0);
        world.add_circle_collider(floor, 5.0).unwrap();

        let ball = world.add_object(1.0, 1.0, RigidBodyMaterial::ROCK).unwrap();
        world.body_mut(ball).unwrap().pos = Vec2::new(0.0, 0.4);
        world.add_circle_collider(ball, 0.5).unwrap();

        world.update(1.0 / 60.0);

        assert_eq!(world.contacts.len(), 1);
    }

    #[test]
    fn clear_empties_the_world() {
        let mut world = test_world();
        world.add_object(1.0, 1.0, RigidBodyMaterial::ROCK).unwrap();
        world.clear();
        assert_eq!(world.objects().count(), 0);
    }
}
