//! Weakly-compressible SPH with divergence-free incompressibility
//! correction and two-way coupling to rigid bodies.

use tracing::trace;

use crate::Real;
use crate::math::{Vec2, Vec3};
use crate::object::{BodyAccess, BodyId};

use super::kernel::{kernel, kernel_grad, kernel_grad_size, kernel_vec};
use super::particle::{FluidParticle, RigidParticle};
use super::zorder::Hash;

/// Two indices into the same slice, borrowed mutably and disjointly.
/// Used to apply a force or volume contribution symmetrically to a
/// particle and one of its neighbours without a second full pass.
fn get_two_mut<T>(slice: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j);
    if i < j {
        let (left, right) = slice.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// A weakly-compressible SPH fluid solver with two-way rigid-body
/// coupling.
///
/// All internal particle state is kept in a `scaleFactor`-scaled space
/// so that the kernel's unit support radius corresponds to the desired
/// physical smoothing length; [`SphSolver::add_fluid_particle`] and the
/// positions reported back out are in that same scaled space (mirroring
/// the system this is ported from, which does not unscale on read).
#[derive(Debug)]
pub struct SphSolver {
    fluid: Vec<FluidParticle>,
    rigid: Vec<RigidParticle>,

    scale_factor: Real,
    inv_scale_factor: Real,
    scale_factor2: Real,
    mass_conversion_factor: Real,
    inv_mass_conversion_factor: Real,
    target_neighbourhood_volume: Real,

    /// Viscous damping coefficient.
    pub viscosity: Real,
    /// Surface tension / cohesion coefficient.
    pub surface_tension: Real,
}

impl SphSolver {
    /// Creates a solver whose internal (kernel-space) coordinates are
    /// `scale_factor` times the caller's world-space coordinates.
    pub fn new(scale_factor: Real) -> Self {
        let inv_scale_factor = 1.0 / scale_factor;
        let target_neighbourhood_volume = 3.0;
        let mass_conversion_factor = (inv_scale_factor * inv_scale_factor) * target_neighbourhood_volume;
        SphSolver {
            fluid: Vec::new(),
            rigid: Vec::new(),
            scale_factor,
            inv_scale_factor,
            scale_factor2: scale_factor * scale_factor,
            mass_conversion_factor,
            inv_mass_conversion_factor: 1.0 / mass_conversion_factor,
            target_neighbourhood_volume,
            viscosity: 0.001,
            surface_tension: 0.001,
        }
    }

    /// Adds a fluid particle at world-space `pos`/`vel`.
    pub fn add_fluid_particle(&mut self, pos: Vec2, vel: Vec2, color: Vec3, mass: Real) {
        self.fluid.push(FluidParticle::new(pos * self.scale_factor, vel * self.scale_factor, color, 1.0 / mass));
    }

    /// Adds a rigid-fluid coupling sample point at `local_position` on
    /// `body`.
    pub fn add_rigid_particle(&mut self, body: BodyId, local_position: Vec2) {
        self.rigid.push(RigidParticle::new(body, local_position));
    }

    /// Current fluid particles, in solver (scaled) space.
    pub fn particles(&self) -> &[FluidParticle] {
        &self.fluid
    }

    /// Current rigid coupling particles, in solver (scaled) space.
    pub fn rigid_particles(&self) -> &[RigidParticle] {
        &self.rigid
    }

    /// The world-to-solver-space scale factor.
    pub fn scale_factor(&self) -> Real {
        self.scale_factor
    }

    /// Advances the fluid by `total_step` seconds, internally split into
    /// substeps of at most half a second so a single call spanning a
    /// large step still converges.
    pub fn update<B: BodyAccess>(&mut self, bodies: &mut B, total_step: Real) {
        let maximum_step: Real = 0.5;
        let mut current_step = 0.0;
        while current_step + maximum_step < total_step {
            self.single_step(bodies, maximum_step);
            current_step += maximum_step;
        }
        self.single_step(bodies, total_step - current_step);
    }

    /// Runs one fixed-size substep.
    pub fn single_step<B: BodyAccess>(&mut self, bodies: &mut B, time_step: Real) {
        let (fluid_neighbours, rigid_neighbours) = self.fix_particles(bodies);
        self.correct_divergence(bodies, &fluid_neighbours, &rigid_neighbours);
        self.apply_non_pressure_forces(bodies, &fluid_neighbours, &rigid_neighbours, time_step);
        self.correct_density(bodies, &fluid_neighbours, &rigid_neighbours, time_step);

        for p in &mut self.fluid {
            p.pos += p.vel * time_step;
        }
        trace!(fluid = self.fluid.len(), rigid = self.rigid.len(), time_step, "sph substep");
    }

    /// Re-samples rigid particles from their bodies' current transforms,
    /// rebuilds both spatial hashes, and recomputes each particle's
    /// volume and (for fluid particles) surface normal and alpha for
    /// this substep. Returns the fluid-fluid and rigid-fluid neighbour
    /// lists the rest of the substep will use.
    fn fix_particles<B: BodyAccess>(&mut self, bodies: &mut B) -> (Vec<Vec<u32>>, Vec<Vec<u32>>) {
        for rp in &mut self.rigid {
            let body = bodies.get(rp.body);
            let offset = body.local_to_global_vec(rp.local_position);
            rp.pos = (offset + body.pos) * self.scale_factor;
            rp.vel = (Vec2::new(-offset.y, offset.x) * body.rot_v + body.vel) * self.scale_factor;
        }

        let fluid_positions: Vec<Vec2> = self.fluid.iter().map(|p| p.pos).collect();
        let fluid_hash = Hash::build(&fluid_positions);
        let fluid_neighbours = fluid_hash.self_neighbours(&fluid_positions);

        let rigid_positions: Vec<Vec2> = self.rigid.iter().map(|p| p.pos).collect();
        let rigid_hash = Hash::build(&rigid_positions);
        let rigid_self_neighbours = rigid_hash.self_neighbours(&rigid_positions);

        // Rigid particle volumes, accumulated over nearby rigid
        // particles (including ones attached to other bodies).
        for p in &mut self.rigid {
            p.volume = kernel(0.0);
        }
        for i in 0..self.rigid.len() {
            for &j in &rigid_self_neighbours[i] {
                let j = j as usize;
                let influence = kernel_vec(self.rigid[j].pos - self.rigid[i].pos);
                let (pi, pj) = get_two_mut(&mut self.rigid, i, j);
                pi.volume += influence;
                pj.volume += influence;
            }
        }

        // From here on a rigid particle's neighbour list is nearby
        // fluid particles, not other rigid particles.
        let rigid_neighbours = rigid_hash.cross_neighbours(&rigid_positions, &fluid_hash, &fluid_positions);

        for p in &mut self.fluid {
            p.volume = kernel(0.0);
            p.alpha = 0.0;
            p.normal = Vec2::ZERO;
        }
        for i in 0..self.fluid.len() {
            for &j in &fluid_neighbours[i] {
                let j = j as usize;
                let delta = self.fluid[j].pos - self.fluid[i].pos;
                let influence = kernel_vec(delta);
                let grad = kernel_grad(delta);
                let length2 = grad.length2();
                let (pi, pj) = get_two_mut(&mut self.fluid, i, j);
                pi.volume += influence;
                pj.volume += influence;
                pi.normal += grad;
                pj.normal -= grad;
                pi.alpha += length2;
                pj.alpha += length2;
            }
        }

        for p in &mut self.rigid {
            p.alpha = self.target_neighbourhood_volume / p.volume;
        }
        for i in 0..self.rigid.len() {
            let alpha_i = self.rigid[i].alpha;
            let pos_i = self.rigid[i].pos;
            for &j in &rigid_neighbours[i] {
                let j = j as usize;
                let delta = pos_i - self.fluid[j].pos;
                let grad = kernel_grad(delta);
                self.fluid[j].volume += kernel_vec(delta) * alpha_i;
                self.fluid[j].normal += grad;
                self.fluid[j].alpha += grad.length2();
            }
        }

        for p in &mut self.fluid {
            p.alpha = p.volume / (p.normal.length2() + p.alpha).max(1e-6);
        }

        (fluid_neighbours, rigid_neighbours)
    }

    fn update_volume_derivative(&mut self, fluid_neighbours: &[Vec<u32>], rigid_neighbours: &[Vec<u32>]) {
        for p in &mut self.fluid {
            p.volume_derivative = 0.0;
        }
        for i in 0..self.fluid.len() {
            for &j in &fluid_neighbours[i] {
                let j = j as usize;
                let derivative =
                    (self.fluid[i].vel - self.fluid[j].vel).dot(kernel_grad(self.fluid[i].pos - self.fluid[j].pos));
                let (pi, pj) = get_two_mut(&mut self.fluid, i, j);
                pi.volume_derivative += derivative;
                pj.volume_derivative += derivative;
            }
        }
        for i in 0..self.rigid.len() {
            let pos_i = self.rigid[i].pos;
            let vel_i = self.rigid[i].vel;
            for &j in &rigid_neighbours[i] {
                let j = j as usize;
                let derivative = (self.fluid[j].vel - vel_i).dot(kernel_grad(self.fluid[j].pos - pos_i));
                self.fluid[j].volume_derivative += derivative;
            }
        }
    }

    fn apply_separation_impulse_fluid(&mut self, a: usize, b: usize, separation_factor: Real) {
        let pa = self.fluid[a];
        let pb = self.fluid[b];
        let impulse = kernel_grad(pa.pos - pb.pos) * (separation_factor / (pa.inv_mass + pb.inv_mass));
        self.fluid[a].vel -= impulse * pa.inv_mass;
        self.fluid[b].vel += impulse * pb.inv_mass;
    }

    fn apply_separation_impulse_rigid<B: BodyAccess>(
        &mut self,
        bodies: &mut B,
        rigid_idx: usize,
        fluid_idx: usize,
        separation_factor: Real,
    ) {
        let rp = self.rigid[rigid_idx];
        let fp = self.fluid[fluid_idx];

        let grad = kernel_grad(fp.pos - rp.pos);
        let normal = grad.normalised();
        let body = bodies.get(rp.body);
        let offset = body.local_to_global_vec(rp.local_position);
        let cross = normal.cross(offset);

        let denom = (body.inv_mass() + body.inv_moment() * self.scale_factor2 * cross * cross)
            * self.inv_mass_conversion_factor
            + fp.inv_mass;
        let impulse = grad * (separation_factor / denom);

        let body = bodies.get_mut(rp.body);
        body.apply_impulse(impulse * self.mass_conversion_factor, rp.pos * self.inv_scale_factor);
        self.fluid[fluid_idx].vel -= impulse * fp.inv_mass;
    }

    /// One pass of the velocity-divergence (incompressibility) solve,
    /// iterated until the average predicted volume growth is near zero
    /// or the iteration cap is hit.
    fn correct_divergence<B: BodyAccess>(&mut self, bodies: &mut B, fluid_neighbours: &[Vec<u32>], rigid_neighbours: &[Vec<u32>]) {
        let mut steps = 0;
        loop {
            let mut total = 0.0;
            self.update_volume_derivative(fluid_neighbours, rigid_neighbours);

            for p in &mut self.fluid {
                p.volume_derivative = p.volume_derivative.max(0.0);
                total += p.volume_derivative;
                p.outward = 0.5 * p.alpha * p.volume_derivative / p.volume;
            }

            for i in 0..self.fluid.len() {
                for &j in &fluid_neighbours[i] {
                    let j = j as usize;
                    let factor = 2.0 * (self.fluid[i].outward + self.fluid[j].outward);
                    self.apply_separation_impulse_fluid(i, j, factor);
                }
            }
            for i in 0..self.rigid.len() {
                let alpha_i = self.rigid[i].alpha;
                for &j in &rigid_neighbours[i] {
                    let j = j as usize;
                    let factor = alpha_i * self.fluid[j as usize].outward;
                    self.apply_separation_impulse_rigid(bodies, i, j, factor);
                }
            }

            steps += 1;
            let error = total / (self.fluid.len() as Real * self.target_neighbourhood_volume);
            if !(error > 0.0005 && steps < 20) {
                break;
            }
        }
    }

    /// One pass of the position-divergence (density) solve, same
    /// iterate-to-convergence shape as [`SphSolver::correct_divergence`]
    /// but driven by predicted volume one `time_step` ahead rather than
    /// the instantaneous volume derivative.
    fn correct_density<B: BodyAccess>(
        &mut self,
        bodies: &mut B,
        fluid_neighbours: &[Vec<u32>],
        rigid_neighbours: &[Vec<u32>],
        time_step: Real,
    ) {
        let mut steps = 0;
        loop {
            let mut total = 0.0;
            self.update_volume_derivative(fluid_neighbours, rigid_neighbours);

            for p in &mut self.fluid {
                let forward_volume = (p.volume_derivative * time_step + p.volume).max(self.target_neighbourhood_volume);
                total += forward_volume;
                p.outward = p.alpha * (forward_volume - self.target_neighbourhood_volume) / (time_step * p.volume);
            }

            for i in 0..self.fluid.len() {
                for &j in &fluid_neighbours[i] {
                    let j = j as usize;
                    let factor = 2.0 * (self.fluid[i].outward + self.fluid[j].outward);
                    self.apply_separation_impulse_fluid(i, j, factor);
                }
            }
            for i in 0..self.rigid.len() {
                let alpha_i = self.rigid[i].alpha;
                for &j in &rigid_neighbours[i] {
                    let j = j as usize;
                    let factor = alpha_i * self.fluid[j].outward;
                    self.apply_separation_impulse_rigid(bodies, i, j, factor);
                }
            }

            steps += 1;
            let error = total / (self.fluid.len() as Real * self.target_neighbourhood_volume);
            if !(error > 1.001 && steps < 20) {
                break;
            }
        }
    }

    fn apply_non_pressure_forces<B: BodyAccess>(
        &mut self,
        bodies: &mut B,
        fluid_neighbours: &[Vec<u32>],
        rigid_neighbours: &[Vec<u32>],
        time_step: Real,
    ) {
        for p in &mut self.fluid {
            p.normal = Vec2::ZERO;
        }
        for i in 0..self.fluid.len() {
            for &j in &fluid_neighbours[i] {
                let j = j as usize;
                let grad = kernel_grad(self.fluid[i].pos - self.fluid[j].pos);
                let vi = self.fluid[i].volume;
                let vj = self.fluid[j].volume;
                self.fluid[i].normal += grad / vi;
                self.fluid[j].normal -= grad / vj;
            }
        }

        for i in 0..self.fluid.len() {
            for &j in &fluid_neighbours[i] {
                let j = j as usize;
                let delta = self.fluid[i].pos - self.fluid[j].pos;
                let dist = delta.length();

                let viscosity_coeff = (2.0 * self.viscosity * kernel_grad_size(dist)) / (self.fluid[j].volume * dist);
                let mut force = (self.fluid[i].vel - self.fluid[j].vel) * viscosity_coeff;

                let mut surface_tension_force = self.fluid[j].normal - self.fluid[i].normal;
                let inverse = 1.0 - dist;
                let cohesion_base = if dist < 0.5 {
                    (2.0 * inverse * inverse * inverse * dist * dist * dist - 1.0 / 64.0) / dist
                } else if dist < 1.0 {
                    inverse * inverse * inverse * dist * dist
                } else {
                    0.0
                };
                let cohesion = cohesion_base * (32.0 / std::f32::consts::PI);
                surface_tension_force -= delta * cohesion;

                let deficiency = (2.0 * self.target_neighbourhood_volume) / (self.fluid[i].volume + self.fluid[j].volume);
                force += surface_tension_force * (self.surface_tension * deficiency);

                force *= time_step;

                self.fluid[i].vel += force * self.fluid[i].inv_mass;
                self.fluid[j].vel -= force * self.fluid[j].inv_mass;
            }
        }

        for i in 0..self.rigid.len() {
            let alpha_i = self.rigid[i].alpha;
            let pos_i = self.rigid[i].pos;
            let vel_i = self.rigid[i].vel;
            let friction_i = bodies.get(self.rigid[i].body).friction;
            for &j in &rigid_neighbours[i] {
                let j = j as usize;
                let delta = pos_i - self.fluid[j].pos;
                let dist = delta.length();

                let coeff = (6.0 * alpha_i * self.viscosity * friction_i * kernel_grad_size(dist)) / (self.fluid[j].volume * dist);
                let mut force = (vel_i - self.fluid[j].vel) * coeff;
                force *= time_step;

                let body = bodies.get_mut(self.rigid[i].body);
                body.apply_impulse(force * self.mass_conversion_factor, pos_i * self.inv_scale_factor);
                self.fluid[j].vel -= force * self.fluid[j].inv_mass;
            }
        }

        self.update_rigid_particle_velocities(bodies);
    }

    fn update_rigid_particle_velocities<B: BodyAccess>(&mut self, bodies: &B) {
        for rp in &mut self.rigid {
            let body = bodies.get(rp.body);
            let offset = body.local_to_global_vec(rp.local_position);
            rp.vel = (Vec2::new(-offset.y, offset.x) * body.rot_v + body.vel) * self.scale_factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::{Aabb, AabbTree};
    use crate::object::{CircleCollider, RigidBody, RigidBodyMaterial};

    struct SingleBody(RigidBody);

    impl BodyAccess for SingleBody {
        fn get(&self, _id: BodyId) -> &RigidBody {
            &self.0
        }
        fn get_mut(&mut self, _id: BodyId) -> &mut RigidBody {
            &mut self.0
        }
    }

    fn static_floor() -> SingleBody {
        let mut tree = AabbTree::new(0.0);
        let node = tree.insert(Aabb { lower: Vec2::ZERO, upper: Vec2::ZERO });
        let mut body = RigidBody::new(-1.0, -1.0, RigidBodyMaterial::ROCK, node);
        body.add_collider(Box::new(CircleCollider::new(1.0)));
        SingleBody(body)
    }

    #[test]
    fn two_particles_separate_when_overlapping() {
        let mut solver = SphSolver::new(10.0);
        solver.add_fluid_particle(Vec2::new(0.0, 0.0), Vec2::ZERO, Vec3::ZERO, 1.0);
        solver.add_fluid_particle(Vec2::new(0.02, 0.0), Vec2::ZERO, Vec3::ZERO, 1.0);

        let mut bodies = static_floor();
        let before = (solver.particles()[0].pos - solver.particles()[1].pos).length();
        solver.update(&mut bodies, 0.1);
        let after = (solver.particles()[0].pos - solver.particles()[1].pos).length();
        assert!(after > before);
    }

    #[test]
    fn isolated_particle_is_unaffected() {
        let mut solver = SphSolver::new(10.0);
        solver.add_fluid_particle(Vec2::new(0.0, 0.0), Vec2::ZERO, Vec3::ZERO, 1.0);

        let mut bodies = static_floor();
        solver.update(&mut bodies, 0.1);
        assert_eq!(solver.particles()[0].pos, Vec2::ZERO);
    }
}
