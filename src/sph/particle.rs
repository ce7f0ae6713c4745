//! SPH particle data. Fluid particles carry their own inverse mass;
//! rigid particles are massless sample points anchored to a
//! [`RigidBody`](crate::object::RigidBody) and only ever read/write
//! through it.

use crate::Real;
use crate::math::{Vec2, Vec3};
use crate::object::BodyId;

/// A fluid sample point.
///
/// `volume`, `alpha`, `normal`, `volume_derivative` and `outward` are
/// scratch fields recomputed every solver substep; only `pos`, `vel`
/// and `inv_mass` carry meaning between substeps. The system this is
/// ported from unions `normal` with `(volume_derivative, outward)` to
/// save memory in the same scratch role; this keeps them as separate
/// fields since there is no corresponding pressure here.
#[derive(Copy, Clone, Debug)]
pub struct FluidParticle {
    /// Position, in solver (scaled) space.
    pub pos: Vec2,
    /// Velocity, in solver (scaled) space.
    pub vel: Vec2,
    /// Passed through unchanged; the solver never reads it.
    pub color: Vec3,
    /// `1 / mass`.
    pub inv_mass: Real,

    pub(super) volume: Real,
    pub(super) alpha: Real,
    pub(super) normal: Vec2,
    pub(super) volume_derivative: Real,
    pub(super) outward: Real,
}

impl FluidParticle {
    pub(super) fn new(pos: Vec2, vel: Vec2, color: Vec3, inv_mass: Real) -> Self {
        FluidParticle {
            pos,
            vel,
            color,
            inv_mass,
            volume: 0.0,
            alpha: 0.0,
            normal: Vec2::ZERO,
            volume_derivative: 0.0,
            outward: 0.0,
        }
    }
}

/// A sample point rigidly attached to a [`RigidBody`](crate::object::RigidBody),
/// coupling it to the surrounding fluid. Its `pos`/`vel` are derived
/// from the body's transform at the start of every substep, not
/// integrated on their own.
#[derive(Copy, Clone, Debug)]
pub struct RigidParticle {
    /// The body this sample point is attached to.
    pub body: BodyId,
    /// Attachment point, in the body's local space.
    pub local_position: Vec2,

    pub(super) pos: Vec2,
    pub(super) vel: Vec2,
    pub(super) volume: Real,
    pub(super) alpha: Real,
}

impl RigidParticle {
    pub(super) fn new(body: BodyId, local_position: Vec2) -> Self {
        RigidParticle { body, local_position, pos: Vec2::ZERO, vel: Vec2::ZERO, volume: 0.0, alpha: 0.0 }
    }
}
