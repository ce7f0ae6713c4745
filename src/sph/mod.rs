//! Weakly-compressible smoothed-particle-hydrodynamics fluid, coupled
//! two-way to rigid bodies via [`crate::object::BodyAccess`].

mod kernel;
mod particle;
mod solver;
mod zorder;

pub use self::kernel::{kernel, kernel_grad, kernel_grad_size, kernel_vec};
pub use self::particle::{FluidParticle, RigidParticle};
pub use self::solver::SphSolver;
