//! # kinetica2d
//!
//! A 2D rigid-body and SPH fluid physics core.
//!
//! Features:
//!
//! * A dynamic AABB tree (BVH) broad phase, with velocity-directional
//!   fattening so coherent pairs don't get re-inserted every step.
//! * GJK + EPA narrow phase over a small set of convex collider shapes
//!   (circle, convex polygon).
//! * A sequential-impulse constraint solver with Baumgarte stabilization,
//!   warm-started accumulators and persistent contact manifolds.
//! * Bilateral constraints: pivot, fixed, slider, and a user-supplied
//!   custom constraint.
//! * A Smoothed Particle Hydrodynamics fluid solver with two-way
//!   rigid-fluid coupling, using a Z-order spatial hash for neighbour
//!   queries.
//!
//! Uses single precision (`f32`) throughout; see [`Real`].
//!
//! This crate has no rendering, asset loading, or scene-description
//! surface — it is a simulation core meant to be driven by a host
//! application.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

pub mod aabb;
pub mod collide;
pub mod constraint;
pub mod error;
pub mod math;
pub mod object;
pub mod sph;
pub mod world;

/// Scalar type used throughout the crate.
pub type Real = f32;

pub use crate::error::PhysicsError;
pub use crate::object::{BodyId, CircleCollider, Collider, PolygonCollider, RigidBody, RigidBodyMaterial};
pub use crate::constraint::{BilateralConstraint, ContactConstraint, ContactPoint};
pub use crate::sph::{FluidParticle, RigidParticle};
pub use crate::world::{ConstraintId, World, WorldConfig};
