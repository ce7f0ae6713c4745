//! Bilateral constraints and persistent contact manifolds, built on
//! shared Jacobian/effective-mass solver primitives.

mod bilateral;
mod contact;
pub mod solver;

pub use self::bilateral::{BilateralConstraint, CustomConstraint, FixedConstraint, PivotConstraint, SliderConstraint};
pub use self::contact::{combine_properties, ContactConstraint, ContactPoint, PERSISTENCE_THRESHOLD};
