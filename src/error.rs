//! Error types for caller-contract violations.
//!
//! Numerical degeneracies that occur *inside* a running simulation step
//! (GJK/EPA failing to converge, a singular effective-mass matrix, a
//! zero-length contact normal) are not represented here — those are
//! absorbed internally (logged via `tracing` and treated as "no
//! collision" / "skip this constraint row") since surfacing them as
//! `Result` would force every call site in the step loop to carry error
//! handling for something the caller cannot act on mid-step.

use thiserror::Error;

use crate::object::BodyId;

/// Errors returned by the public API when a caller violates a
/// documented precondition.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// A constraint was attached between a body and itself.
    #[error("cannot attach a constraint between body {0:?} and itself")]
    SelfConstraint(BodyId),

    /// A polygon collider was constructed with fewer than 3 vertices.
    #[error("polygon collider needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    /// A pose, velocity, or collider parameter contained a NaN/infinite
    /// value at construction time.
    #[error("non-finite value supplied for {field}")]
    NonFinite {
        /// Name of the offending field, for diagnostics.
        field: &'static str,
    },

    /// A body id was not found in the world (e.g. a stale handle after
    /// removal).
    #[error("unknown body id {0:?}")]
    UnknownBody(BodyId),
}
