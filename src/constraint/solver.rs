//! Shared Jacobian / effective-mass solver primitives used by every
//! bilateral constraint and by the contact manifold solver.
//!
//! A constraint row is a `Vec6` Jacobian `J` stacked over both bodies'
//! linear and angular velocity (`[vA.x, vA.y, wA, vB.x, vB.y, wB]`); `M`
//! is the pair's diagonal inverse-mass matrix, also represented as a
//! `Vec6`. For an n-row constraint, effective mass is the n x n matrix
//! `(J M J^T)^-1`; rows are applied back to velocity as
//! `M * (sum_i J_i * lambda_i)`.

use crate::Real;
use crate::math::{Mat2, Mat3, Vec2, Vec3, Vec6};

/// Builds the diagonal inverse-mass matrix for a body pair, as a `Vec6`.
pub fn inverse_mass_matrix(inv_mass_a: Real, inv_moment_a: Real, inv_mass_b: Real, inv_moment_b: Real) -> Vec6 {
    Vec6::from_pair(
        Vec2::splat(inv_mass_a),
        inv_moment_a,
        Vec2::splat(inv_mass_b),
        inv_moment_b,
    )
}

/// Inverse effective mass for a single constraint row.
pub fn inverse_effective_mass_1(j: Vec6, m: Vec6) -> Real {
    1.0 / j.dot(m * j)
}

/// Inverse effective mass (as a 2x2 matrix) for a 2-row constraint.
pub fn inverse_effective_mass_2(j: [Vec6; 2], m: Vec6) -> Mat2 {
    let mj0 = m * j[0];
    let mj1 = m * j[1];
    Mat2 {
        a: j[0].dot(mj0),
        b: j[0].dot(mj1),
        c: j[1].dot(mj0),
        d: j[1].dot(mj1),
    }
    .invert()
}

/// Inverse effective mass (as a 3x3 matrix) for a 3-row constraint.
pub fn inverse_effective_mass_3(j: [Vec6; 3], m: Vec6) -> Mat3 {
    let mj = [m * j[0], m * j[1], m * j[2]];
    Mat3 {
        a: j[0].dot(mj[0]),
        b: j[0].dot(mj[1]),
        c: j[0].dot(mj[2]),
        d: j[1].dot(mj[0]),
        e: j[1].dot(mj[1]),
        f: j[1].dot(mj[2]),
        g: j[2].dot(mj[0]),
        h: j[2].dot(mj[1]),
        i: j[2].dot(mj[2]),
    }
    .invert()
}

/// Solves for the impulse magnitude of a single-row constraint:
/// `lambda = -(bias + J.V) / (J M J^T)`.
pub fn resolve_1(j: Vec6, m: Vec6, v: Vec6, bias: Real) -> Real {
    inverse_effective_mass_1(j, m) * -(bias + j.dot(v))
}

/// Solves for the impulse magnitudes of a 2-row constraint.
pub fn resolve_2(j: [Vec6; 2], m: Vec6, v: Vec6, bias: Vec2) -> Vec2 {
    let rhs = bias + Vec2::new(j[0].dot(v), j[1].dot(v));
    inverse_effective_mass_2(j, m).apply(-rhs)
}

/// Solves for the impulse magnitudes of a 3-row constraint.
pub fn resolve_3(j: [Vec6; 3], m: Vec6, v: Vec6, bias: Vec3) -> Vec3 {
    let rhs = bias + Vec3::new(j[0].dot(v), j[1].dot(v), j[2].dot(v));
    inverse_effective_mass_3(j, m).apply(-rhs)
}

/// Maps a single-row impulse back onto the velocity state: `M * (J * lambda)`.
pub fn apply_1(j: Vec6, m: Vec6, lambda: Real) -> Vec6 {
    m * (j * lambda)
}

/// Maps a 2-row impulse back onto the velocity state.
pub fn apply_2(j: [Vec6; 2], m: Vec6, lambda: Vec2) -> Vec6 {
    m * (j[0] * lambda.x + j[1] * lambda.y)
}

/// Maps a 3-row impulse back onto the velocity state.
pub fn apply_3(j: [Vec6; 3], m: Vec6, lambda: Vec3) -> Vec6 {
    m * (j[0] * lambda.x + j[1] * lambda.y + j[2] * lambda.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_round_trip_cancels_velocity_along_jacobian() {
        let j = Vec6::from_pair(Vec2::new(-1.0, 0.0), 0.0, Vec2::new(1.0, 0.0), 0.0);
        let m = inverse_mass_matrix(1.0, 1.0, 1.0, 1.0);
        let v = Vec6::from_pair(Vec2::new(0.0, 0.0), 0.0, Vec2::new(-2.0, 0.0), 0.0);
        let lambda = resolve_1(j, m, v, 0.0);
        let v2 = v + apply_1(j, m, lambda);
        assert!(j.dot(v2).abs() < 1e-4);
    }
}
