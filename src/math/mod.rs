//! Small, concrete 2D math types: [`Vec2`], [`Vec3`], [`Vec6`], and the
//! 2x2/3x3 matrices used by the constraint solver's effective-mass math.
//!
//! These are deliberately not generic over scalar type or dimension —
//! the solver code that consumes them is written directly in terms of
//! `Vec2`/`Vec6` rows, mirroring how the system being modeled lays out
//! its Jacobians.

mod mat2;
mod mat3;
mod vec2;
mod vec3;
mod vec6;

pub use self::mat2::Mat2;
pub use self::mat3::Mat3;
pub use self::vec2::Vec2;
pub use self::vec3::Vec3;
pub use self::vec6::Vec6;

/// Builds a 2D rotation matrix for the given angle, in radians.
pub fn rotation_matrix(angle: crate::Real) -> Mat2 {
    let (s, c) = angle.sin_cos();
    Mat2 {
        a: c,
        b: -s,
        c: s,
        d: c,
    }
}
