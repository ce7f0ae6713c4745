use crate::Real;
use crate::math::Vec3;

/// A row-major 3x3 matrix, used for the 3-row (fixed-constraint)
/// effective-mass solve.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Mat3 {
    /// Row 0.
    pub a: Real,
    /// Row 0.
    pub b: Real,
    /// Row 0.
    pub c: Real,
    /// Row 1.
    pub d: Real,
    /// Row 1.
    pub e: Real,
    /// Row 1.
    pub f: Real,
    /// Row 2.
    pub g: Real,
    /// Row 2.
    pub h: Real,
    /// Row 2.
    pub i: Real,
}

impl Mat3 {
    /// Inverse via cofactor expansion.
    pub fn invert(self) -> Mat3 {
        let a0 = self.e * self.i - self.f * self.h;
        let b0 = -(self.d * self.i - self.f * self.g);
        let c0 = self.d * self.h - self.e * self.g;
        let d0 = -(self.b * self.i - self.c * self.h);
        let e0 = self.a * self.i - self.c * self.g;
        let f0 = -(self.a * self.h - self.b * self.g);
        let g0 = self.b * self.f - self.c * self.e;
        let h0 = -(self.a * self.f - self.c * self.d);
        let i0 = self.a * self.e - self.b * self.d;

        let det = self.a * a0 + self.b * b0 + self.c * c0;

        Mat3 {
            a: a0 / det,
            b: d0 / det,
            c: g0 / det,
            d: b0 / det,
            e: e0 / det,
            f: h0 / det,
            g: c0 / det,
            h: f0 / det,
            i: i0 / det,
        }
    }

    /// Applies the matrix to a vector.
    pub fn apply(self, vec: Vec3) -> Vec3 {
        Vec3::new(
            self.a * vec.x + self.b * vec.y + self.c * vec.z,
            self.d * vec.x + self.e * vec.y + self.f * vec.z,
            self.g * vec.x + self.h * vec.y + self.i * vec.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_identity() {
        let m = Mat3 {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
            g: 0.0,
            h: 0.0,
            i: 1.0,
        };
        assert_eq!(m.invert(), m);
    }
}
