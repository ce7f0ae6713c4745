use std::ops::{Add, Index, IndexMut, Mul, Sub};

use crate::Real;
use crate::math::Vec2;

/// A 6-component vector: the stacked linear+angular velocity (or
/// impulse) state of a contact pair, `[vA.x, vA.y, wA, vB.x, vB.y, wB]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec6 {
    components: [Real; 6],
}

impl Vec6 {
    /// The zero vector.
    pub const ZERO: Vec6 = Vec6 { components: [0.0; 6] };

    /// Builds a Vec6 from the linear/angular velocity pair of two bodies.
    pub fn from_pair(va: Vec2, wa: Real, vb: Vec2, wb: Real) -> Self {
        Vec6 {
            components: [va.x, va.y, wa, vb.x, vb.y, wb],
        }
    }

    /// Splits back into the per-body linear/angular components.
    pub fn into_pair(self) -> (Vec2, Real, Vec2, Real) {
        let c = self.components;
        (Vec2::new(c[0], c[1]), c[2], Vec2::new(c[3], c[4]), c[5])
    }

    /// Dot product.
    pub fn dot(self, other: Vec6) -> Real {
        (0..6).map(|i| self[i] * other[i]).sum()
    }
}

impl Index<usize> for Vec6 {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        &self.components[i]
    }
}

impl IndexMut<usize> for Vec6 {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.components[i]
    }
}

impl Add for Vec6 {
    type Output = Vec6;
    fn add(self, other: Vec6) -> Vec6 {
        let mut out = self;
        for i in 0..6 {
            out[i] += other[i];
        }
        out
    }
}

impl Sub for Vec6 {
    type Output = Vec6;
    fn sub(self, other: Vec6) -> Vec6 {
        let mut out = self;
        for i in 0..6 {
            out[i] -= other[i];
        }
        out
    }
}

impl Mul<Real> for Vec6 {
    type Output = Vec6;
    fn mul(self, factor: Real) -> Vec6 {
        let mut out = self;
        for i in 0..6 {
            out[i] *= factor;
        }
        out
    }
}

impl Mul<Vec6> for Vec6 {
    type Output = Vec6;
    /// Componentwise product, used to apply a diagonal inverse-mass
    /// matrix (represented as a Vec6) to a Jacobian row.
    fn mul(self, other: Vec6) -> Vec6 {
        let mut out = self;
        for i in 0..6 {
            out[i] *= other[i];
        }
        out
    }
}
