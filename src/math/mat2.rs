use crate::Real;
use crate::math::Vec2;

/// A row-major 2x2 matrix `[[a, b], [c, d]]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Mat2 {
    /// Row 0, column 0.
    pub a: Real,
    /// Row 0, column 1.
    pub b: Real,
    /// Row 1, column 0.
    pub c: Real,
    /// Row 1, column 1.
    pub d: Real,
}

impl Mat2 {
    /// Determinant.
    pub fn det(self) -> Real {
        self.a * self.d - self.b * self.c
    }

    /// Matrix inverse. Returns a matrix full of NaNs for a singular input;
    /// callers in the solver treat that as "drop this constraint row" and
    /// never propagate it further (see the crate's error-handling policy).
    pub fn invert(self) -> Mat2 {
        let det = self.det();
        Mat2 {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
        }
    }

    /// Solves `self * x = (x0, y0)` for `x`, using partial pivoting
    /// (swapping rows when the pivot on the diagonal is smaller in
    /// magnitude than the other row's leading entry).
    pub fn solve(self, x0: Real, y0: Real) -> Vec2 {
        if self.a.abs() < self.c.abs() {
            let swapped = Mat2 {
                a: self.c,
                b: self.d,
                c: self.a,
                d: self.b,
            };
            return swapped.solve(y0, x0);
        }
        let alpha = self.c / self.a;
        let beta = self.d - self.b * alpha;
        if beta == 0.0 {
            return Vec2::ZERO;
        }
        let gamma = y0 - x0 * alpha;
        let res_y = gamma / beta;
        Vec2::new((x0 - self.b * res_y) / self.a, res_y)
    }

    /// Solves `self * x = rhs` for `x`.
    pub fn solve_vec(self, rhs: Vec2) -> Vec2 {
        self.solve(rhs.x, rhs.y)
    }

    /// Applies the matrix to a vector: `self * vec`.
    pub fn apply(self, vec: Vec2) -> Vec2 {
        Vec2::new(
            self.a * vec.x + self.b * vec.y,
            self.c * vec.x + self.d * vec.y,
        )
    }

    /// Applies the transpose of the matrix to a vector: `vec * self`.
    pub fn apply_transposed(self, vec: Vec2) -> Vec2 {
        Vec2::new(
            self.a * vec.x + self.c * vec.y,
            self.b * vec.x + self.d * vec.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_identity() {
        let m = Mat2 { a: 1.0, b: 0.0, c: 0.0, d: 1.0 };
        let inv = m.invert();
        assert_eq!(inv, m);
    }

    #[test]
    fn solve_matches_apply() {
        let m = Mat2 { a: 2.0, b: 1.0, c: 0.0, d: 3.0 };
        let x = Vec2::new(1.0, 2.0);
        let rhs = m.apply(x);
        let solved = m.solve_vec(rhs);
        assert!((solved.x - x.x).abs() < 1e-5);
        assert!((solved.y - x.y).abs() < 1e-5);
    }

    #[test]
    fn solve_pivots_when_a_small() {
        let m = Mat2 { a: 0.0, b: 1.0, c: 1.0, d: 1.0 };
        let x = Vec2::new(1.0, 2.0);
        let rhs = m.apply(x);
        let solved = m.solve_vec(rhs);
        assert!((solved.x - x.x).abs() < 1e-5);
        assert!((solved.y - x.y).abs() < 1e-5);
    }
}
