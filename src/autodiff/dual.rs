//! autodiff::dual — nestable multi-tangent dual numbers.
//!
//! Purpose
//! -------
//! Provide forward-mode automatic differentiation through the dual number
//! `Dual<T, N> = re + Σ_k eps[k]·ε_k` with `ε_j ε_k = 0`. The component type
//! `T` is itself any [`Scalar`], so duals nest: `Dual<Dual<f64, 2>, 2>`
//! carries second derivatives, and four levels carry fourth derivatives.
//!
//! Key behaviors
//! -------------
//! - Arithmetic, scaling and the elementary functions of [`Scalar`] are
//!   propagated by the chain rule, with the derivative evaluated in the
//!   component type so that inner tangents are differentiated as well.
//! - [`Dual::variable`] seeds coordinate `k` at one nesting level;
//!   [`Dual::constant`] lifts a component value with zero tangents.
//!
//! Invariants & assumptions
//! ------------------------
//! - `N` is the number of independent coordinates differentiated at this
//!   nesting level. Each level of a nested dual must be seeded separately.
//! - Tangents of constants are exactly zero; no sparsity is tracked.
//!
//! Conventions
//! -----------
//! - For `r: Dual<T, N>`, `r.re` is the function value (with the inner
//!   levels' tangents) and `r.eps[k]` is `∂r/∂x_k` (with the inner levels'
//!   tangents).
//!
//! Testing notes
//! -------------
//! - Unit tests compare first and nested second derivatives with closed
//!   forms for polynomials, `exp`, `ln` and `tanh`.
use crate::autodiff::scalar::Scalar;
use num_traits::{One, Zero};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Dual number with `N` tangent directions over the component scalar `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual<T, const N: usize> {
    /// Primal part.
    pub re: T,
    /// Tangent part, one entry per coordinate.
    pub eps: [T; N],
}

impl<T: Scalar, const N: usize> Dual<T, N> {
    pub fn new(re: T, eps: [T; N]) -> Self {
        Self { re, eps }
    }

    /// Lift `re` with zero tangents.
    pub fn constant(re: T) -> Self {
        Self { re, eps: [T::zero(); N] }
    }

    /// Seed `re` as coordinate `k` at this nesting level.
    ///
    /// Panics if `k >= N`.
    pub fn variable(re: T, k: usize) -> Self {
        let mut eps = [T::zero(); N];
        eps[k] = T::one();
        Self { re, eps }
    }

    /// Apply a unary function with value `f` and derivative `df` at `re`.
    #[inline]
    fn chain(self, f: T, df: T) -> Self {
        let mut eps = self.eps;
        for e in eps.iter_mut() {
            *e = *e * df;
        }
        Self { re: f, eps }
    }
}

impl<T: Scalar, const N: usize> Add for Dual<T, N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut eps = self.eps;
        for (e, r) in eps.iter_mut().zip(rhs.eps.iter()) {
            *e = *e + *r;
        }
        Self { re: self.re + rhs.re, eps }
    }
}

impl<T: Scalar, const N: usize> Sub for Dual<T, N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut eps = self.eps;
        for (e, r) in eps.iter_mut().zip(rhs.eps.iter()) {
            *e = *e - *r;
        }
        Self { re: self.re - rhs.re, eps }
    }
}

impl<T: Scalar, const N: usize> Mul for Dual<T, N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut eps = self.eps;
        for (e, r) in eps.iter_mut().zip(rhs.eps.iter()) {
            *e = *e * rhs.re + self.re * *r;
        }
        Self { re: self.re * rhs.re, eps }
    }
}

impl<T: Scalar, const N: usize> Div for Dual<T, N> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = T::one() / rhs.re;
        let re = self.re * inv;
        let mut eps = self.eps;
        for (e, r) in eps.iter_mut().zip(rhs.eps.iter()) {
            *e = (*e - re * *r) * inv;
        }
        Self { re, eps }
    }
}

impl<T: Scalar, const N: usize> Neg for Dual<T, N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        let mut eps = self.eps;
        for e in eps.iter_mut() {
            *e = -*e;
        }
        Self { re: -self.re, eps }
    }
}

impl<T: Scalar, const N: usize> Zero for Dual<T, N> {
    fn zero() -> Self {
        Self::constant(T::zero())
    }

    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.eps.iter().all(|e| e.is_zero())
    }
}

impl<T: Scalar, const N: usize> One for Dual<T, N> {
    fn one() -> Self {
        Self::constant(T::one())
    }
}

impl<T: Scalar, const N: usize> Scalar for Dual<T, N> {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self::constant(T::from_f64(value))
    }

    #[inline]
    fn value(&self) -> f64 {
        self.re.value()
    }

    #[inline]
    fn scale(self, c: f64) -> Self {
        let mut eps = self.eps;
        for e in eps.iter_mut() {
            *e = e.scale(c);
        }
        Self { re: self.re.scale(c), eps }
    }

    #[inline]
    fn exp(self) -> Self {
        let e = self.re.exp();
        self.chain(e, e)
    }

    #[inline]
    fn ln(self) -> Self {
        let df = T::one() / self.re;
        self.chain(self.re.ln(), df)
    }

    #[inline]
    fn tanh(self) -> Self {
        let t = self.re.tanh();
        self.chain(t, T::one() - t * t)
    }

    #[inline]
    fn sigmoid(self) -> Self {
        let s = self.re.sigmoid();
        self.chain(s, s * (T::one() - s))
    }

    #[inline]
    fn softplus(self) -> Self {
        let df = self.re.sigmoid();
        self.chain(self.re.softplus(), df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type D1 = Dual<f64, 1>;
    type D2 = Dual<D1, 1>;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - First derivatives of arithmetic and elementary functions.
    // - Second derivatives obtained by nesting one dual inside another.
    //
    // They intentionally DO NOT cover:
    // - Higher-order tensor extraction (see `autodiff::derivatives`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check the product and quotient rules with two coordinates.
    //
    // Given
    // -----
    // - f(x, y) = x·y / (x + y) at (2, 3).
    //
    // Expect
    // ------
    // - f = 6/5, ∂f/∂x = y²/(x+y)² = 9/25, ∂f/∂y = x²/(x+y)² = 4/25.
    fn product_and_quotient_rules_match_closed_form() {
        // Arrange
        let x = Dual::<f64, 2>::variable(2.0, 0);
        let y = Dual::<f64, 2>::variable(3.0, 1);

        // Act
        let f = x * y / (x + y);

        // Assert
        assert!((f.re - 1.2).abs() < 1e-14);
        assert!((f.eps[0] - 9.0 / 25.0).abs() < 1e-14);
        assert!((f.eps[1] - 4.0 / 25.0).abs() < 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Verify that elementary functions propagate first derivatives.
    //
    // Given
    // -----
    // - x = 0.7 seeded as a single variable.
    //
    // Expect
    // ------
    // - d/dx exp = exp, d/dx ln = 1/x, d/dx tanh = 1 - tanh², d/dx softplus =
    //   sigmoid.
    fn elementary_functions_propagate_first_derivatives() {
        // Arrange
        let x0 = 0.7_f64;
        let x = D1::variable(x0, 0);

        // Act
        let e = x.exp();
        let l = x.ln();
        let t = x.tanh();
        let sp = x.softplus();

        // Assert
        assert!((e.eps[0] - x0.exp()).abs() < 1e-14);
        assert!((l.eps[0] - 1.0 / x0).abs() < 1e-14);
        assert!((t.eps[0] - (1.0 - x0.tanh().powi(2))).abs() < 1e-14);
        assert!((sp.eps[0] - Scalar::sigmoid(x0)).abs() < 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Confirm that nesting one dual inside another yields second derivatives.
    //
    // Given
    // -----
    // - f(x) = x³ · exp(x) at x = 0.5, with both levels seeded on x.
    //
    // Expect
    // ------
    // - eps.eps equals f''(x) = (x³ + 6x² + 6x) exp(x).
    fn nested_duals_produce_second_derivatives() {
        // Arrange
        let x0 = 0.5_f64;
        let x = D2::variable(D1::variable(x0, 0), 0);

        // Act
        let f = x * x * x * x.exp();

        // Assert
        let expected = (x0.powi(3) + 6.0 * x0.powi(2) + 6.0 * x0) * x0.exp();
        assert!((f.eps[0].eps[0] - expected).abs() < 1e-12);
        assert!((f.re.eps[0] - f.eps[0].re).abs() < 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Check that constant scaling matches multiplication by a lifted constant.
    //
    // Given
    // -----
    // - A nested dual variable and the constant 2.5.
    //
    // Expect
    // ------
    // - `scale(2.5)` and `* from_f64(2.5)` agree at every level.
    fn scale_matches_multiplication_by_lifted_constant() {
        // Arrange
        let x = D2::variable(D1::variable(1.3, 0), 0).tanh();

        // Act
        let a = x.scale(2.5);
        let b = x * D2::from_f64(2.5);

        // Assert
        assert_eq!(a, b);
    }
}
