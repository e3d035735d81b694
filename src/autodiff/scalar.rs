//! autodiff::scalar — the numeric interface shared by `f64` and dual numbers.
//!
//! Purpose
//! -------
//! Define the minimal scalar algebra the classifier and the expansion code
//! are written against, so the same forward/backward passes can run on
//! plain `f64` values and on (nested) dual numbers without duplication.
//!
//! Key behaviors
//! -------------
//! - [`Scalar`] bundles field arithmetic, scaling by an `f64` constant and
//!   the elementary functions the classifier needs (`exp`, `ln`, `tanh`,
//!   `sigmoid`, `softplus`, `relu`).
//! - [`Scalar::value`] exposes the primal `f64` of any scalar so that
//!   branching code (ReLU masks, log-sum-exp shifts) can inspect it without
//!   breaking differentiability.
//!
//! Invariants & assumptions
//! ------------------------
//! - `scale(c)` must be equivalent to `self * Self::from_f64(c)` but is
//!   expected to be cheaper; hot loops multiply by constants through it.
//! - Branches taken on `value()` are treated as locally constant; the
//!   derivative of `relu` at exactly zero is taken to be zero.
//!
//! Conventions
//! -----------
//! - Implementations never allocate; every `Scalar` is `Copy`.
//!
//! Testing notes
//! -------------
//! - `f64` behavior is checked here; dual-number behavior is checked in
//!   `autodiff::dual`.
use crate::optimization::numerical_stability::transformations::safe_softplus;
use num_traits::{One, Zero};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Scalar algebra used by every differentiable computation in the crate.
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Lift a constant.
    fn from_f64(value: f64) -> Self;

    /// Primal value with all tangent information dropped.
    fn value(&self) -> f64;

    /// Multiply by a constant.
    fn scale(self, c: f64) -> Self;

    fn exp(self) -> Self;

    fn ln(self) -> Self;

    fn tanh(self) -> Self;

    /// Logistic function `1 / (1 + exp(-x))`.
    fn sigmoid(self) -> Self {
        Self::one() / (Self::one() + (-self).exp())
    }

    /// `ln(1 + exp(x))`.
    fn softplus(self) -> Self {
        (Self::one() + self.exp()).ln()
    }

    fn relu(self) -> Self {
        if self.value() > 0.0 { self } else { Self::zero() }
    }
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn scale(self, c: f64) -> Self {
        self * c
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        f64::tanh(self)
    }

    #[inline]
    fn sigmoid(self) -> Self {
        if self >= 0.0 {
            1.0 / (1.0 + (-self).exp())
        } else {
            let e = self.exp();
            e / (1.0 + e)
        }
    }

    #[inline]
    fn softplus(self) -> Self {
        safe_softplus(self)
    }
}
