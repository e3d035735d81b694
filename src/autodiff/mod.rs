//! autodiff — nested forward-mode differentiation for small coordinate spaces.
//!
//! Purpose
//! -------
//! Supply the differentiation primitives the expansion pipeline is built on:
//! a [`Scalar`] abstraction shared by `f64` and dual numbers, a nestable
//! [`Dual`] type, a forward-mode [`jacobian`], and [`derivative_tensors`],
//! which records four nested differentiation levels in a single evaluation.
//!
//! Key behaviors
//! -------------
//! - Code written once against [`Scalar`] runs on `f64` for plain values, on
//!   `Dual<f64, 1>` for Jacobian columns, and on four nested
//!   `Dual<_, 2>` levels for order-4 tensors in two coordinates.
//! - Gradients with respect to large parameter blocks are *not* computed here;
//!   the model layer provides an analytic reverse pass that is itself generic
//!   over [`Scalar`], so `jacobian` of that gradient is an exact
//!   forward-over-reverse Hessian.
//!
//! Invariants & assumptions
//! ------------------------
//! - Nesting order is fixed: the innermost level is seeded first and is the
//!   first derivative taken; outer levels differentiate everything recorded
//!   inside them, including the inner tangents.
//! - The supported elementary functions are those in [`Scalar`]; adding an
//!   activation means adding its derivative rule to [`Dual`].
//!
//! Downstream usage
//! ----------------
//! - `model` writes losses and gradients against [`Scalar`].
//! - `expansion::hessian` calls [`jacobian`]; `expansion::taylor` calls
//!   [`derivative_tensors`] through [`ScalarFn`].
//!
//! Testing notes
//! -------------
//! - Each submodule tests against closed-form derivatives.

pub mod derivatives;
pub mod dual;
pub mod errors;
pub mod scalar;

pub use self::derivatives::{DerivativeTensors, ScalarFn, derivative_tensors, jacobian};
pub use self::dual::Dual;
pub use self::errors::{AutodiffError, AutodiffResult};
pub use self::scalar::Scalar;

pub mod prelude {
    pub use super::derivatives::{DerivativeTensors, ScalarFn, derivative_tensors, jacobian};
    pub use super::dual::Dual;
    pub use super::errors::{AutodiffError, AutodiffResult};
    pub use super::scalar::Scalar;
}
