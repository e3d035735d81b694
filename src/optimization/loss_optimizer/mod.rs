//! loss_optimizer — argmin-powered L-BFGS minimizer for training losses.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **minimizing
//! losses** `L(θ)`. Callers implement a single trait, [`LossFunction`], and
//! invoke [`minimize`] to run L-BFGS with a configurable line search,
//! tolerances, and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Expose `L(θ)` and `∇L(θ)` to Argmin via [`adapter::ArgMinAdapter`],
//!   finite-differencing the loss when no analytic gradient exists.
//! - [`minimize`] validates the initial guess with [`LossFunction::check`],
//!   selects a solver via [`builders`], runs it via [`run::run_lbfgs`] and
//!   normalizes the state into an [`OptimOutcome`].
//! - [`finite_diff`] offers validated finite-difference gradients and
//!   Hessians.
//!
//! Invariants & assumptions
//! ------------------------
//! - The loss is minimized as given; gradients are `∇L(θ)` with no sign
//!   conventions to track.
//! - [`LossFunction::value`] and [`LossFunction::grad`] report invalid
//!   inputs as recoverable [`OptError`] values, not panics.
//! - Configuration types are validated on construction.
//!
//! Downstream usage
//! ----------------
//! - `model::training` implements [`LossFunction`] for the classifier's
//!   flattened parameter vector and calls [`minimize`].
//! - `expansion::hessian` uses [`finite_diff::compute_hessian`] as the
//!   finite-difference Hessian strategy.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules cover adapter pass-through and FD
//!   fallback, builder wiring, validation, and full solves on quadratics.
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::minimize;
pub use self::traits::{LineSearcher, LossFunction, OptimOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{LineSearcher, LossFunction, OptimOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
