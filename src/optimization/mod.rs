//! optimization — training stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used to fit the classifier: an
//! Argmin-backed L-BFGS loss minimizer, shared numerical tolerances, and a
//! single error/result surface. Callers implement a loss, choose
//! tolerances, and obtain fitted parameters and diagnostics without
//! touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing losses** `L(θ)`
//!   (`loss_optimizer`), including solver and stopping-criteria setup.
//! - Supply shared numerical constants and guarded transforms
//!   (`numerical_stability`).
//! - Normalize configuration issues, numerical failures, model errors and
//!   backend solver errors into [`errors::OptError`] with the alias
//!   [`errors::OptResult`].
//!
//! Conventions
//! -----------
//! - Parameters, gradients and Hessians use the `ndarray` aliases in
//!   `loss_optimizer::types`.
//! - Public entry points return `OptResult<T>`; callers never see raw
//!   Argmin errors.
//! - Progress is reported through the `log` facade only; installing a
//!   logger is left to binaries and tests.
//!
//! Testing notes
//! -------------
//! - Submodule unit tests cover solver wiring, tolerance handling, finite
//!   differences and full solves on toy quadratics.

pub mod errors;
pub mod loss_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loss_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
