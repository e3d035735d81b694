//! Expansion — local structure of the loss around a trained minimum.
//!
//! This module takes a [`BlockObjective`](crate::model::BlockObjective) at
//! its expansion point and produces the quantities that classify the
//! minimum along a degenerate direction:
//!
//! - [`hessian`]: block Hessian, exact (forward-over-reverse) or by finite
//!   differences, plus symmetry diagnostics.
//! - [`spectrum`]: checked eigendecomposition, zero-threshold split,
//!   degenerate / non-degenerate direction selection and the eigenvalue
//!   histogram.
//! - [`reparam`]: the two-coordinate model `g(t) = L(W* + t₀·e + t₁·f)`.
//! - [`taylor`]: contraction of the order-2/3/4 tensors of `g` into
//!   `c2`, `c3`, `c4`.
//! - [`errors`]: [`ExpansionError`] and [`ExpansionResult`].
//!
//! [`ExpansionOptions`] bundles the Hessian method and the spectral
//! thresholds used by `pipeline::expand`.
pub mod errors;
pub mod hessian;
pub mod reparam;
pub mod spectrum;
pub mod taylor;

pub use self::errors::{ExpansionError, ExpansionResult};
pub use self::hessian::{HessianMethod, block_hessian};
pub use self::reparam::DirectionalModel;
pub use self::spectrum::{DirectionPair, SpectralOptions, Spectrum};
pub use self::taylor::{TaylorCoefficients, taylor_coefficients};

/// Options for the expansion stage.
///
/// Default: exact Hessian, default [`SpectralOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExpansionOptions {
    pub hessian_method: HessianMethod,
    pub spectral: SpectralOptions,
}

pub mod prelude {
    pub use super::errors::{ExpansionError, ExpansionResult};
    pub use super::hessian::{HessianMethod, block_hessian, symmetry_error};
    pub use super::reparam::DirectionalModel;
    pub use super::spectrum::{
        Direction, DirectionPair, EigenHistogram, SpectralOptions, Spectrum, eigenvalue_histogram,
        render_histogram,
    };
    pub use super::taylor::{
        ContractionKernel, TaylorCoefficients, contract, taylor_coefficients, taylor_polynomial,
    };
    pub use super::ExpansionOptions;
}
