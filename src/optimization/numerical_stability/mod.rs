//! numerical_stability — shared tolerances and overflow-safe transforms.
//!
//! Purpose
//! -------
//! Centralize the small numeric constants that decide what counts as
//! "zero", "symmetric" or "real" across the crate, and host the guarded
//! scalar transforms used by the classifier's activations.
//!
//! Key behaviors
//! -------------
//! - Export default thresholds for the spectral diagnostician
//!   (`ZERO_EIGEN_THRESHOLD`, `MIN_GAP_RATIO`, `SYMMETRY_TOL`, `IMAG_TOL`).
//! - Provide `safe_softplus`, used by the `f64` implementation of the
//!   softplus activation.
//!
//! Conventions
//! -----------
//! - Constants are defaults only; `expansion::spectrum::SpectralOptions`
//!   lets callers override every threshold per run.

pub mod transformations;

pub mod prelude {
    pub use super::transformations::{
        GENERAL_TOL, IMAG_TOL, MIN_GAP_RATIO, SYMMETRY_TOL, ZERO_EIGEN_THRESHOLD, safe_softplus,
    };
}
