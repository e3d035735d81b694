//! Numerical stability utilities and shared tolerances.
//!
//! Provides the tolerance constants used by spectral diagnostics and
//! convergence checks, together with a guarded softplus that stays finite
//! far in the tails.
//!
//! # Provided items
//! - [`ZERO_EIGEN_THRESHOLD`]: magnitude below which a Hessian eigenvalue is
//!   treated as zero (default 1e-6).
//! - [`SYMMETRY_TOL`]: relative asymmetry allowed in a computed Hessian.
//! - [`IMAG_TOL`]: relative imaginary magnitude tolerated in the general
//!   spectrum before it is rejected.
//! - [`MIN_GAP_RATIO`]: smallest acceptable ratio between the selected
//!   non-degenerate and degenerate eigenvalue magnitudes.
//! - [`GENERAL_TOL`]: generic floor used to avoid division by zero.
//! - [`safe_softplus(x)`]: stable `ln(1 + exp(x))`.

/// Eigenvalues with `|λ| <= ZERO_EIGEN_THRESHOLD` belong to the null cluster.
pub const ZERO_EIGEN_THRESHOLD: f64 = 1e-6;

/// Maximum relative asymmetry `max|H - Hᵀ| / max(1, max|H|)` of a Hessian.
pub const SYMMETRY_TOL: f64 = 1e-4;

/// Maximum relative imaginary part `max|Im λ| / max(1, max|λ|)`.
pub const IMAG_TOL: f64 = 1e-6;

/// Minimum `|λ_non_degenerate| / |λ_degenerate|` for a usable spectral gap.
pub const MIN_GAP_RATIO: f64 = 1e2;

/// Floor for denominators in ratio computations.
pub const GENERAL_TOL: f64 = 1e-300;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// Computes softplus without overflow for large positive `x` and
/// with good precision for large negative `x`. This implementation
/// uses a simple piecewise guard:
///
/// - For sufficiently large `x`, `softplus(x) ≈ x + ln1p(exp(-x)) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
///
/// The cutoff used here (`x > 20.0`) is a practical threshold that
/// keeps the calculation in a well-conditioned regime for `f64`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}
