//! Unified error handling for the expansion steps.
//!
//! `ExpansionError` covers the Hessian extractor, the spectral
//! diagnostician, the reparametrization and the tensor contractions. The
//! failure modes that would otherwise let a meaningless expansion through
//! (no spectral gap, asymmetric Hessian, complex spectrum, shape mismatch)
//! are explicit variants. Lower-layer errors are wrapped.
use crate::autodiff::AutodiffError;
use crate::model::ModelError;
use crate::optimization::errors::OptError;

pub type ExpansionResult<T> = Result<T, ExpansionError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpansionError {
    // ---- Hessian ----
    /// Matrix handed to the spectral step is not square.
    NotSquare { rows: usize, cols: usize },

    /// Relative asymmetry `max|H − Hᵀ| / max(1, max|H|)` above tolerance.
    AsymmetricHessian { error: f64, tol: f64 },

    // ---- Spectrum ----
    /// Discarded imaginary parts exceed tolerance.
    ComplexSpectrum { max_imag: f64, tol: f64 },

    /// The Schur or symmetric QR iteration did not converge within its
    /// iteration limit.
    EigenDecompositionFailed,

    /// An eigenvalue or eigenvector entry at sorted position `index` is NaN
    /// or infinite.
    NonFiniteEigenpair { index: usize, value: f64 },

    /// Every eigenvalue exceeds the zero threshold.
    NoDegenerateDirection { threshold: f64, smallest: f64 },

    /// No eigenvalue exceeds the threshold, or the offset runs past the end.
    NoNonDegenerateDirection { threshold: f64, position: usize, dim: usize },

    /// `|λ_non_degenerate| / |λ_degenerate|` is below the required ratio.
    SpectralGapAbsent { degenerate: f64, non_degenerate: f64, ratio: f64, min_ratio: f64 },

    // ---- Reparametrization ----
    /// `g(0)` differs from the loss at the expansion point.
    ReparametrizationMismatch { gap: f64, tol: f64 },

    // ---- Shapes & options ----
    /// Tensor or block shape does not match what the operation needs.
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },

    /// Numeric option outside its valid range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    // ---- Wrapped ----
    Model(ModelError),
    Optimization(OptError),
    Autodiff(AutodiffError),
}

impl std::error::Error for ExpansionError {}

impl std::fmt::Display for ExpansionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Hessian ----
            ExpansionError::NotSquare { rows, cols } => {
                write!(f, "Expansion Error: Hessian is {rows}x{cols}, expected a square matrix")
            }
            ExpansionError::AsymmetricHessian { error, tol } => write!(
                f,
                "Expansion Error: Hessian relative asymmetry {error:.3e} exceeds {tol:.3e}"
            ),

            // ---- Spectrum ----
            ExpansionError::ComplexSpectrum { max_imag, tol } => write!(
                f,
                "Expansion Error: Imaginary eigenvalue part {max_imag:.3e} exceeds {tol:.3e}"
            ),
            ExpansionError::EigenDecompositionFailed => {
                write!(f, "Expansion Error: Eigendecomposition did not converge")
            }
            ExpansionError::NonFiniteEigenpair { index, value } => write!(
                f,
                "Expansion Error: Non-finite eigenpair at sorted position {index} (value {value})"
            ),
            ExpansionError::NoDegenerateDirection { threshold, smallest } => write!(
                f,
                "Expansion Error: No eigenvalue below {threshold:.1e} \
                 (smallest |λ| = {smallest:.3e})"
            ),
            ExpansionError::NoNonDegenerateDirection { threshold, position, dim } => write!(
                f,
                "Expansion Error: No non-degenerate direction above {threshold:.1e} \
                 at sorted position {position} of {dim}"
            ),
            ExpansionError::SpectralGapAbsent { degenerate, non_degenerate, ratio, min_ratio } => {
                write!(
                    f,
                    "Expansion Error: Spectral gap absent: |{non_degenerate:.3e}| / \
                     |{degenerate:.3e}| = {ratio:.3e} < {min_ratio:.1e}"
                )
            }

            // ---- Reparametrization ----
            ExpansionError::ReparametrizationMismatch { gap, tol } => write!(
                f,
                "Expansion Error: Reparametrized loss at the origin is off by {gap:.3e} \
                 (tol {tol:.1e})"
            ),

            // ---- Shapes & options ----
            ExpansionError::ShapeMismatch { expected, found } => {
                write!(f, "Expansion Error: Shape mismatch: expected {expected:?}, found {found:?}")
            }
            ExpansionError::InvalidOption { name, value, reason } => {
                write!(f, "Expansion Error: Invalid option {name} = {value}: {reason}")
            }

            // ---- Wrapped ----
            ExpansionError::Model(err) => write!(f, "Expansion Error: {err}"),
            ExpansionError::Optimization(err) => write!(f, "Expansion Error: {err}"),
            ExpansionError::Autodiff(err) => write!(f, "Expansion Error: {err}"),
        }
    }
}

impl From<ModelError> for ExpansionError {
    fn from(err: ModelError) -> Self {
        ExpansionError::Model(err)
    }
}

impl From<OptError> for ExpansionError {
    fn from(err: OptError) -> Self {
        ExpansionError::Optimization(err)
    }
}

impl From<AutodiffError> for ExpansionError {
    fn from(err: AutodiffError) -> Self {
        ExpansionError::Autodiff(err)
    }
}
