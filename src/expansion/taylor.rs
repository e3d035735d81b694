//! expansion::taylor — Taylor coefficients from derivative tensors.
//!
//! Purpose
//! -------
//! Turn the order-2/3/4 derivative tensors of `g(t₀, t₁)` at the origin
//! into the three scalars that classify the degenerate minimum:
//!
//! ```text
//! c2 = 1/2  · T2 : (e ⊗ e)
//! c3 = 1/2  · T3 : (e ⊗ f ⊗ f)
//! c4 = 1/24 · T4 : (f ⊗ f ⊗ f ⊗ f)
//! ```
//!
//! with `e` the non-degenerate axis and `f` the degenerate axis (coordinates
//! `NON_DEGENERATE_AXIS` and `DEGENERATE_AXIS` of `expansion::reparam`).
//!
//! Key behaviors
//! -------------
//! - [`contract`] is the full contraction `Σ T[i…] · K[i…]` against the
//!   outer product `K` of a [`ContractionKernel`]'s basis vectors, scaled by
//!   the kernel's normalization.
//! - [`taylor_polynomial`] evaluates the complete fourth-order Taylor
//!   polynomial of `g`, used to check the tensors against direct
//!   evaluations.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tensors have shape `[2; k]` for order `k`; anything else is a
//!   [`ExpansionError::ShapeMismatch`].
//! - Coefficients are not rescaled by the eigenvalues or the norms of the
//!   directions (the directions are unit eigenvectors).
pub use crate::autodiff::DerivativeTensors;

use crate::expansion::errors::{ExpansionError, ExpansionResult};
use ndarray::{ArrayD, IxDyn};

/// Unit vector along the non-degenerate coordinate.
pub const AXIS_E: [f64; 2] = [1.0, 0.0];
/// Unit vector along the degenerate coordinate.
pub const AXIS_F: [f64; 2] = [0.0, 1.0];

/// Basis vectors and normalization of one contraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractionKernel {
    pub basis: Vec<[f64; 2]>,
    pub normalization: f64,
}

impl ContractionKernel {
    pub fn new(basis: Vec<[f64; 2]>, normalization: f64) -> Self {
        Self { basis, normalization }
    }

    /// `1/2 · (e ⊗ e)`.
    pub fn order2() -> Self {
        Self::new(vec![AXIS_E, AXIS_E], 0.5)
    }

    /// `1/2 · (e ⊗ f ⊗ f)`.
    pub fn order3() -> Self {
        Self::new(vec![AXIS_E, AXIS_F, AXIS_F], 0.5)
    }

    /// `1/24 · (f ⊗ f ⊗ f ⊗ f)`.
    pub fn order4() -> Self {
        Self::new(vec![AXIS_F; 4], 1.0 / 24.0)
    }

    pub fn rank(&self) -> usize {
        self.basis.len()
    }

    /// Outer product of the basis vectors.
    pub fn tensor(&self) -> ArrayD<f64> {
        let shape = vec![2; self.rank()];
        ArrayD::from_shape_fn(IxDyn(&shape), |ix| {
            self.basis.iter().enumerate().map(|(k, b)| b[ix[k]]).product()
        })
    }
}

/// `normalization · Σ tensor ⊙ kernel.tensor()`.
///
/// # Errors
/// - [`ExpansionError::ShapeMismatch`] unless `tensor` has shape `[2; rank]`.
pub fn contract(tensor: &ArrayD<f64>, kernel: &ContractionKernel) -> ExpansionResult<f64> {
    let expected = vec![2; kernel.rank()];
    if tensor.shape() != expected.as_slice() {
        return Err(ExpansionError::ShapeMismatch { expected, found: tensor.shape().to_vec() });
    }
    let k = kernel.tensor();
    let sum: f64 = tensor.iter().zip(k.iter()).map(|(a, b)| a * b).sum();
    Ok(kernel.normalization * sum)
}

/// The three expansion coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaylorCoefficients {
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
}

/// Contract the order-2/3/4 tensors with their kernels.
pub fn taylor_coefficients(tensors: &DerivativeTensors) -> ExpansionResult<TaylorCoefficients> {
    Ok(TaylorCoefficients {
        c2: contract(&tensors.t2, &ContractionKernel::order2())?,
        c3: contract(&tensors.t3, &ContractionKernel::order3())?,
        c4: contract(&tensors.t4, &ContractionKernel::order4())?,
    })
}

/// Fourth-order Taylor polynomial of `g` around the origin, at `t`.
///
/// `g(0) + Σ_k 1/k! · T_k : t^{⊗k}` for `k = 1..4`.
pub fn taylor_polynomial(tensors: &DerivativeTensors, t: [f64; 2]) -> ExpansionResult<f64> {
    let grad = tensors.gradient.clone().into_dyn();
    let mut total = tensors.value;
    let mut factorial = 1.0;
    for (k, tensor) in [&grad, &tensors.t2, &tensors.t3, &tensors.t4].into_iter().enumerate() {
        let order = k + 1;
        factorial *= order as f64;
        total += contract(tensor, &ContractionKernel::new(vec![t; order], 1.0 / factorial))?;
    }
    Ok(total)
}
