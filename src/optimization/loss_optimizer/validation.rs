//! Validation helpers for loss minimization.
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Gradient validation**: [`validate_grad`] enforces dimension and
//!   finiteness.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures the solver
//!   returned a finite best parameter vector.
//! - **Objective values**: [`validate_value`] rejects non-finite losses.
//! - **Hessians**: [`validate_hessian`] checks shape and finiteness.
use crate::optimization::{
    errors::{OptError, OptResult},
    loss_optimizer::types::{Grad, Hessian, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Validate and unwrap the best parameter vector reported by the solver.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta)
}

/// Validate that a scalar loss value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Validate the shape and entries of a Hessian matrix.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] if the matrix is not `dim × dim`.
/// - [`OptError::InvalidHessian`] for the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((row, col), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row, col, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    #[test]
    // Purpose
    // -------
    // Check that tolerance validation rejects zero, negative and non-finite
    // values while accepting `None`.
    //
    // Given
    // -----
    // - A selection of gradient and cost tolerances.
    //
    // Expect
    // ------
    // - `None` and positive finite values pass; everything else fails with
    //   the matching variant.
    fn tolerance_checks_reject_non_positive_and_non_finite_values() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_grad(Some(1e-8)).is_ok());
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(-1.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(
            verify_tol_cost(Some(f64::INFINITY)),
            Err(OptError::InvalidTolCost { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Ensure gradient and parameter validation report the first offending
    // index.
    //
    // Given
    // -----
    // - A gradient with a NaN at index 1 and a parameter vector with an
    //   infinity at index 2.
    //
    // Expect
    // ------
    // - `InvalidGradient { index: 1 }` and `InvalidThetaHat { index: 2 }`.
    fn validation_reports_first_non_finite_index() {
        // Arrange
        let grad = array![0.0, f64::NAN, f64::NAN];
        let theta = array![1.0, 2.0, f64::INFINITY];

        // Act
        let g_err = validate_grad(&grad, 3);
        let t_err = validate_theta_hat(Some(theta));

        // Assert
        assert!(matches!(g_err, Err(OptError::InvalidGradient { index: 1, .. })));
        assert!(matches!(t_err, Err(OptError::InvalidThetaHat { index: 2, .. })));
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_grad(&Array1::zeros(2), 3),
            Err(OptError::GradientDimMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify Hessian shape validation.
    //
    // Given
    // -----
    // - A 2 × 3 matrix validated against dimension 2.
    //
    // Expect
    // ------
    // - `HessianDimMismatch` with the observed shape.
    fn validate_hessian_rejects_non_square_matrices() {
        let h = Array2::<f64>::zeros((2, 3));
        assert_eq!(
            validate_hessian(&h, 2),
            Err(OptError::HessianDimMismatch { expected: 2, found: (2, 3) })
        );
    }
}
