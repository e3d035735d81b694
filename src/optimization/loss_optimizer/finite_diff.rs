//! loss_optimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference gradients and Hessians around a parameter
//! vector, with validation and symmetry cleanup, so the rest of the crate
//! can request derivatives without depending on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient with error capture and
//!   post-hoc validation.
//! - [`compute_hessian`]: central-difference Hessian of a gradient function,
//!   falling back to forward differences when validation fails, then
//!   symmetrized in place.
//!
//! Invariants & assumptions
//! ------------------------
//! - Errors raised inside the objective during differencing are routed
//!   through the shared `closure_err` cell and treated as hard failures.
//! - Returned gradients and Hessians satisfy [`validate_grad`] and
//!   [`validate_hessian`].
//!
//! Downstream usage
//! ----------------
//! - `adapter::ArgMinAdapter` calls [`run_fd_diff`] when a loss has no
//!   analytic gradient.
//! - `expansion::hessian` calls [`compute_hessian`] to cross-check the
//!   forward-over-reverse block Hessian.
use crate::optimization::{
    errors::OptResult,
    loss_optimizer::{
        types::{Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient with error capture and validation.
///
/// Clears `closure_err`, differentiates `func`, and returns the captured
/// error if the closure reported one.
///
/// # Errors
/// - Any error captured from `func` (converted into `OptError`).
/// - `GradientDimMismatch` / `InvalidGradient` from [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Finite-difference Hessian of a gradient function, validated and
/// symmetrized.
///
/// Central differences are attempted first; a validation failure on the
/// central approximation triggers a forward-difference retry whose
/// validation result is surfaced.
///
/// # Errors
/// - `HessianDimMismatch` / `InvalidHessian` from [`validate_hessian`] on
///   the forward-difference path.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

/// Replace each off-diagonal pair with its average; the diagonal is kept.
pub(crate) fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use argmin::core::ArgminError;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradients with and without closure errors.
    // - Finite-difference Hessians on a non-separable quadratic.
    // - In-place symmetrization.
    //
    // They intentionally DO NOT cover:
    // - The exact block Hessian (see `expansion::hessian`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure that an error captured inside the FD closure is surfaced.
    //
    // Given
    // -----
    // - A closure that stores an `ArgminError` and returns NaN.
    //
    // Expect
    // ------
    // - `run_fd_diff` fails with the mapped `NotImplemented` variant.
    fn run_fd_diff_propagates_closure_error() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let err = run_fd_diff(&theta, &f, &closure_err).expect_err("closure error must surface");

        // Assert
        assert!(matches!(err, OptError::NotImplemented { .. }), "got {err:?}");
    }

    #[test]
    // Purpose
    // -------
    // Verify the finite-difference Hessian of a coupled quadratic.
    //
    // Given
    // -----
    // - f(x, y) = x² + 3xy + 2y², gradient (2x + 3y, 3x + 4y).
    //
    // Expect
    // ------
    // - H ≈ [[2, 3], [3, 4]] and exactly symmetric.
    fn compute_hessian_recovers_coupled_quadratic() {
        // Arrange
        let theta = array![0.3, -0.7];
        let grad_fn = |t: &Theta| array![2.0 * t[0] + 3.0 * t[1], 3.0 * t[0] + 4.0 * t[1]];

        // Act
        let h = compute_hessian(&grad_fn, &theta).expect("finite Hessian");

        // Assert
        let expected = array![[2.0, 3.0], [3.0, 4.0]];
        for (a, b) in h.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
        assert_eq!(h[[0, 1]], h[[1, 0]]);
    }

    #[test]
    // Purpose
    // -------
    // Check that non-finite gradients produce `InvalidHessian`.
    //
    // Given
    // -----
    // - A gradient function that always returns NaN.
    //
    // Expect
    // ------
    // - `compute_hessian` fails with `InvalidHessian`.
    fn compute_hessian_rejects_non_finite_entries() {
        let theta: Theta = Array1::from(vec![0.0_f64]);
        let grad_fn = |_: &Theta| Array1::from(vec![f64::NAN]);
        assert!(matches!(
            compute_hessian(&grad_fn, &theta),
            Err(OptError::InvalidHessian { .. })
        ));
    }

    #[test]
    fn symmetrize_hess_averages_off_diagonal_pairs() {
        let mut h: Hessian = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 0.0, 3.0]).unwrap();
        symmetrize_hess(&mut h);
        assert_eq!(h, array![[1.0, 1.0], [1.0, 3.0]]);
    }
}
