//! Adapter that exposes a user `LossFunction` as an `argmin` problem.
//!
//! The loss is passed through unchanged as the Argmin cost. Analytic
//! gradients are validated and forwarded; when a gradient is not provided
//! the cost closure is finite-differenced (central first, forward as a
//! fallback).
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loss_optimizer::{
        finite_diff::run_fd_diff,
        traits::LossFunction,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user `LossFunction` to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LossFunction> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LossFunction> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LossFunction> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `L(θ)`, rejecting non-finite values with `NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: LossFunction> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇L(θ)`.
    ///
    /// Behavior:
    /// - If the user implements `grad`, validate it and return it.
    /// - On `GradientNotImplemented`, finite-difference the cost. The FD
    ///   closure must return `f64`, so the first evaluation error is parked
    ///   in `closure_err` and the closure yields `NaN`. A captured error or
    ///   a non-finite central gradient triggers one forward-difference retry.
    /// - Any other user error is propagated.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&cost_func);
                if closure_err.borrow().is_none() && validate_grad(&fd_grad, dim).is_ok() {
                    return Ok(fd_grad);
                }
                Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    struct Quadratic {
        analytic: bool,
    }

    impl LossFunction for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(theta.dot(theta))
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic { Ok(theta * 2.0) } else { Err(OptError::GradientNotImplemented) }
        }
    }

    #[test]
    // Purpose
    // -------
    // Check that the adapter does not flip signs and that the FD fallback
    // agrees with the analytic gradient.
    //
    // Given
    // -----
    // - L(θ) = θᵀθ at θ = (1, -2), with and without an analytic gradient.
    //
    // Expect
    // ------
    // - cost = 5; both gradients ≈ (2, -4).
    fn adapter_passes_loss_through_and_falls_back_to_finite_differences() {
        // Arrange
        let theta = array![1.0, -2.0];
        let analytic = Quadratic { analytic: true };
        let numeric = Quadratic { analytic: false };

        // Act
        let a = ArgMinAdapter::new(&analytic, &());
        let n = ArgMinAdapter::new(&numeric, &());
        let cost = a.cost(&theta).expect("cost");
        let ga = a.gradient(&theta).expect("analytic gradient");
        let gn = n.gradient(&theta).expect("fd gradient");

        // Assert
        assert_eq!(cost, 5.0);
        assert_eq!(ga, array![2.0, -4.0]);
        for (x, y) in ga.iter().zip(gn.iter()) {
            assert!((x - y).abs() < 1e-5, "fd {y} vs analytic {x}");
        }
    }
}
