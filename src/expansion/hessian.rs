//! expansion::hessian — Hessian of the loss restricted to one block.
//!
//! Purpose
//! -------
//! Compute `H[i, j] = ∂²L / ∂W_i ∂W_j` for the flattened target block `W`
//! at the expansion point, with every other parameter frozen.
//!
//! Key behaviors
//! -------------
//! - [`HessianMethod::Exact`]: forward-over-reverse. The block gradient
//!   (reverse pass of [`BlockObjective::loss_and_gradient`]) is evaluated on
//!   `Dual<f64, 1>` blocks by [`jacobian`], one pass per block entry, giving
//!   one Hessian column per pass. Exact to floating-point precision.
//! - [`HessianMethod::FiniteDifference`]: central differences of the `f64`
//!   block gradient via `optimization::loss_optimizer::finite_diff`, kept as
//!   a cross-check path.
//! - [`symmetry_error`] measures relative asymmetry; [`symmetrize`] averages
//!   `H` with its transpose.
//!
//! Invariants & assumptions
//! ------------------------
//! - Blocks flatten row-major: entry `(r, c)` of an `(m × n)` block is
//!   coordinate `r·n + c`.
//! - The exact Hessian is returned as computed; it is not symmetrized here,
//!   so the spectral step can check its asymmetry.
//! - The finite-difference Hessian is symmetrized by the helper it uses.
//!
//! Conventions
//! -----------
//! - [`fill_dmatrix`] copies an `ndarray` Hessian into `nalgebra` for the
//!   eigen routines.
use crate::autodiff::{Dual, jacobian};
use crate::expansion::errors::{ExpansionError, ExpansionResult};
use crate::model::{BlockObjective, ModelError};
use crate::optimization::loss_optimizer::{
    finite_diff::compute_hessian,
    types::{Hessian, Theta},
    validation::validate_hessian,
};
use log::debug;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use std::cell::RefCell;

/// How to compute the block Hessian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HessianMethod {
    #[default]
    Exact,
    FiniteDifference,
}

/// Hessian of `obj` with respect to its block at [`BlockObjective::base_block`].
///
/// # Errors
/// - Model errors from evaluating the objective.
/// - `Optimization(HessianDimMismatch | InvalidHessian)` for a malformed or
///   non-finite result.
pub fn block_hessian<O: BlockObjective>(
    obj: &O, method: HessianMethod,
) -> ExpansionResult<Hessian> {
    let (m, n) = obj.block_shape();
    let x: Theta = obj.base_block().iter().copied().collect();
    debug!("block Hessian: {m}x{n} block, {} coordinates, method {method:?}", x.len());
    let hess = match method {
        HessianMethod::Exact => exact_hessian(obj, &x, (m, n))?,
        HessianMethod::FiniteDifference => finite_difference_hessian(obj, &x, (m, n))?,
    };
    validate_hessian(&hess, x.len())?;
    Ok(hess)
}

/// Relative asymmetry `max|H − Hᵀ| / max(1, max|H|)`.
pub fn symmetry_error(h: &Hessian) -> f64 {
    let scale = h.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let mut worst = 0.0_f64;
    for ((i, j), &v) in h.indexed_iter() {
        if j > i {
            worst = worst.max((v - h[[j, i]]).abs());
        }
    }
    worst / scale
}

/// `(H + Hᵀ) / 2`.
pub fn symmetrize(h: &Hessian) -> Hessian {
    (h + &h.t()) * 0.5
}

/// Copy an `ndarray` matrix into a `nalgebra::DMatrix`.
pub(crate) fn fill_dmatrix(h: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(h.nrows(), h.ncols(), |i, j| h[[i, j]])
}

// ---- Helper methods ----

fn exact_hessian<O: BlockObjective>(
    obj: &O, x: &Theta, shape: (usize, usize),
) -> ExpansionResult<Hessian> {
    jacobian(
        |w: &Array1<Dual<f64, 1>>| -> ExpansionResult<Array1<Dual<f64, 1>>> {
            let block = reshape_block(w, shape)?;
            let (_, grad) = obj.loss_and_gradient(&block)?;
            Ok(grad.iter().copied().collect())
        },
        x,
    )
}

fn finite_difference_hessian<O: BlockObjective>(
    obj: &O, x: &Theta, shape: (usize, usize),
) -> ExpansionResult<Hessian> {
    let closure_err: RefCell<Option<ExpansionError>> = RefCell::new(None);
    let grad_fn = |w: &Theta| -> Array1<f64> {
        let result = reshape_block(w, shape)
            .and_then(|block| obj.loss_and_gradient(&block).map_err(ExpansionError::from));
        match result {
            Ok((_, g)) => g.iter().copied().collect(),
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                Array1::from_elem(w.len(), f64::NAN)
            }
        }
    };
    let hess = compute_hessian(&grad_fn, x);
    if let Some(err) = closure_err.into_inner() {
        return Err(err);
    }
    Ok(hess?)
}

fn reshape_block<T: Clone>(w: &Array1<T>, shape: (usize, usize)) -> ExpansionResult<Array2<T>> {
    Array2::from_shape_vec(shape, w.to_vec()).map_err(|_| {
        let found = (w.len(), 1);
        ExpansionError::Model(ModelError::BlockShapeMismatch { expected: shape, found })
    })
}
