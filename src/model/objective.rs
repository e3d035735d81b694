//! The seam between the classifier and the expansion machinery.
//!
//! Everything downstream of training (Hessian, spectrum, reparametrization,
//! nested derivatives) only needs the loss as a function of one weight block
//! with the rest of the parameters frozen. [`BlockObjective`] captures
//! exactly that, generic over the scalar type so the same code runs on
//! `f64`, on first-order duals (Hessian columns) and on four-level nested
//! duals (Taylor tensors).
use crate::autodiff::{Dual, Scalar};
use crate::model::errors::{ModelError, ModelResult};
use ndarray::Array2;

/// Loss restricted to one `(m × n)` parameter block.
pub trait BlockObjective {
    /// Shape `(m, n)` of the block.
    fn block_shape(&self) -> (usize, usize);

    /// Block value at the expansion point.
    fn base_block(&self) -> &Array2<f64>;

    /// Loss with the block replaced by `block`.
    fn loss<S: Scalar>(&self, block: &Array2<S>) -> ModelResult<S>;

    /// Loss and its gradient with respect to the block.
    ///
    /// The default runs one forward-mode sweep per block entry. Objectives
    /// with an analytic reverse pass should override it.
    fn loss_and_gradient<S: Scalar>(&self, block: &Array2<S>) -> ModelResult<(S, Array2<S>)> {
        check_block_shape(self.block_shape(), block.dim())?;
        let mut lifted = block.mapv(Dual::<S, 1>::constant);
        let mut grad = Array2::from_elem(block.dim(), S::zero());
        for ((i, j), g) in grad.indexed_iter_mut() {
            lifted[[i, j]] = Dual::variable(block[[i, j]], 0);
            *g = self.loss(&lifted)?.eps[0];
            lifted[[i, j]] = Dual::constant(block[[i, j]]);
        }
        Ok((self.loss(block)?, grad))
    }
}

/// Shape guard shared by every objective.
pub fn check_block_shape(expected: (usize, usize), found: (usize, usize)) -> ModelResult<()> {
    if expected != found {
        return Err(ModelError::BlockShapeMismatch { expected, found });
    }
    Ok(())
}
