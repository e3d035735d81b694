//! evaluator — classifier loss as a function of one frozen-context kernel.
//!
//! Purpose
//! -------
//! Evaluate the classifier with a single kernel block replaced by a value of
//! any [`Scalar`] type while every other parameter stays a plain `f64`.
//! This is the differentiable object behind the block Hessian and the
//! directional Taylor tensors.
//!
//! Key behaviors
//! -------------
//! - [`BlockEvaluator::new`] runs one `f64` forward pass and caches the
//!   activations entering the target layer; layers before the target never
//!   depend on the block and are not recomputed.
//! - `logits::<S>` / `loss::<S>` run the remaining layers with the target
//!   kernel in `S`. Frozen weights enter through [`Scalar::scale`], so no
//!   `f64` weight is ever lifted into `S`.
//! - `loss_and_gradient::<S>` adds a reverse pass written over `S`. On
//!   `Dual<f64, 1>` inputs this is forward-over-reverse: the tangent of the
//!   returned gradient is one Hessian column.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only kernels can be targets; bias targets are rejected.
//! - Evaluating `loss::<f64>` on [`BlockObjective::base_block`] reproduces
//!   [`Mlp::loss`] on the same data.
//!
//! Testing notes
//! -------------
//! - Tests compare against the full `f64` model, against the full backprop
//!   gradient, and against forward-mode derivatives of `loss`.
use crate::autodiff::Scalar;
use crate::model::{
    data::Dataset,
    errors::{ModelError, ModelResult},
    loss::{cross_entropy_delta, mean_cross_entropy},
    mlp::Mlp,
    objective::{BlockObjective, check_block_shape},
    params::{BlockId, BlockKind},
};
use ndarray::{Array2, ArrayView2};

/// Loss of a trained classifier as a function of one kernel.
#[derive(Debug, Clone)]
pub struct BlockEvaluator<'a> {
    mlp: &'a Mlp,
    data: &'a Dataset,
    target: BlockId,
    layer_inputs: Array2<f64>,
    base: Array2<f64>,
}

impl<'a> BlockEvaluator<'a> {
    /// # Errors
    /// - [`ModelError::UnknownBlock`] when `target` is not in the registry.
    /// - [`ModelError::UnsupportedTarget`] for bias blocks.
    /// - [`ModelError::InputDimMismatch`] when `data` does not fit the model.
    pub fn new(mlp: &'a Mlp, data: &'a Dataset, target: BlockId) -> ModelResult<Self> {
        mlp.registry().get(target)?;
        if target.kind != BlockKind::Kernel {
            return Err(ModelError::UnsupportedTarget {
                block: target.to_string(),
                reason: "only kernels can be expanded",
            });
        }
        let layer_inputs = mlp.activations_into(data.inputs(), target.layer)?;
        let base = mlp.block(target)?;
        Ok(Self { mlp, data, target, layer_inputs, base })
    }

    pub fn target(&self) -> BlockId {
        self.target
    }

    /// Logits with the target kernel replaced by `block`.
    pub fn logits<S: Scalar>(&self, block: &Array2<S>) -> ModelResult<Array2<S>> {
        let (mut pre, _) = self.forward(block)?;
        pre.pop().ok_or_else(|| ModelError::UnknownBlock { name: self.target.to_string() })
    }

    /// Pre-activations and outputs of layers `target.layer..`.
    fn forward<S: Scalar>(
        &self, block: &Array2<S>,
    ) -> ModelResult<(Vec<Array2<S>>, Vec<Array2<S>>)> {
        check_block_shape(self.base.dim(), block.dim())?;
        let layers = &self.mlp.layers()[self.target.layer..];
        let mut pre = Vec::with_capacity(layers.len());
        let mut post: Vec<Array2<S>> = Vec::with_capacity(layers.len());
        for (k, layer) in layers.iter().enumerate() {
            let mut z = if k == 0 {
                frozen_times_free(self.layer_inputs.view(), block)
            } else {
                free_times_frozen(&post[k - 1], layer.kernel.view())
            };
            for mut row in z.rows_mut() {
                for (zj, &bj) in row.iter_mut().zip(layer.bias.iter()) {
                    *zj = *zj + S::from_f64(bj);
                }
            }
            post.push(z.mapv(|v| layer.activation.apply(v)));
            pre.push(z);
        }
        Ok((pre, post))
    }
}

impl<'a> BlockObjective for BlockEvaluator<'a> {
    fn block_shape(&self) -> (usize, usize) {
        self.base.dim()
    }

    fn base_block(&self) -> &Array2<f64> {
        &self.base
    }

    fn loss<S: Scalar>(&self, block: &Array2<S>) -> ModelResult<S> {
        let logits = self.logits(block)?;
        let loss = mean_cross_entropy(logits.view(), self.data.labels());
        if !loss.value().is_finite() {
            return Err(ModelError::NonFiniteLoss { value: loss.value() });
        }
        Ok(loss)
    }

    fn loss_and_gradient<S: Scalar>(&self, block: &Array2<S>) -> ModelResult<(S, Array2<S>)> {
        let (pre, _) = self.forward(block)?;
        let last = pre.len() - 1;
        let labels = self.data.labels();
        let loss = mean_cross_entropy(pre[last].view(), labels);
        if !loss.value().is_finite() {
            return Err(ModelError::NonFiniteLoss { value: loss.value() });
        }

        let layers = &self.mlp.layers()[self.target.layer..];
        let mut delta = cross_entropy_delta(pre[last].view(), labels);
        for k in (1..=last).rev() {
            let act = layers[k - 1].activation;
            let back = free_times_frozen(&delta, layers[k].kernel.t());
            delta =
                Array2::from_shape_fn(back.dim(), |ix| back[ix] * act.derivative(pre[k - 1][ix]));
        }
        let grad = frozen_times_free(self.layer_inputs.t(), &delta);
        Ok((loss, grad))
    }
}

// ---- Helper methods ----

/// `a · m` for a frozen `f64` left factor.
fn frozen_times_free<S: Scalar>(a: ArrayView2<'_, f64>, m: &Array2<S>) -> Array2<S> {
    let (rows, inner) = a.dim();
    let cols = m.ncols();
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        (0..inner).fold(S::zero(), |acc, k| acc + m[[k, j]].scale(a[[i, k]]))
    })
}

/// `m · w` for a frozen `f64` right factor.
fn free_times_frozen<S: Scalar>(m: &Array2<S>, w: ArrayView2<'_, f64>) -> Array2<S> {
    let (rows, inner) = m.dim();
    let cols = w.ncols();
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        (0..inner).fold(S::zero(), |acc, k| acc + m[[i, k]].scale(w[[k, j]]))
    })
}
