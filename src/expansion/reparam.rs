//! Two-coordinate reparametrization of the target block.
//!
//! `DirectionalModel` wraps a [`BlockObjective`] and two direction blocks
//! `d₀` (non-degenerate) and `d₁` (degenerate) and exposes
//! `g(t₀, t₁) = L(W* + t₀·d₀ + t₁·d₁)` as a [`ScalarFn<2>`], so its nested
//! derivatives at `t = 0` are the directional derivative tensors of the
//! loss. The map is affine in `t`; the directions stay `f64` and enter
//! through [`Scalar::scale`], so only `t` carries tangents.
use crate::autodiff::{Scalar, ScalarFn};
use crate::expansion::{
    errors::{ExpansionError, ExpansionResult},
    spectrum::DirectionPair,
};
use crate::model::BlockObjective;
use ndarray::{Array1, Array2};

/// Coordinate of the non-degenerate direction.
pub const NON_DEGENERATE_AXIS: usize = 0;
/// Coordinate of the degenerate direction.
pub const DEGENERATE_AXIS: usize = 1;

#[derive(Debug, Clone)]
pub struct DirectionalModel<'a, O: BlockObjective> {
    objective: &'a O,
    directions: [Array2<f64>; 2],
}

impl<'a, O: BlockObjective> DirectionalModel<'a, O> {
    /// Wrap `objective` with `[non_degenerate, degenerate]` direction blocks.
    ///
    /// # Errors
    /// - [`ExpansionError::ShapeMismatch`] if a direction does not have the
    ///   block's shape.
    pub fn new(objective: &'a O, directions: [Array2<f64>; 2]) -> ExpansionResult<Self> {
        let (m, n) = objective.block_shape();
        for d in directions.iter() {
            if d.dim() != (m, n) {
                return Err(ExpansionError::ShapeMismatch {
                    expected: vec![m, n],
                    found: d.shape().to_vec(),
                });
            }
        }
        Ok(Self { objective, directions })
    }

    /// Reshape the selected eigenvectors (row-major) into direction blocks.
    pub fn from_pair(objective: &'a O, pair: &DirectionPair) -> ExpansionResult<Self> {
        let shape = objective.block_shape();
        let mut directions = [Array2::zeros(shape), Array2::zeros(shape)];
        directions[NON_DEGENERATE_AXIS] = unflatten(&pair.non_degenerate.vector, shape)?;
        directions[DEGENERATE_AXIS] = unflatten(&pair.degenerate.vector, shape)?;
        Self::new(objective, directions)
    }

    pub fn directions(&self) -> &[Array2<f64>; 2] {
        &self.directions
    }

    /// `W* + t₀·d₀ + t₁·d₁`.
    pub fn block_at<S: Scalar>(&self, t: &[S; 2]) -> Array2<S> {
        let base = self.objective.base_block();
        let [d0, d1] = &self.directions;
        Array2::from_shape_fn(base.dim(), |ix| {
            S::from_f64(base[ix]) + t[0].scale(d0[ix]) + t[1].scale(d1[ix])
        })
    }

    /// `g(t)` on plain `f64` coordinates.
    pub fn loss_at(&self, t: [f64; 2]) -> ExpansionResult<f64> {
        self.eval(&t)
    }

    /// `|g(0, 0) − L(W*)|`; zero whenever the reparametrization is wired
    /// correctly.
    pub fn equivalence_gap(&self) -> ExpansionResult<f64> {
        let direct = self.objective.loss(self.objective.base_block())?;
        Ok((self.loss_at([0.0, 0.0])? - direct).abs())
    }
}

impl<O: BlockObjective> ScalarFn<2> for DirectionalModel<'_, O> {
    type Error = ExpansionError;

    fn eval<S: Scalar>(&self, t: &[S; 2]) -> ExpansionResult<S> {
        Ok(self.objective.loss(&self.block_at(t))?)
    }
}

fn unflatten(v: &Array1<f64>, shape: (usize, usize)) -> ExpansionResult<Array2<f64>> {
    Array2::from_shape_vec(shape, v.to_vec()).map_err(|_| ExpansionError::ShapeMismatch {
        expected: vec![shape.0 * shape.1],
        found: vec![v.len()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::test_support::QuadraticObjective;
    use crate::model::{
        BlockEvaluator, BlockId, Dataset, Mlp, activation::Activation, mlp::Architecture,
    };

    #[test]
    // Purpose
    // -------
    // Verify that the reparametrized model reproduces the trained network
    // at t = 0, both in loss and in logits.
    //
    // Given
    // -----
    // - A 4 → 5 → 3 → 2 network and arbitrary direction blocks for
    //   `dense_1/kernel`.
    //
    // Expect
    // ------
    // - Equivalence gap exactly zero and logits equal to 1e-13.
    fn reparametrization_is_exact_at_the_origin() {
        // Arrange
        let arch = Architecture::classifier(4, &[5, 3], 2, Activation::Tanh).expect("valid");
        let data = Dataset::synthetic(7, 4, 2, 8).expect("valid data");
        let mlp = Mlp::init(&arch, 3);
        let eval = BlockEvaluator::new(&mlp, &data, BlockId::kernel(1)).expect("valid target");
        let d0 = Array2::from_shape_fn((5, 3), |(i, j)| (i as f64 - j as f64) * 0.1);
        let d1 = Array2::from_shape_fn((5, 3), |(i, j)| ((i * 3 + j) as f64).cos());

        // Act
        let model = DirectionalModel::new(&eval, [d0, d1]).expect("shapes match");
        let gap = model.equivalence_gap().expect("finite");
        let logits = eval.logits(&model.block_at(&[0.0, 0.0])).expect("finite");

        // Assert
        assert_eq!(gap, 0.0);
        let direct = mlp.logits(data.inputs()).expect("finite");
        for (a, b) in logits.iter().zip(direct.iter()) {
            assert!((a - b).abs() < 1e-13);
        }
    }

    #[test]
    // Purpose
    // -------
    // Check that moving along a direction equals evaluating the shifted block.
    //
    // Given
    // -----
    // - A quadratic objective and t = (0.3, −0.7).
    //
    // Expect
    // ------
    // - g(t) == L(W* + 0.3 d₀ − 0.7 d₁) and the shifted block differs from
    //   the base by exactly that combination.
    fn directional_loss_matches_shifted_block() {
        // Arrange
        let obj = QuadraticObjective::with_spectrum((2, 2), &[0.0, 1.0, 2.0, 4.0]);
        let d0 = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 0.0]).expect("shape");
        let d1 = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 0.0, 1.0]).expect("shape");
        let model = DirectionalModel::new(&obj, [d0.clone(), d1.clone()]).expect("shapes match");

        // Act
        let g = model.loss_at([0.3, -0.7]).expect("finite");
        let shifted = obj.base_block() + &(d0 * 0.3) - &(d1 * 0.7);

        // Assert
        assert!((g - obj.loss(&shifted).expect("finite")).abs() < 1e-14);
    }

    #[test]
    fn mismatched_direction_shapes_are_rejected() {
        let obj = QuadraticObjective::with_spectrum((2, 2), &[0.0, 1.0, 2.0, 4.0]);
        let bad = DirectionalModel::new(&obj, [Array2::zeros((2, 2)), Array2::zeros((4, 1))]);
        assert!(matches!(bad, Err(ExpansionError::ShapeMismatch { .. })));
    }
}
