//! End-to-end tests for the degenerate-minimum expansion pipeline.
//!
//! Purpose
//! -------
//! - Run the complete train → Hessian → spectrum → reparametrize →
//!   derivatives → coefficients procedure on a small synthetic problem.
//! - Check the properties that only hold for the assembled pipeline:
//!   determinism across runs, exact reparametrization at the origin, and
//!   consistency between the spectrum and the derivative tensors.
//!
//! Coverage
//! --------
//! - `pipeline::run` with a tanh network and the default exact Hessian.
//! - `pipeline::expand` on a `BlockEvaluator` built from the trained model.
//! - `expansion::reparam::DirectionalModel` against the trained network's
//!   logits.
//! - The pipeline's refusals on a trained classifier: a gradient above
//!   `max_grad_norm` and a spectral gap below the required ratio.
//!
//! Exclusions
//! ----------
//! - Individual numerical building blocks (duals, eigen-selection,
//!   contractions); those are covered by unit tests.
//! - MNIST-sized problems; the demo covers that path.
use degenerate_minima::{
    expansion::{
        ExpansionError, ExpansionOptions, SpectralOptions,
        reparam::{DEGENERATE_AXIS, DirectionalModel, NON_DEGENERATE_AXIS},
    },
    model::{BlockEvaluator, BlockId, Dataset, activation::Activation},
    pipeline::{PipelineError, PipelineOptions, PipelineReport, expand, run},
};

/// Purpose
/// -------
/// Six examples, five inputs, three classes; small enough that the first
/// hidden layer's activations are rank deficient, so the `dense_1/kernel`
/// Hessian has an exact null space.
fn tiny_dataset() -> Dataset {
    Dataset::synthetic(6, 5, 3, 17).expect("valid synthetic data")
}

/// Purpose
/// -------
/// 5 → 8 → 4 → 3 tanh network trained with the default fixed budget from
/// seed 3, target `dense_1/kernel` (32 coordinates). The zero threshold is
/// 1e-10, which separates the structural null space (round-off level) from
/// the curvature of a partially trained network. The gap ratio keeps its
/// default of 1e2.
fn tiny_options() -> PipelineOptions {
    let mut opts = PipelineOptions {
        hidden: vec![8, 4],
        activation: Activation::Tanh,
        target: BlockId::kernel(1),
        expansion: ExpansionOptions {
            spectral: SpectralOptions { zero_threshold: 1e-10, ..SpectralOptions::default() },
            ..ExpansionOptions::default()
        },
        max_grad_norm: None,
        ..PipelineOptions::default()
    };
    opts.train.seed = 3;
    opts
}

fn run_tiny() -> PipelineReport {
    run(&tiny_dataset(), &tiny_options()).expect("pipeline succeeds")
}

#[test_log::test]
// Purpose
// -------
// Ensure the pipeline reproduces the same coefficient triple across runs.
//
// Given
// -----
// - The fixed dataset, architecture and seed above, run twice.
//
// Expect
// ------
// - Finite (c2, c3, c4), bit-identical between runs, with identical
//   trained parameters and selected directions.
fn pipeline_is_deterministic() {
    // Arrange / Act
    let a = run_tiny();
    let b = run_tiny();

    // Assert
    let (ca, cb) = (a.expansion.coefficients, b.expansion.coefficients);
    assert!(ca.c2.is_finite() && ca.c3.is_finite() && ca.c4.is_finite());
    assert_eq!(ca, cb);
    assert_eq!(a.training.model.to_theta(), b.training.model.to_theta());
    assert_eq!(a.expansion.directions, b.expansion.directions);
}

#[test_log::test]
// Purpose
// -------
// Check the structural facts linking the spectrum and the tensors.
//
// Given
// -----
// - One pipeline run on the tiny problem.
//
// Expect
// ------
// - A 32 × 32 Hessian with at least 8 degenerate eigenvalues (the rank
//   deficiency of the 6 × 8 activations times 4 output columns).
// - c2 equals half the non-degenerate eigenvalue and the second
//   derivative along the degenerate axis is numerically zero.
// - The reparametrized loss at the origin equals the trained loss.
fn spectrum_and_tensors_are_consistent() {
    // Arrange / Act
    let report = run_tiny();
    let exp = &report.expansion;

    // Assert
    assert_eq!(exp.hessian_dim, 32);
    assert!(exp.null_dim >= 8, "null dim {}", exp.null_dim);
    assert!(exp.symmetry_error < 1e-10);
    let lambda = exp.directions.non_degenerate.eigenvalue;
    assert!((exp.coefficients.c2 - 0.5 * lambda).abs() < 1e-8 * lambda.abs().max(1.0));
    let t2_ff = exp.tensors.t2[[DEGENERATE_AXIS, DEGENERATE_AXIS].as_slice()];
    assert!(t2_ff.abs() < 1e-10, "f·H·f = {t2_ff}");
    assert!(exp.directions.gap_ratio() >= SpectralOptions::default().min_gap_ratio);
    assert!(
        (exp.tensors.t2[[NON_DEGENERATE_AXIS, NON_DEGENERATE_AXIS].as_slice()] - lambda).abs()
            < 1e-8 * lambda.abs().max(1.0)
    );
    assert_eq!(exp.equivalence_gap, 0.0);
    assert!((exp.tensors.value - report.training.loss).abs() < 1e-12);
}

#[test_log::test]
// Purpose
// -------
// Verify that the reparametrized network is the trained network at t = 0
// and that expanding the trained evaluator directly matches `run`.
//
// Given
// -----
// - The trained model of one run, its `dense_1/kernel` evaluator and the
//   selected directions.
//
// Expect
// ------
// - Logits at W(0) equal the trained logits to 1e-12.
// - `expand` on the evaluator reproduces the coefficient triple of `run`.
fn reparametrized_network_matches_trained_network() {
    // Arrange
    let data = tiny_dataset();
    let opts = tiny_options();
    let report = run(&data, &opts).expect("pipeline succeeds");
    let model = &report.training.model;
    let eval = BlockEvaluator::new(model, &data, opts.target).expect("kernel target");

    // Act
    let reparam =
        DirectionalModel::from_pair(&eval, &report.expansion.directions).expect("shapes match");
    let at_origin = eval.logits(&reparam.block_at(&[0.0, 0.0])).expect("finite logits");
    let trained = model.logits(data.inputs()).expect("finite logits");
    let again = expand(&eval, &opts.expansion).expect("expansion succeeds");

    // Assert
    for (a, b) in at_origin.iter().zip(trained.iter()) {
        assert!((a - b).abs() < 1e-12, "{a} vs {b}");
    }
    assert_eq!(again.coefficients, report.expansion.coefficients);
}

#[test_log::test]
// Purpose
// -------
// Ensure that a trained classifier whose gradient exceeds `max_grad_norm`
// is refused before any Hessian work.
//
// Given
// -----
// - The tiny problem with `max_grad_norm = 1e-12`, far below what the
//   fixed training budget reaches.
//
// Expect
// ------
// - `PipelineError::NotAtCriticalPoint` reporting a gradient norm above
//   the limit.
fn trained_classifier_off_critical_point_is_refused() {
    // Arrange
    let opts = PipelineOptions { max_grad_norm: Some(1e-12), ..tiny_options() };

    // Act
    let result = run(&tiny_dataset(), &opts);

    // Assert
    match result {
        Err(PipelineError::NotAtCriticalPoint { grad_norm, max }) => {
            assert_eq!(max, 1e-12);
            assert!(grad_norm > max, "{grad_norm} <= {max}");
        }
        other => panic!("expected NotAtCriticalPoint, got {other:?}"),
    }
}

#[test_log::test]
// Purpose
// -------
// Ensure that the gap-ratio check is live on a real classifier Hessian:
// demanding a ratio no finite spectrum can meet must fail with
// `SpectralGapAbsent` rather than return coefficients.
//
// Given
// -----
// - The tiny problem with `min_gap_ratio = f64::MAX`.
//
// Expect
// ------
// - `PipelineError::Expansion(SpectralGapAbsent)` with the configured
//   ratio and a measured ratio below it.
fn trained_classifier_without_required_gap_is_refused() {
    // Arrange
    let mut opts = tiny_options();
    opts.expansion.spectral.min_gap_ratio = f64::MAX;

    // Act
    let result = run(&tiny_dataset(), &opts);

    // Assert
    match result {
        Err(PipelineError::Expansion(ExpansionError::SpectralGapAbsent {
            ratio, min_ratio, ..
        })) => {
            assert_eq!(min_ratio, f64::MAX);
            assert!(ratio < min_ratio);
        }
        other => panic!("expected SpectralGapAbsent, got {other:?}"),
    }
}
