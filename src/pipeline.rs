//! pipeline — the ordered train → Hessian → spectrum → reparametrize →
//! derivatives → coefficients procedure.
//!
//! Purpose
//! -------
//! Run the six steps in order on a dataset ([`run`]) or steps 2–6 on an
//! already trained [`BlockObjective`] ([`expand`]), collecting every
//! intermediate result in a report.
//!
//! Key behaviors
//! -------------
//! - Training is full-batch L-BFGS; the optional `max_grad_norm` check
//!   rejects expansion points that are not critical points.
//! - Each step logs one `info!` line; failures stop the pipeline with the
//!   error of the step that raised them.
//! - The reparametrized loss at `t = 0` is compared with the loss at the
//!   expansion point before any derivative is taken.
//!
//! Invariants & assumptions
//! ------------------------
//! - Steps run strictly in order and nothing is revisited.
//! - With fixed options and data the whole pipeline is deterministic: the
//!   initialization is seeded and every later step is a pure function of
//!   its inputs.
//!
//! Downstream usage
//! ----------------
//! - The demo calls [`run`] and prints [`ExpansionReport::histogram`] and
//!   [`ExpansionReport::coefficients`].
use crate::autodiff::{DerivativeTensors, derivative_tensors};
use crate::expansion::{
    ExpansionError, ExpansionOptions, ExpansionResult,
    hessian::block_hessian,
    reparam::DirectionalModel,
    spectrum::{DirectionPair, EigenHistogram, Spectrum, eigenvalue_histogram},
    taylor::{TaylorCoefficients, taylor_coefficients},
};
use crate::model::{
    BlockEvaluator, BlockId, BlockObjective, Dataset, ModelError,
    activation::Activation,
    mlp::Architecture,
    training::{TrainOptions, TrainOutcome, train},
};
use crate::optimization::errors::OptError;
use log::info;

/// Largest tolerated `|g(0) − L(W*)|`.
pub const EQUIVALENCE_TOL: f64 = 1e-12;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// `‖∇L(θ*)‖₂` exceeds the configured maximum.
    NotAtCriticalPoint { grad_norm: f64, max: f64 },
    Model(ModelError),
    Optimization(OptError),
    Expansion(ExpansionError),
}

impl std::error::Error for PipelineError {}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::NotAtCriticalPoint { grad_norm, max } => write!(
                f,
                "Pipeline Error: gradient norm {grad_norm:.3e} at the trained point \
                 exceeds {max:.1e}"
            ),
            PipelineError::Model(err) => write!(f, "Pipeline Error: {err}"),
            PipelineError::Optimization(err) => write!(f, "Pipeline Error: {err}"),
            PipelineError::Expansion(err) => write!(f, "Pipeline Error: {err}"),
        }
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        PipelineError::Model(err)
    }
}

impl From<OptError> for PipelineError {
    fn from(err: OptError) -> Self {
        PipelineError::Optimization(err)
    }
}

impl From<ExpansionError> for PipelineError {
    fn from(err: ExpansionError) -> Self {
        PipelineError::Expansion(err)
    }
}

/// Architecture, target block and per-step options.
///
/// Default: hidden widths `[128, 64]`, ReLU, target `dense_1/kernel`,
/// default training and expansion options, no gradient-norm check.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub hidden: Vec<usize>,
    pub activation: Activation,
    pub target: BlockId,
    pub train: TrainOptions,
    pub expansion: ExpansionOptions,
    pub max_grad_norm: Option<f64>,
}

impl PipelineOptions {
    pub fn new(
        hidden: Vec<usize>, activation: Activation, target: BlockId, train: TrainOptions,
        expansion: ExpansionOptions, max_grad_norm: Option<f64>,
    ) -> Self {
        Self { hidden, activation, target, train, expansion, max_grad_norm }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            hidden: vec![128, 64],
            activation: Activation::Relu,
            target: BlockId::kernel(1),
            train: TrainOptions::default(),
            expansion: ExpansionOptions::default(),
            max_grad_norm: None,
        }
    }
}

/// Results of steps 2–6.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionReport {
    /// Number of block coordinates (side of the Hessian).
    pub hessian_dim: usize,
    pub symmetry_error: f64,
    pub spectrum: Spectrum,
    pub histogram: EigenHistogram,
    /// Count of eigenvalues at or below the zero threshold.
    pub null_dim: usize,
    pub directions: DirectionPair,
    pub equivalence_gap: f64,
    pub tensors: DerivativeTensors,
    pub coefficients: TaylorCoefficients,
}

/// Results of the full pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub training: TrainOutcome,
    pub expansion: ExpansionReport,
}

/// Steps 1–6: train a classifier on `data`, then expand its loss around
/// the trained target block.
///
/// # Errors
/// - Training failures as `Optimization` / `Model`.
/// - [`PipelineError::NotAtCriticalPoint`] when `max_grad_norm` is set and
///   exceeded.
/// - Any [`ExpansionError`] from [`expand`].
pub fn run(data: &Dataset, opts: &PipelineOptions) -> PipelineResult<PipelineReport> {
    let (input_dim, n_classes) = (data.input_dim(), data.n_classes());
    let arch = Architecture::classifier(input_dim, &opts.hidden, n_classes, opts.activation)?;
    let training = train(&arch, data, &opts.train)?;
    info!(
        "step 1 (train): loss {:.6e}, accuracy {:.3}, ||grad|| {:.3e}",
        training.loss, training.accuracy, training.grad_norm
    );
    if let Some(max) = opts.max_grad_norm {
        if training.grad_norm > max {
            return Err(PipelineError::NotAtCriticalPoint { grad_norm: training.grad_norm, max });
        }
    }

    let evaluator = BlockEvaluator::new(&training.model, data, opts.target)?;
    let expansion = expand(&evaluator, &opts.expansion)?;
    Ok(PipelineReport { training, expansion })
}

/// Steps 2–6 on an objective already at its expansion point.
///
/// # Errors
/// - Hessian, spectral, reparametrization and contraction errors as
///   [`ExpansionError`].
/// - [`ExpansionError::ReparametrizationMismatch`] if `g(0)` and the loss at
///   the base block differ by more than [`EQUIVALENCE_TOL`].
pub fn expand<O: BlockObjective>(
    objective: &O, opts: &ExpansionOptions,
) -> ExpansionResult<ExpansionReport> {
    let hessian = block_hessian(objective, opts.hessian_method)?;
    let hessian_dim = hessian.nrows();

    let spectrum = Spectrum::decompose(&hessian, &opts.spectral)?;
    info!(
        "step 2 (hessian): {hessian_dim}x{hessian_dim}, asymmetry {:.3e}",
        spectrum.symmetry_error
    );

    let threshold = opts.spectral.zero_threshold;
    let null_dim = spectrum.null_dim(threshold);
    let histogram = eigenvalue_histogram(&spectrum.eigenvalues.to_vec());
    info!("step 3 (spectrum): {null_dim} of {hessian_dim} eigenvalues at or below {threshold:.1e}");
    let directions = spectrum.select_directions(&opts.spectral)?;
    info!(
        "step 3 (directions): degenerate λ = {:.3e}, non-degenerate λ = {:.3e}, gap {:.3e}",
        directions.degenerate.eigenvalue,
        directions.non_degenerate.eigenvalue,
        directions.gap_ratio()
    );

    let model = DirectionalModel::from_pair(objective, &directions)?;
    let equivalence_gap = model.equivalence_gap()?;
    if equivalence_gap > EQUIVALENCE_TOL {
        return Err(ExpansionError::ReparametrizationMismatch {
            gap: equivalence_gap,
            tol: EQUIVALENCE_TOL,
        });
    }
    info!("step 4 (reparametrize): |g(0) - L(W*)| = {equivalence_gap:.3e}");

    let tensors = derivative_tensors(&model, &[0.0, 0.0])?;
    info!("step 5 (derivatives): value {:.6e}, gradient {:?}", tensors.value, tensors.gradient);

    let coefficients = taylor_coefficients(&tensors)?;
    info!(
        "step 6 (coefficients): c2 = {:.6e}, c3 = {:.6e}, c4 = {:.6e}",
        coefficients.c2, coefficients.c3, coefficients.c4
    );

    Ok(ExpansionReport {
        hessian_dim,
        symmetry_error: spectrum.symmetry_error,
        spectrum,
        histogram,
        null_dim,
        directions,
        equivalence_gap,
        tensors,
        coefficients,
    })
}
