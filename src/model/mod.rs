//! model — dataset, feed-forward classifier, and block-restricted losses.
//!
//! Purpose
//! -------
//! Provide everything the expansion needs from the learning side: labeled
//! data, a small dense classifier with cross-entropy loss, its trainer, and
//! a view of the trained loss as a function of one parameter block.
//!
//! Key behaviors
//! -------------
//! - `data`: validated [`Dataset`] with raw-pixel, IDX and synthetic loaders.
//! - `mlp` / `activation` / `loss`: the classifier with exact `f64`
//!   backpropagation and numerically stable softmax cross-entropy.
//! - `params`: named [`BlockId`]s and the [`ParamRegistry`] fixing the flat
//!   parameter layout.
//! - `training`: full-batch L-BFGS through `optimization::loss_optimizer`.
//! - `objective` / `evaluator`: the [`BlockObjective`] seam and its
//!   classifier implementation [`BlockEvaluator`], generic over
//!   `autodiff::Scalar`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters outside the target block are frozen `f64` values after
//!   training; only the target block is ever lifted into dual numbers.
//!
//! Conventions
//! -----------
//! - Kernels are `(fan_in, fan_out)`, examples are rows, blocks flatten
//!   row-major.
//! - Fallible operations return [`ModelResult`]; the optimizer layer maps
//!   [`ModelError`] into `OptError`.
//!
//! Testing notes
//! -------------
//! - Backprop is checked against finite differences, the evaluator against
//!   the full model and against forward-mode duals.

pub mod activation;
pub mod data;
pub mod errors;
pub mod evaluator;
pub mod loss;
pub mod mlp;
pub mod objective;
pub mod params;
pub mod training;

pub use self::data::Dataset;
pub use self::errors::{ModelError, ModelResult};
pub use self::evaluator::BlockEvaluator;
pub use self::mlp::{Architecture, Mlp};
pub use self::objective::BlockObjective;
pub use self::params::{BlockId, ParamRegistry};

pub mod prelude {
    pub use super::activation::Activation;
    pub use super::data::Dataset;
    pub use super::errors::{ModelError, ModelResult};
    pub use super::evaluator::BlockEvaluator;
    pub use super::mlp::{Architecture, Mlp};
    pub use super::objective::BlockObjective;
    pub use super::params::{BlockId, BlockKind, ParamRegistry};
    pub use super::training::{TrainOptions, TrainOutcome, train};
}
