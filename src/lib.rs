//! degenerate_minima — higher-order Taylor expansion of a classifier loss
//! around a degenerate minimum.
//!
//! Purpose
//! -------
//! Train a small feed-forward classifier, then study the loss surface of one
//! weight block around the trained point: find the directions of zero
//! curvature in the block Hessian and compute the second, third and fourth
//! order Taylor coefficients along a degenerate / non-degenerate direction
//! pair.
//!
//! Key behaviors
//! -------------
//! - [`pipeline::run`] performs the whole procedure:
//!   1. full-batch L-BFGS training (`model::training`);
//!   2. the block Hessian, exact by forward-over-reverse differentiation
//!      (`expansion::hessian`);
//!   3. a checked eigendecomposition with a zero threshold and direction
//!      selection (`expansion::spectrum`);
//!   4. the reparametrization `W(t) = W* + t₀·e + t₁·f`
//!      (`expansion::reparam`);
//!   5. order-2/3/4 derivative tensors of `t ↦ L(W(t))` by nested dual
//!      numbers (`autodiff`);
//!   6. the contractions `c2`, `c3`, `c4` (`expansion::taylor`).
//! - [`pipeline::expand`] runs steps 2–6 on any
//!   [`model::BlockObjective`], trained classifier or not.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only the target block varies in steps 2–6; every other parameter and
//!   the input data stay fixed `f64` values.
//! - Every step is deterministic given the dataset and the options (the
//!   initialization is seeded).
//!
//! Conventions
//! -----------
//! - Layers are 0-based and blocks are named `dense_{layer}/kernel` or
//!   `dense_{layer}/bias`; kernels have shape `(fan_in, fan_out)` and blocks
//!   flatten row-major.
//! - Tolerance constants live in
//!   `optimization::numerical_stability::transformations`.
//! - The library logs through the `log` facade and never installs a logger.
//!
//! Downstream usage
//! ----------------
//! - Build a [`model::Dataset`] (synthetic, raw pixels or IDX files), pick
//!   [`pipeline::PipelineOptions`] and call [`pipeline::run`]. The report
//!   carries the training outcome, the spectrum, its histogram, the chosen
//!   directions, the derivative tensors and the coefficient triple.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/pipeline_end_to_end.rs`
//!   checks determinism and the reparametrization on a small network.
pub mod autodiff;
pub mod expansion;
pub mod model;
pub mod optimization;
pub mod pipeline;
