//! High-level entry point for minimizing a user-provided `LossFunction`.
//!
//! Selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the objective in an `ArgMinAdapter`, and delegates the run
//! to `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    loss_optimizer::{
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LossFunction, OptimOptions, OptimOutcome},
        types::Theta,
    },
};

/// Minimize a loss `L(θ)` using L-BFGS with the chosen line search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds the solver selected by `opts.line_searcher`.
/// - Runs it through `run_lbfgs` and returns the normalized outcome.
///
/// # Errors
/// - Propagates errors from `f.check`, the builders, and the solver run.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use degenerate_minima::optimization::errors::OptResult;
/// use degenerate_minima::optimization::loss_optimizer::{
///     minimize, LossFunction, OptimOptions, Theta,
/// };
///
/// struct Bowl;
/// impl LossFunction for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.1, -0.2, 0.3], &(), &OptimOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), degenerate_minima::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: LossFunction>(
    f: &F, theta0: Theta, data: &F::Data, opts: &OptimOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
