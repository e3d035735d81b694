//! Execution helper that runs an `argmin` solver on a loss problem and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loss_optimizer::{
        adapter::ArgMinAdapter,
        traits::{LossFunction, OptimOptions, OptimOutcome},
        types::{Grad, Theta},
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;
use log::{Level, log};

/// Run an `argmin` solver for a loss problem.
///
/// Shared runner used by both line-search variants: sets `theta0` on the
/// solver state, applies `max_iters` when configured, executes, and
/// converts the final state into an [`OptimOutcome`].
///
/// The initial loss and gradient norm are logged before the first
/// iteration and the termination status afterwards, at `info` level when
/// `opts.verbose` is set and at `debug` level otherwise.
///
/// # Errors
/// - Any `argmin` runtime error (line-search failures, user errors raised
///   inside the cost or gradient) via `From<argmin::core::Error>`.
/// - Validation errors from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &OptimOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LossFunction,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    let level = if opts.verbose { Level::Info } else { Level::Debug };
    log_initial_state(&theta0, &problem, level)?;

    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let best_cost = result.get_best_cost();
    log!(
        level,
        "L-BFGS finished after {iterations} iterations: loss = {best_cost:.6e}, \
         status = {termination:?}"
    );
    OptimOutcome::new(
        result.take_best_param(),
        best_cost,
        termination,
        iterations,
        function_counts,
        grad,
    )
}

fn log_initial_state<F>(
    theta0: &Theta, problem: &ArgMinAdapter<'_, F>, level: Level,
) -> OptResult<()>
where
    F: LossFunction,
{
    if !log::log_enabled!(level) {
        return Ok(());
    }
    let loss0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    log!(
        level,
        "init: loss(theta0) = {:.6}{}",
        loss0,
        g0n.map(|n| format!(", ||grad|| = {n:.6}")).unwrap_or_default()
    );
    Ok(())
}
