//! Execution helper that runs an `argmin` solver on a log-likelihood problem and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;

/// Run an `argmin` solver on an adapted log-likelihood.
///
/// Wires the problem and solver into an [`Executor`], seeds it with
/// `theta0` (solver space), applies `max_iters`, optionally attaches a
/// terminal observer, and converts the final state into an
/// [`OptimOutcome`] whose `theta_hat` is mapped back to model space.
///
/// # Failure handling
/// If the executor itself returns an error (line-search breakdown, solver
/// condition violated), the run is not abandoned: the best point the
/// adapter saw is returned with `converged = false` and a status naming
/// the failure. Errors raised by the model's own `value`
/// (`OptError::InvalidModelInput`) are surfaced instead, as is any failure
/// before a single finite point was evaluated.
///
/// # Feature flags
/// With `obs_slog` enabled and `opts.verbose`, a `SlogLogger` observer is
/// attached in `ObserverMode::Always`.
///
/// # Errors
/// - See *Failure handling*.
/// - Propagates validation errors encountered when building the outcome.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }
    let bounds = problem.bounds;
    let best = problem.best;

    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let to_model_space = |theta: Theta| bounds.to_constrained(&theta);

    let mut result = match optimizer.run() {
        Ok(res) => res.state().clone(),
        Err(err) => {
            let err = OptError::from(err);
            if matches!(err, OptError::InvalidModelInput { .. }) {
                return Err(err);
            }
            let best = best.borrow().clone();
            return match best.theta {
                Some(theta) => {
                    log::warn!("optimizer failed ({err}); returning best point seen");
                    OptimOutcome::from_failure(to_model_space(theta), -best.cost, &err.to_string())
                }
                None => Err(err),
            };
        }
    };
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let outcome = OptimOutcome::new(
        result.take_best_param().map(to_model_space),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )?;
    log::debug!(
        "optimizer finished: status = {}, iterations = {}, loglik = {:.6}",
        outcome.status,
        outcome.iterations,
        outcome.value
    );
    Ok(outcome)
}

// ---- Helper Methods ----

fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>)
where
    F: LogLikelihood,
{
    let ll0 = problem.cost(theta0).map(|c| -c).unwrap_or(f64::NAN);
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    log::info!(
        "init: ell(theta0) = {:.6}{}",
        ll0,
        g0n.map(|n| format!(", ||grad|| = {n:.6}")).unwrap_or_default()
    );
}
