//! Public configuration and result types for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait a model implements to be fitted.
//! - [`MLEOptions`] and [`Tolerances`]: optimizer configuration.
//! - [`LineSearcher`]: line search used inside L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by `maximize_bounded`.
//!
//! Convention: a model *reports* `ℓ(x)` and the optimizer minimizes
//! `c = -ℓ`. An analytic gradient, when provided, is `∇ℓ(x)` in the model's
//! own parameter space; the adapter handles the sign flip and any bound
//! reparameterization.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Model interface for maximum-likelihood fitting.
///
/// - `type Data`: the sample the likelihood is evaluated on.
///
/// Required:
/// - `value(&x, &data)`: evaluate `ℓ(x)`. Returning a non-finite value is
///   allowed and signals an inadmissible point; it is penalized rather
///   than treated as an error. Reserve `Err` for malformed inputs.
/// - `check(&x, &data)`: reject an obviously invalid starting point or
///   sample. Called once before optimization.
///
/// Optional:
/// - `grad(&x, &data)`: analytic `∇ℓ(x)`. Finite differences are used
///   when this is not overridden.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`; other
/// names yield `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols`: stopping tolerances and iteration cap.
/// - `line_searcher`: line search used by L-BFGS.
/// - `verbose`: log the starting point and, with the `obs_slog` feature,
///   attach a terminal observer.
/// - `lbfgs_mem`: L-BFGS history size; `None` uses
///   [`DEFAULT_LBFGS_MEM`](crate::optimization::loglik_optimizer::DEFAULT_LBFGS_MEM).
///
/// Default:
/// - `tol_grad = 1e-6`, `tol_cost = 1e-10`, `max_iter = 300`
/// - `MoreThuente`, not verbose, default memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Validated constructor.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping tolerances and iteration cap.
///
/// Any field may be `None`, but at least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of a maximization run.
///
/// - `theta_hat`: best parameters found, in the model's own space (bounds
///   already applied).
/// - `value`: `ℓ(θ̂)` as seen by the solver; a diverged best point shows up
///   as `-DIVERGENCE_COST`.
/// - `converged`: whether the solver terminated on one of its stopping
///   rules. `false` for iteration-cap exits and backend failures.
/// - `status`: human-readable termination status.
/// - `iterations`, `fn_evals`: solver counters.
/// - `grad_norm`: norm of the last gradient in solver space, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// `MaxItersReached` and `NotTerminated` count as not converged.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match &termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = !matches!(
                    reason,
                    argmin::core::TerminationReason::MaxItersReached
                        | argmin::core::TerminationReason::Interrupt
                        | argmin::core::TerminationReason::Timeout
                );
                (converged, format!("{termination:?}"))
            }
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }

    /// Outcome for a run whose backend failed, built from the best point
    /// evaluated before the failure.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn from_failure(theta_hat: Theta, value: f64, reason: &str) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta_hat))?;
        validate_value(value)?;
        Ok(Self {
            theta_hat,
            value,
            converged: false,
            status: format!("Backend failure: {reason}"),
            iterations: 0,
            fn_evals: FnEvalMap::new(),
            grad_norm: None,
        })
    }

    /// Outcome for a point produced by the model-space projected-gradient
    /// refinement. `grad_norm` carries the projected-gradient sup-norm.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn from_refinement(
        theta_hat: Theta, value: f64, iterations: usize, pg_norm: f64, converged: bool,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta_hat))?;
        validate_value(value)?;
        Ok(Self {
            theta_hat,
            value,
            converged,
            status: format!("Projected-gradient refinement (|Pg|_inf = {pg_norm:.3e})"),
            iterations,
            fn_evals: FnEvalMap::new(),
            grad_norm: Some(pg_norm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Parsing of line-search names.
    // - Validation in `Tolerances::new` and `MLEOptions::new`.
    // - Mapping of argmin termination states onto `converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively; unknown names fail.
    //
    // Given
    // -----
    // - "hagerZHANG", "MoreThuente" and "bfgs".
    //
    // Expect
    // ------
    // - The first two parse; the third yields `InvalidLineSearch`.
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("hagerZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MoreThuente".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!(matches!(
            "bfgs".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Option constructors reject empty or zero settings.
    //
    // Given
    // -----
    // - All-`None` tolerances, `max_iter = 0`, and `lbfgs_mem = 0`.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided`, `InvalidMaxIter`, `InvalidLBFGSMem`.
    fn option_constructors_reject_degenerate_settings() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), None, None).expect("Tolerances should be valid");

        // Act & Assert
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(matches!(
            MLEOptions::new(tols, LineSearcher::MoreThuente, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The default options are a valid configuration.
    //
    // Given
    // -----
    // - `MLEOptions::default()`.
    //
    // Expect
    // ------
    // - Its tolerances pass `Tolerances::new` unchanged.
    fn default_options_are_valid() {
        // Arrange
        let opts = MLEOptions::default();

        // Act
        let rebuilt = Tolerances::new(opts.tols.tol_grad, opts.tols.tol_cost, opts.tols.max_iter);

        // Assert
        assert_eq!(rebuilt, Ok(opts.tols));
    }

    #[test]
    // Purpose
    // -------
    // Hitting the iteration cap is reported as not converged, while a
    // tolerance-based exit is converged.
    //
    // Given
    // -----
    // - `MaxItersReached` and `SolverConverged` terminations.
    //
    // Expect
    // ------
    // - `converged == false` and `true` respectively.
    fn outcome_maps_termination_reasons() {
        // Arrange
        let theta = array![0.1, 0.2];

        // Act
        let capped = OptimOutcome::new(
            Some(theta.clone()),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            300,
            FnEvalMap::new(),
            None,
        )
        .expect("outcome should build");
        let done = OptimOutcome::new(
            Some(theta),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            12,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .expect("outcome should build");

        // Assert
        assert!(!capped.converged);
        assert!(done.converged);
        assert_eq!(done.grad_norm, Some(5.0));
    }
}
