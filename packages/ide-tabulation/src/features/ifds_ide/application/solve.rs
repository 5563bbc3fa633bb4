//! One-call solving
//!
//! # Usage
//! ```rust,ignore
//! use ide_tabulation::features::ifds_ide::solve_ide;
//!
//! let (results, stats) = solve_ide(problem, &graph)?;
//! let value = results.result_at(&node, &fact);
//! ```

use crate::config::{SolverConfig, Validatable};
use crate::errors::Result;
use crate::features::ifds_ide::domain::BinaryDomain;
use crate::features::ifds_ide::infrastructure::{IdeSolver, OwningSolverResults, SolverStatistics};
use crate::features::ifds_ide::ports::{Icfg, IdeProblem, IfdsProblem};

/// Results and statistics of a finished run
pub type SolveOutcome<N, D, L> = (OwningSolverResults<N, D, L>, SolverStatistics);

/// Validate the problem's configuration, solve, and move the results out
pub fn solve_ide<I, P>(problem: P, icfg: &I) -> Result<SolveOutcome<I::Node, P::Fact, P::Value>>
where
    I: Icfg,
    P: IdeProblem<I>,
{
    let config = problem.solver_config();
    solve_ide_with_config(problem, icfg, config)
}

/// `solve_ide` with an explicit configuration
pub fn solve_ide_with_config<I, P>(
    problem: P,
    icfg: &I,
    config: SolverConfig,
) -> Result<SolveOutcome<I::Node, P::Fact, P::Value>>
where
    I: Icfg,
    P: IdeProblem<I>,
{
    config.validate()?;

    let mut solver = IdeSolver::with_config(problem, icfg, config);
    solver.solve();
    let stats = solver.statistics();
    tracing::debug!(
        path_edges = stats.num_path_edges_propagated,
        summary_reuses = stats.num_summary_reuses,
        "solve_ide finished"
    );
    Ok((solver.consume_solver_results(), stats))
}

/// IFDS counterpart of `solve_ide`; values are `BinaryDomain`
pub fn solve_ifds<I, P>(problem: P, icfg: &I) -> Result<SolveOutcome<I::Node, P::Fact, BinaryDomain>>
where
    I: Icfg,
    P: IfdsProblem<I>,
{
    let config = problem.solver_config();
    config.validate()?;

    let mut solver = IdeSolver::from_ifds_problem_with_config(problem, icfg, config);
    solver.solve();
    let stats = solver.statistics();
    Ok((solver.consume_solver_results(), stats))
}
