/*
 * Step-wise Solver API
 *
 * Composition layer over initialize / next / next_n / finalize:
 *
 *   solve()                          initialize; while next; finalize
 *   solve_until(pred, interval)      batched stepping, pred polled every interval
 *   solve_with_timeout(t, interval)  solve_until with "elapsed >= t"
 *   solve_with_async_cancellation    flag checked after every step
 *   continue_*                       the same, for a suspended solver
 *
 * Cancellation returns `None` and leaves the solver resumable. Suspension
 * happens only between whole path edges.
 */

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::ide_solver::{IdeSolver, SolverState, D, L, N};
use super::solver_results::{OwningSolverResults, SolverResults};
use crate::config::SolverStrategy;
use crate::errors::Result;
use crate::features::ifds_ide::ports::{Icfg, IdeProblem};

/// Worklist steps per millisecond of check interval before the first estimate
const INITIAL_STEPS_PER_MS: usize = 500;

type Results<'s, I, P> = SolverResults<'s, N<I>, D<I, P>, L<I, P>>;

impl<'a, P, I> IdeSolver<'a, P, I>
where
    I: Icfg,
    P: IdeProblem<I>,
{
    // ========================================
    // Steps
    // ========================================

    /// Submit the initial seeds; true if there is work to do
    ///
    /// # Panics
    /// If the solver was already initialized.
    pub fn initialize(&mut self) -> bool {
        assert!(
            self.state == SolverState::Fresh,
            "initialize() called on a solver that is not fresh"
        );
        self.phase_one_start = Some(Instant::now());
        self.submit_initial_seeds();
        self.state = SolverState::Initialized;
        !self.worklist.is_empty()
    }

    /// Process one path edge; true if more work remains
    ///
    /// # Panics
    /// If the solver is not initialized or already finalized.
    pub fn next(&mut self) -> bool {
        assert!(
            self.state == SolverState::Initialized,
            "next() requires an initialized, non-finalized solver"
        );
        let Some((edge, carried)) = self.worklist.pop() else {
            return false;
        };
        self.stats.num_worklist_iterations += 1;

        let function = match self.config.strategy {
            SolverStrategy::PropagateOver => self.jump_function(&edge),
            SolverStrategy::PropagateOnto => carried,
        };
        self.propagate(edge, function);
        !self.worklist.is_empty()
    }

    /// Up to `max_steps` calls of `next()`; true if more work remains
    pub fn next_n(&mut self, max_steps: usize) -> bool {
        for done in 0..max_steps {
            if !self.next() {
                tracing::trace!(steps = done + 1, "next_n: worklist drained");
                return false;
            }
        }
        true
    }

    /// Run Phase II and reporting; the solver becomes read-only
    ///
    /// # Panics
    /// If the solver is not initialized, already finalized, or the worklist
    /// is not drained.
    pub fn finalize(&mut self) -> Results<'_, I, P> {
        self.finalize_internal();
        self.solver_results()
    }

    fn finalize_internal(&mut self) {
        assert!(
            self.state == SolverState::Initialized,
            "finalize() requires an initialized, non-finalized solver"
        );
        assert!(
            self.worklist.is_empty(),
            "finalize() called before the worklist was drained"
        );

        self.stats.phase_one_ms = self
            .phase_one_start
            .map_or(0, |start| start.elapsed().as_millis() as u64);
        tracing::info!(
            path_edges = self.stats.num_path_edges_propagated,
            jump_functions = self.jump_fns.len(),
            elapsed_ms = self.stats.phase_one_ms,
            "phase I finished"
        );

        if self.config.compute_values {
            let start = Instant::now();
            self.compute_values();
            self.stats.phase_two_ms = start.elapsed().as_millis() as u64;
            tracing::info!(
                values = self.values.len(),
                elapsed_ms = self.stats.phase_two_ms,
                "phase II finished"
            );
        }

        self.stats.cache = self.cache.statistics().clone();

        if self.config.emit_esg {
            if let Some(dot) = self.esg_as_dot() {
                tracing::info!(esg = %dot, "exploded supergraph");
            }
        }
        self.state = SolverState::Finalized;
    }

    /// Borrowed view of the value table
    pub fn solver_results(&self) -> Results<'_, I, P> {
        SolverResults::new(&self.values, &self.zero)
    }

    /// Move the value table out of the solver
    pub fn consume_solver_results(self) -> OwningSolverResults<N<I>, D<I, P>, L<I, P>> {
        OwningSolverResults::new(self.values, self.zero)
    }

    /// `SolverResults::get_as_json`, rendered by this solver's problem
    pub fn results_as_json(&self) -> serde_json::Value {
        self.solver_results().get_as_json(self.icfg, &self.problem)
    }

    /// `SolverResults::dump_results`, rendered by this solver's problem
    pub fn dump_results<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.solver_results().dump_results(self.icfg, &self.problem, writer)
    }

    // ========================================
    // Whole runs
    // ========================================

    pub fn solve(&mut self) -> Results<'_, I, P> {
        if self.initialize() {
            while self.next() {}
        }
        self.finalize()
    }

    /// Solve, polling `cancellation_requested` about every `interval`
    ///
    /// Returns `None` if cancelled; the solver can then be resumed with a
    /// `continue_*` method.
    pub fn solve_until<F>(&mut self, mut cancellation_requested: F, interval: Duration) -> Option<Results<'_, I, P>>
    where
        F: FnMut() -> bool,
    {
        if self.initialize() {
            if cancellation_requested() {
                tracing::debug!("cancelled right after initialization");
                return None;
            }
            if !self.run_until(&mut cancellation_requested, interval) {
                return None;
            }
        }
        self.finish_unless_cancelled(cancellation_requested())
    }

    /// Solve unless `timeout` elapses first
    pub fn solve_with_timeout(&mut self, timeout: Duration, interval: Duration) -> Option<Results<'_, I, P>> {
        let start = Instant::now();
        self.solve_until(move || start.elapsed() >= timeout, interval)
    }

    /// `solve_with_timeout` polling at the configured `check_interval_ms`
    pub fn solve_with_timeout_default(&mut self, timeout: Duration) -> Option<Results<'_, I, P>> {
        let interval = self.config.check_interval();
        self.solve_with_timeout(timeout, interval)
    }

    /// Solve, checking `is_cancelled` after every step
    pub fn solve_with_async_cancellation(&mut self, is_cancelled: &AtomicBool) -> Option<Results<'_, I, P>> {
        if self.initialize() {
            if is_cancelled.load(Ordering::Acquire) {
                return None;
            }
            if !self.run_with_flag(is_cancelled) {
                return None;
            }
        }
        self.finish_unless_cancelled(is_cancelled.load(Ordering::Acquire))
    }

    // ========================================
    // Resuming a suspended solver
    // ========================================

    /// Drain the worklist and finalize
    ///
    /// # Panics
    /// If the solver is fresh or finalized.
    pub fn continue_solving(&mut self) -> Results<'_, I, P> {
        self.assert_resumable();
        while self.next() {}
        self.finalize()
    }

    pub fn continue_until<F>(&mut self, mut cancellation_requested: F, interval: Duration) -> Option<Results<'_, I, P>>
    where
        F: FnMut() -> bool,
    {
        self.assert_resumable();
        if !self.run_until(&mut cancellation_requested, interval) {
            return None;
        }
        self.finish_unless_cancelled(cancellation_requested())
    }

    pub fn continue_with_timeout(&mut self, timeout: Duration, interval: Duration) -> Option<Results<'_, I, P>> {
        let start = Instant::now();
        self.continue_until(move || start.elapsed() >= timeout, interval)
    }

    pub fn continue_with_async_cancellation(&mut self, is_cancelled: &AtomicBool) -> Option<Results<'_, I, P>> {
        self.assert_resumable();
        if !self.run_with_flag(is_cancelled) {
            return None;
        }
        self.finish_unless_cancelled(is_cancelled.load(Ordering::Acquire))
    }

    // ========================================
    // Internals
    // ========================================

    fn assert_resumable(&self) {
        assert!(
            self.state == SolverState::Initialized,
            "continue_*() requires a suspended solver (initialized, not finalized)"
        );
    }

    fn finish_unless_cancelled(&mut self, cancelled: bool) -> Option<Results<'_, I, P>> {
        if cancelled {
            tracing::debug!("cancelled after the worklist drained");
            return None;
        }
        Some(self.finalize())
    }

    /// Batched stepping; false if cancelled before the worklist drained
    ///
    /// The batch size is re-estimated after every check so that one batch
    /// takes about `interval`: new = (2 * old + measured) / 3.
    fn run_until<F>(&mut self, cancellation_requested: &mut F, interval: Duration) -> bool
    where
        F: FnMut() -> bool,
    {
        let interval_ms = (interval.as_millis() as usize).max(1);
        let mut batch = interval_ms.saturating_mul(INITIAL_STEPS_PER_MS);
        let mut last_check = Instant::now();

        while self.next_n(batch) {
            let now = Instant::now();
            let elapsed_ms = now.duration_since(last_check).as_secs_f64() * 1000.0;
            last_check = now;

            if cancellation_requested() {
                tracing::debug!(batch, "cancellation requested");
                return false;
            }

            let steps_per_ms = batch as f64 / elapsed_ms.max(f64::EPSILON);
            let measured = (steps_per_ms * interval_ms as f64).min(usize::MAX as f64) as usize;
            batch = ((2 * batch as u128 + measured as u128) / 3).max(1) as usize;
        }
        true
    }

    /// Single stepping with a shared flag; false if cancelled
    fn run_with_flag(&mut self, is_cancelled: &AtomicBool) -> bool {
        while self.next() {
            if is_cancelled.load(Ordering::Acquire) {
                tracing::debug!("cancelled by flag");
                return false;
            }
        }
        true
    }
}
