/*
 * Solver Results
 *
 * Read-only views of the value table:
 * - `SolverResults`: borrowed from a finalized solver
 * - `OwningSolverResults`: moved out of the solver
 *
 * Absent (node, fact) pairs read as top. Exports (`dump_results`,
 * `get_as_json`) iterate in sorted order, independent of solve order.
 */

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::io::Write;

use crate::errors::Result;
use crate::features::ifds_ide::domain::IdeValue;
use crate::features::ifds_ide::ports::{Icfg, IdeProblem};
use crate::shared::utils::Table;

/// Borrowed results view
#[derive(Debug)]
pub struct SolverResults<'s, N, D, L> {
    values: &'s Table<N, D, L>,
    zero: &'s D,
}

impl<N, D, L> Clone for SolverResults<'_, N, D, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, D, L> Copy for SolverResults<'_, N, D, L> {}

impl<'s, N, D, L> SolverResults<'s, N, D, L>
where
    N: Clone + Eq + Hash + Ord + Debug,
    D: Clone + Eq + Hash + Debug,
    L: IdeValue,
{
    pub fn new(values: &'s Table<N, D, L>, zero: &'s D) -> Self {
        Self { values, zero }
    }

    /// Value of `fact` at `node`; top if absent
    pub fn result_at(&self, node: &N, fact: &D) -> L {
        self.values.get(node, fact).cloned().unwrap_or_else(L::top)
    }

    /// All facts at `node` with their values
    pub fn results_at(&self, node: &N, strip_zero: bool) -> FxHashMap<D, L> {
        let Some(row) = self.values.row(node) else {
            return FxHashMap::default();
        };
        row.iter()
            .filter(|(d, _)| !(strip_zero && *d == self.zero))
            .map(|(d, l)| (d.clone(), l.clone()))
            .collect()
    }

    /// Facts holding at `node` (IFDS view)
    pub fn ifds_results_at(&self, node: &N) -> FxHashSet<D> {
        self.values
            .row(node)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every (node, fact, value), sorted by node
    pub fn all_result_entries(&self) -> Vec<(&'s N, &'s D, &'s L)> {
        let mut entries: Vec<_> = self.values.cells().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Nodes with at least one result, sorted
    pub fn nodes(&self) -> Vec<&'s N> {
        let mut nodes: Vec<&N> = self.values.row_keys().collect();
        nodes.sort();
        nodes
    }

    pub fn zero_value(&self) -> &'s D {
        self.zero
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sorted `(fact, value)` strings at `node`, rendered by `problem`
    fn rendered_facts_at<I, P>(&self, node: &N, problem: &P) -> Vec<(String, String)>
    where
        I: Icfg<Node = N>,
        P: IdeProblem<I, Fact = D, Value = L>,
    {
        let mut facts: Vec<(String, String)> = self
            .values
            .row(node)
            .map(|row| {
                row.iter()
                    .map(|(d, l)| (problem.fact_to_string(d), problem.value_to_string(l)))
                    .collect()
            })
            .unwrap_or_default();
        facts.sort();
        facts
    }

    /// Textual report grouped by function, nodes sorted
    ///
    /// Facts and values are rendered with the problem's `fact_to_string`
    /// and `value_to_string`.
    pub fn dump_results<I, P, W>(&self, icfg: &I, problem: &P, writer: &mut W) -> Result<()>
    where
        I: Icfg<Node = N>,
        P: IdeProblem<I, Fact = D, Value = L>,
        W: Write,
    {
        writeln!(writer, "***************************************************************")?;
        writeln!(writer, "*                  Raw IDE solver results                     *")?;
        writeln!(writer, "***************************************************************")?;

        let mut by_function: std::collections::BTreeMap<I::Function, Vec<&N>> = Default::default();
        for node in self.nodes() {
            by_function
                .entry(icfg.function_of(node))
                .or_default()
                .push(node);
        }

        for (function, nodes) in by_function {
            writeln!(writer)?;
            writeln!(
                writer,
                "============ Results for function '{}' ============",
                icfg.function_name(&function)
            )?;
            for node in nodes {
                writeln!(writer)?;
                writeln!(writer, "N: {}", icfg.statement_id(node))?;
                writeln!(writer, "---------")?;
                for (fact, value) in self.rendered_facts_at(node, problem) {
                    writeln!(writer, "\tD: {} | V: {}", fact, value)?;
                }
            }
        }
        writeln!(writer)?;
        Ok(())
    }

    /// `{"DataFlow": {"<function>::<stmt>": {"Facts": [[fact, value], ...]}}}`
    ///
    /// Renders as the string `"EMPTY"` when there are no results.
    pub fn get_as_json<I, P>(&self, icfg: &I, problem: &P) -> serde_json::Value
    where
        I: Icfg<Node = N>,
        P: IdeProblem<I, Fact = D, Value = L>,
    {
        if self.values.is_empty() {
            return serde_json::Value::String("EMPTY".to_string());
        }

        let mut data_flow = serde_json::Map::new();
        for node in self.nodes() {
            let key = format!(
                "{}::{}",
                icfg.function_name(&icfg.function_of(node)),
                icfg.statement_id(node)
            );
            let facts: Vec<serde_json::Value> = self
                .rendered_facts_at(node, problem)
                .into_iter()
                .map(|(fact, value)| serde_json::json!([fact, value]))
                .collect();
            data_flow.insert(key, serde_json::json!({ "Facts": facts }));
        }
        serde_json::json!({ "DataFlow": data_flow })
    }
}

/// Results moved out of a solver
#[derive(Debug, Clone)]
pub struct OwningSolverResults<N, D, L> {
    values: Table<N, D, L>,
    zero: D,
}

impl<N, D, L> OwningSolverResults<N, D, L>
where
    N: Clone + Eq + Hash + Ord + Debug,
    D: Clone + Eq + Hash + Debug,
    L: IdeValue,
{
    pub fn new(values: Table<N, D, L>, zero: D) -> Self {
        Self { values, zero }
    }

    /// Borrowed view
    pub fn get(&self) -> SolverResults<'_, N, D, L> {
        SolverResults::new(&self.values, &self.zero)
    }

    pub fn result_at(&self, node: &N, fact: &D) -> L {
        self.get().result_at(node, fact)
    }

    pub fn results_at(&self, node: &N, strip_zero: bool) -> FxHashMap<D, L> {
        self.get().results_at(node, strip_zero)
    }

    pub fn ifds_results_at(&self, node: &N) -> FxHashSet<D> {
        self.get().ifds_results_at(node)
    }
}
