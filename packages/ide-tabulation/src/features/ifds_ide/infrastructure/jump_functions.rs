/*
 * Jump-Function Table
 *
 * (source fact d1, target node n, target fact d2) → edge function
 *
 * Key Features:
 * - One arena of records, three index maps into it:
 *   - forward:   (d1, n) → records
 *   - reverse:   (n, d2) → records
 *   - by target: n       → records
 * - At most one edge function per (d1, n, d2) key
 * - Absence reads as AllTop; AllTop is never stored
 *
 * The table does not join. Callers join with `function(..)` first and store
 * the result with `add_function`.
 */

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::features::ifds_ide::domain::{EdgeFn, IdeValue};

#[derive(Debug, Clone)]
struct JumpFnRecord<N, D, L: IdeValue> {
    source_fact: D,
    target: N,
    target_fact: D,
    function: EdgeFn<L>,
}

/// Jump functions with forward, reverse and by-target lookup
#[derive(Debug, Clone)]
pub struct JumpFunctions<N, D, L: IdeValue> {
    /// `None` marks a removed record
    records: Vec<Option<JumpFnRecord<N, D, L>>>,
    key_index: FxHashMap<(D, N, D), usize>,
    forward: FxHashMap<(D, N), Vec<usize>>,
    reverse: FxHashMap<(N, D), Vec<usize>>,
    by_target: FxHashMap<N, Vec<usize>>,
    live: usize,
}

impl<N, D, L: IdeValue> Default for JumpFunctions<N, D, L> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            key_index: FxHashMap::default(),
            forward: FxHashMap::default(),
            reverse: FxHashMap::default(),
            by_target: FxHashMap::default(),
            live: 0,
        }
    }
}

impl<N, D, L> JumpFunctions<N, D, L>
where
    N: Clone + Eq + Hash,
    D: Clone + Eq + Hash,
    L: IdeValue,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the edge function for (d1, n, d2)
    pub fn add_function(&mut self, source_fact: D, target: N, target_fact: D, function: EdgeFn<L>) {
        if function.is_all_top() {
            return;
        }

        let key = (source_fact, target, target_fact);
        if let Some(&idx) = self.key_index.get(&key) {
            if let Some(record) = self.records[idx].as_mut() {
                record.function = function;
                return;
            }
        }

        let (source_fact, target, target_fact) = key;
        let idx = self.records.len();
        self.forward
            .entry((source_fact.clone(), target.clone()))
            .or_default()
            .push(idx);
        self.reverse
            .entry((target.clone(), target_fact.clone()))
            .or_default()
            .push(idx);
        self.by_target.entry(target.clone()).or_default().push(idx);
        self.key_index.insert(
            (source_fact.clone(), target.clone(), target_fact.clone()),
            idx,
        );
        self.records.push(Some(JumpFnRecord {
            source_fact,
            target,
            target_fact,
            function,
        }));
        self.live += 1;
    }

    /// Edge function for (d1, n, d2), if any
    pub fn function(&self, source_fact: &D, target: &N, target_fact: &D) -> Option<&EdgeFn<L>> {
        let key = (source_fact.clone(), target.clone(), target_fact.clone());
        self.key_index
            .get(&key)
            .and_then(|&idx| self.records[idx].as_ref())
            .map(|record| &record.function)
    }

    /// All (d2, f) with a jump function (d1, n, d2)
    pub fn forward_lookup(&self, source_fact: &D, target: &N) -> Option<Vec<(D, EdgeFn<L>)>> {
        let indices = self.forward.get(&(source_fact.clone(), target.clone()))?;
        let entries = self.collect(indices, |r| (r.target_fact.clone(), r.function.clone()));
        (!entries.is_empty()).then_some(entries)
    }

    /// All (d1, f) with a jump function (d1, n, d2)
    pub fn reverse_lookup(&self, target: &N, target_fact: &D) -> Option<Vec<(D, EdgeFn<L>)>> {
        let indices = self.reverse.get(&(target.clone(), target_fact.clone()))?;
        let entries = self.collect(indices, |r| (r.source_fact.clone(), r.function.clone()));
        (!entries.is_empty()).then_some(entries)
    }

    /// All (d1, d2, f) ending at node `n`
    pub fn lookup_by_target(&self, target: &N) -> Vec<(D, D, EdgeFn<L>)> {
        self.by_target.get(target).map_or_else(Vec::new, |indices| {
            self.collect(indices, |r| {
                (
                    r.source_fact.clone(),
                    r.target_fact.clone(),
                    r.function.clone(),
                )
            })
        })
    }

    /// Remove the entry for (d1, n, d2)
    pub fn remove_function(&mut self, source_fact: &D, target: &N, target_fact: &D) -> Option<EdgeFn<L>> {
        let key = (source_fact.clone(), target.clone(), target_fact.clone());
        let idx = self.key_index.remove(&key)?;
        let record = self.records[idx].take()?;

        let unlink = |indices: Option<&mut Vec<usize>>| {
            if let Some(indices) = indices {
                indices.retain(|&i| i != idx);
            }
        };
        unlink(
            self.forward
                .get_mut(&(record.source_fact.clone(), record.target.clone())),
        );
        unlink(
            self.reverse
                .get_mut(&(record.target.clone(), record.target_fact.clone())),
        );
        unlink(self.by_target.get_mut(&record.target));

        self.live -= 1;
        Some(record.function)
    }

    /// Iterate over all (d1, n, d2, f)
    pub fn iter(&self) -> impl Iterator<Item = (&D, &N, &D, &EdgeFn<L>)> {
        self.records
            .iter()
            .flatten()
            .map(|r| (&r.source_fact, &r.target, &r.target_fact, &r.function))
    }

    /// Number of stored jump functions
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// One line per jump function, sorted
    pub fn print(
        &self,
        node_label: impl Fn(&N) -> String,
        fact_label: impl Fn(&D) -> String,
    ) -> String {
        let mut lines: Vec<String> = self
            .iter()
            .map(|(d1, n, d2, f)| {
                format!(
                    "{} | <{}> --> <{}> : {}",
                    node_label(n),
                    fact_label(d1),
                    fact_label(d2),
                    f
                )
            })
            .collect();
        lines.sort();
        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn collect<T>(&self, indices: &[usize], map: impl Fn(&JumpFnRecord<N, D, L>) -> T) -> Vec<T> {
        indices
            .iter()
            .filter_map(|&idx| self.records[idx].as_ref())
            .map(map)
            .collect()
    }
}
