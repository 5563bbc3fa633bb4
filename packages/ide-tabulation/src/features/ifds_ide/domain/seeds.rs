//! Initial seeds
//!
//! `(node, fact, value)` triples the analysis starts from. The solver adds
//! the zero fact at every seed node that lacks it.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::hash::Hash;

use super::lattice::{BinaryDomain, IdeValue};

/// Seeds grouped by node
#[derive(Debug, Clone)]
pub struct InitialSeeds<N: Ord, D, L> {
    seeds: BTreeMap<N, FxHashMap<D, L>>,
}

impl<N: Ord, D, L> Default for InitialSeeds<N, D, L> {
    fn default() -> Self {
        Self {
            seeds: BTreeMap::new(),
        }
    }
}

impl<N, D, L> InitialSeeds<N, D, L>
where
    N: Ord + Clone,
    D: Eq + Hash + Clone,
    L: IdeValue,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a seed, joining with an existing value for the same (node, fact)
    pub fn add_seed(&mut self, node: N, fact: D, value: L) {
        let facts = self.seeds.entry(node).or_default();
        match facts.get_mut(&fact) {
            Some(existing) => *existing = existing.join(&value),
            None => {
                facts.insert(fact, value);
            }
        }
    }

    pub fn contains_initial_seeds_for(&self, node: &N) -> bool {
        self.seeds.contains_key(node)
    }

    pub fn count_initial_seeds(&self) -> usize {
        self.seeds.values().map(|facts| facts.len()).sum()
    }

    pub fn count_initial_seeds_at(&self, node: &N) -> usize {
        self.seeds.get(node).map_or(0, |facts| facts.len())
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn facts_at(&self, node: &N) -> Option<&FxHashMap<D, L>> {
        self.seeds.get(node)
    }

    /// Seeded nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.seeds.keys()
    }

    /// All seeds as `(node, fact, value)`
    pub fn iter(&self) -> impl Iterator<Item = (&N, &D, &L)> {
        self.seeds
            .iter()
            .flat_map(|(n, facts)| facts.iter().map(move |(d, l)| (n, d, l)))
    }

    /// Make sure `zero` is present at every seed node, with value `value`
    pub(crate) fn ensure_zero(&mut self, zero: &D, value: &L) {
        for facts in self.seeds.values_mut() {
            facts
                .entry(zero.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

impl<N, D> InitialSeeds<N, D, BinaryDomain>
where
    N: Ord + Clone,
    D: Eq + Hash + Clone,
{
    /// IFDS seeds: every fact holds (`Bottom`) at its node
    pub fn from_ifds<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
    {
        let mut result = Self::new();
        for (node, fact) in seeds {
            result.add_seed(node, fact, BinaryDomain::Bottom);
        }
        result
    }
}
