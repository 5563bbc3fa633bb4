//! Custom assertions for test verification

use std::fmt::Debug;
use std::hash::Hash;

use ide_tabulation::{IdeValue, SolverResults};

/// Every (node, fact, value) as strings, fully sorted
pub fn snapshot<D, L>(results: SolverResults<'_, String, D, L>) -> Vec<(String, String, String)>
where
    D: Clone + Eq + Hash + Debug,
    L: IdeValue,
{
    let mut entries: Vec<(String, String, String)> = results
        .all_result_entries()
        .into_iter()
        .map(|(n, d, l)| (n.clone(), format!("{:?}", d), format!("{:?}", l)))
        .collect();
    entries.sort();
    entries
}

/// Facts holding at `node`, sorted
pub fn facts_at<D, L>(results: SolverResults<'_, String, D, L>, node: &str) -> Vec<D>
where
    D: Clone + Eq + Hash + Debug + Ord,
    L: IdeValue,
{
    let mut facts: Vec<D> = results
        .ifds_results_at(&node.to_string())
        .into_iter()
        .collect();
    facts.sort();
    facts
}

/// Assert the facts at `node` are exactly `expected`
pub fn assert_facts_at<D, L>(results: SolverResults<'_, String, D, L>, node: &str, expected: &[D])
where
    D: Clone + Eq + Hash + Debug + Ord,
    L: IdeValue,
{
    let mut expected = expected.to_vec();
    expected.sort();
    assert_eq!(
        facts_at(results, node),
        expected,
        "unexpected facts at {}",
        node
    );
}

/// Assert that the Λ fact is present wherever anything holds
pub fn assert_zero_everywhere<D, L>(results: SolverResults<'_, String, D, L>)
where
    D: Clone + Eq + Hash + Debug,
    L: IdeValue,
{
    let zero = results.zero_value();
    for node in results.nodes() {
        assert!(
            results.ifds_results_at(node).contains(zero),
            "zero fact missing at {}",
            node
        );
    }
}
