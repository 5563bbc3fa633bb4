//! Linear constant propagation end to end (IDE)

mod common;

use common::*;
use ide_tabulation::features::linear_constant::{LcaFact, LcaValue, LinearConstantProblem};
use ide_tabulation::shared::models::{BinOp, Expr, Operand, Statement};
use ide_tabulation::{solve_ide, IdeSolver, ProgramGraph, SolverConfig, SolverStrategy};
use pretty_assertions::assert_eq;

fn node(id: &str) -> String {
    id.to_string()
}

fn var(name: &str) -> LcaFact {
    LcaFact::var(name)
}

fn solve_snapshot(graph: &ProgramGraph, strategy: SolverStrategy) -> Vec<(String, String, String)> {
    let config = SolverConfig::default().strategy(strategy);
    let problem = LinearConstantProblem::new(graph).with_solver_config(config);
    let (results, _) = solve_ide(problem, graph).unwrap();
    snapshot(results.get())
}

#[test]
fn test_two_calls_return_their_own_constants() {
    let graph = lca_two_calls();
    let (results, _) = solve_ide(LinearConstantProblem::new(&graph), &graph).unwrap();

    let exit = node("main::3");
    assert_eq!(results.result_at(&exit, &var("a")), LcaValue::Const(4));
    assert_eq!(results.result_at(&exit, &var("b")), LcaValue::Const(11));
    // Return site of the first call: `b` not assigned yet
    assert_eq!(results.result_at(&node("main::2"), &var("a")), LcaValue::Const(4));
    assert_eq!(results.result_at(&node("main::2"), &var("b")), LcaValue::Top);
    // One body, two contexts
    assert_eq!(results.result_at(&node("foo::1"), &var("x")), LcaValue::Bottom);
}

#[test]
fn test_callee_body_is_summarised_once() {
    let count = |sites: usize| {
        let graph = lca_call_sites(sites);
        let mut solver = IdeSolver::new(LinearConstantProblem::new(&graph), &graph);
        solver.solve();
        let in_foo = solver
            .jump_functions()
            .iter()
            .filter(|(_, n, _, _)| n.starts_with("foo::"))
            .count();
        (in_foo, solver.statistics().cache.normal_flow.constructions)
    };

    let (few_jump_fns, few_flows) = count(2);
    let (many_jump_fns, many_flows) = count(10);
    assert_eq!(few_jump_fns, many_jump_fns);
    // Calls do not add normal-flow queries, and foo's body is queried once
    assert_eq!(few_flows, many_flows);
}

#[test]
fn test_many_call_sites_keep_distinct_values() {
    let graph = lca_call_sites(10);
    let (results, _) = solve_ide(LinearConstantProblem::new(&graph), &graph).unwrap();
    let exit = node("main::11");
    for i in 0..10 {
        assert_eq!(
            results.result_at(&exit, &var(&format!("r{}", i))),
            LcaValue::Const(2 * i as i64)
        );
    }
}

#[test]
fn test_direct_recursion() {
    let graph = lca_direct_recursion();
    let (results, _) = solve_ide(LinearConstantProblem::new(&graph), &graph).unwrap();
    assert_eq!(results.result_at(&node("main::2"), &var("r")), LcaValue::Const(7));
    assert_eq!(results.result_at(&node("rec::3"), &var("x")), LcaValue::Const(7));
}

#[test]
fn test_mutual_recursion() {
    let graph = lca_mutual_recursion();
    let (results, _) = solve_ide(LinearConstantProblem::new(&graph), &graph).unwrap();
    assert_eq!(results.result_at(&node("main::2"), &var("r")), LcaValue::Const(1));
    // 10, 8, 6, ... meet at the entry of `even`
    assert_eq!(results.result_at(&node("even::1"), &var("x")), LcaValue::Bottom);
}

#[test]
fn test_loop_widens_counter_but_keeps_invariant() {
    let mut graph = ProgramGraph::new();
    add_cfg_function(
        &mut graph,
        "main",
        &[],
        vec![
            Statement::assign("k", Expr::constant(5)),
            Statement::assign("i", Expr::constant(0)),
            Statement::assign("i", Expr::binary(BinOp::Add, Operand::var("i"), Operand::Const(1))),
            Statement::assign("j", Expr::binary(BinOp::Mul, Operand::var("k"), Operand::Const(2))),
            Statement::ret(None),
        ],
        &[(0, 1), (1, 2), (2, 3), (3, 2), (3, 4)],
        &[4],
    );

    let (results, _) = solve_ide(LinearConstantProblem::new(&graph), &graph).unwrap();
    let exit = node("main::4");
    assert_eq!(results.result_at(&exit, &var("i")), LcaValue::Bottom);
    assert_eq!(results.result_at(&exit, &var("k")), LcaValue::Const(5));
    assert_eq!(results.result_at(&exit, &var("j")), LcaValue::Const(10));
}

#[test]
fn test_strategies_agree() {
    for graph in [
        lca_two_calls(),
        lca_call_sites(4),
        lca_direct_recursion(),
        lca_mutual_recursion(),
    ] {
        assert_eq!(
            solve_snapshot(&graph, SolverStrategy::PropagateOver),
            solve_snapshot(&graph, SolverStrategy::PropagateOnto)
        );
    }
}

#[test]
fn test_without_value_computation_everything_is_top() {
    let graph = lca_two_calls();
    let problem = LinearConstantProblem::new(&graph)
        .with_solver_config(SolverConfig::default().compute_values(false));
    let (results, stats) = solve_ide(problem, &graph).unwrap();

    assert!(results.get().is_empty());
    assert_eq!(results.result_at(&node("main::3"), &var("a")), LcaValue::Top);
    assert_eq!(stats.num_value_computations, 0);
    assert!(stats.num_path_edges_propagated > 0);
}

#[test]
fn test_results_at_strips_zero() {
    let graph = lca_two_calls();
    let (results, _) = solve_ide(LinearConstantProblem::new(&graph), &graph).unwrap();
    let exit = node("main::3");

    let all = results.results_at(&exit, false);
    let stripped = results.results_at(&exit, true);
    assert!(all.contains_key(&LcaFact::Zero));
    assert!(!stripped.contains_key(&LcaFact::Zero));
    assert_eq!(all.len(), stripped.len() + 1);
}

// ============================================================================
// Seed values
// ============================================================================

/// `a` calls `b` from its first node; both are seeded with fact 1
fn two_seeded_functions() -> EffectGraph {
    build_effect_program(&[
        ("a", vec![Step::call("b"), Step::Effect(Effect::none())]),
        (
            "b",
            vec![Step::Effect(Effect::none()), Step::Effect(Effect::none())],
        ),
    ])
}

#[test]
fn test_seed_value_joins_value_from_earlier_caller() {
    let graph = two_seeded_functions();
    let problem = SeededIdentityProblem::default()
        .with_seed("a::0", 1, LcaValue::Const(5))
        .with_seed("b::0", 1, LcaValue::Const(7));
    let (results, _) = solve_ide(problem, &graph).unwrap();

    assert_eq!(results.result_at(&node("a::1"), &1), LcaValue::Const(5));
    assert_eq!(results.result_at(&node("b::0"), &1), LcaValue::Bottom);
    assert_eq!(results.result_at(&node("b::1"), &1), LcaValue::Bottom);
}

#[test]
fn test_agreeing_seed_values_stay_constant() {
    let graph = two_seeded_functions();
    let problem = SeededIdentityProblem::default()
        .with_seed("a::0", 1, LcaValue::Const(5))
        .with_seed("b::0", 1, LcaValue::Const(5));
    let (results, _) = solve_ide(problem, &graph).unwrap();

    assert_eq!(results.result_at(&node("b::1"), &1), LcaValue::Const(5));
}
