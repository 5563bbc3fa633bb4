//! IFDS tabulation: reachability, call/return matching, summaries, recursion,
//! unbalanced returns

mod common;

use common::*;
use ide_tabulation::features::ifds_ide::IdeSolver;
use ide_tabulation::features::taint::{leaks, TaintProblem};
use ide_tabulation::{solve_ifds, SolverConfig};

fn jump_functions_into(graph: &EffectGraph, function: &str) -> usize {
    let mut solver = IdeSolver::from_ifds_problem(GenKillProblem::new(graph), graph);
    solver.solve();
    let prefix = format!("{}::", function);
    solver
        .jump_functions()
        .iter()
        .filter(|(_, n, _, _)| n.starts_with(&prefix))
        .count()
}

// ============================================================================
// Intra-procedural
// ============================================================================

#[test]
fn test_straight_line_gen_kill() {
    let graph = build_effect_program(&[(
        "main",
        vec![
            Step::Effect(Effect::gen(&[1])),
            Step::Effect(Effect::gen(&[2])),
            Step::Effect(Effect::kill(&[1])),
            Step::Effect(Effect::none()),
        ],
    )]);

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let results = results.get();
    assert_facts_at(results, "main::0", &[0]);
    assert_facts_at(results, "main::1", &[0, 1]);
    assert_facts_at(results, "main::2", &[0, 1, 2]);
    assert_facts_at(results, "main::3", &[0, 2]);
}

#[test]
fn test_branches_merge_by_union() {
    let mut graph = EffectGraph::new();
    add_cfg_function(
        &mut graph,
        "main",
        &[],
        vec![
            Effect::gen(&[1]),
            Effect::gen(&[2]),
            Effect::kill(&[1]),
            Effect::none(),
        ],
        &[(0, 1), (0, 2), (1, 3), (2, 3)],
        &[3],
    );

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let results = results.get();
    assert_facts_at(results, "main::1", &[0, 1]);
    assert_facts_at(results, "main::2", &[0, 1]);
    assert_facts_at(results, "main::3", &[0, 1, 2]);
}

#[test]
fn test_unreachable_node_has_no_results() {
    let mut graph = EffectGraph::new();
    add_cfg_function(
        &mut graph,
        "main",
        &[],
        vec![Effect::gen(&[1]), Effect::none(), Effect::none()],
        &[(0, 1)],
        &[1],
    );

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    assert!(results.ifds_results_at(&"main::2".to_string()).is_empty());
    assert_facts_at(results.get(), "main::1", &[0, 1]);
}

#[test]
fn test_without_auto_zero_the_problem_keeps_zero_itself() {
    let graph = effect_call_sites(2);
    let (with_zero, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let (without_zero, _) = solve_ifds(
        GenKillProblem::new(&graph).with_config(SolverConfig::default().auto_add_zero(false)),
        &graph,
    )
    .unwrap();
    assert_eq!(snapshot(with_zero.get()), snapshot(without_zero.get()));
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_facts_flow_through_callee() {
    let graph = effect_call_sites(1);
    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let results = results.get();
    assert_facts_at(results, "callee::2", &[0, 1, 2]);
    assert_facts_at(results, "callee::3", &[0, 2]);
    // Return site of the only call
    assert_facts_at(results, "main::2", &[0, 2]);
    assert_zero_everywhere(results);
}

#[test]
fn test_returns_match_their_call_site() {
    let graph = build_effect_program(&[
        (
            "main",
            vec![
                Step::Effect(Effect::gen(&[1])),
                Step::call("callee"),
                Step::call("other"),
                Step::Effect(Effect::none()),
            ],
        ),
        (
            "other",
            vec![
                Step::Effect(Effect {
                    gen: vec![2],
                    kill: vec![1],
                }),
                Step::call("callee"),
                Step::Effect(Effect::none()),
            ],
        ),
        (
            "callee",
            vec![Step::Effect(Effect::none()), Step::Effect(Effect::none())],
        ),
    ]);

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let results = results.get();

    // The callee sees both contexts
    assert_facts_at(results, "callee::1", &[0, 1, 2]);
    // Each return site only gets back what its own call passed in
    assert_facts_at(results, "main::2", &[0, 1]);
    assert_facts_at(results, "other::2", &[0, 2]);
    assert_facts_at(results, "main::3", &[0, 2]);
}

#[test]
fn test_bodyless_callee_is_bypassed() {
    let graph = build_effect_program(&[(
        "main",
        vec![
            Step::Effect(Effect::gen(&[1])),
            Step::call("ext"),
            Step::Effect(Effect::none()),
        ],
    )]);

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    assert_facts_at(results.get(), "main::2", &[0, 1]);
}

#[test]
fn test_callee_work_does_not_scale_with_call_sites() {
    let few = effect_call_sites(2);
    let many = effect_call_sites(10);
    assert_eq!(jump_functions_into(&few, "callee"), jump_functions_into(&many, "callee"));

    let (results, _) = solve_ifds(GenKillProblem::new(&many), &many).unwrap();
    assert_facts_at(results.get(), "main::11", &[0, 2]);
}

#[test]
fn test_end_summaries_are_reused() {
    let graph = taint_chain(3);
    let problem = TaintProblem::new(&graph);
    let (results, stats) = solve_ifds(problem, &graph).unwrap();

    assert!(stats.num_summary_reuses > 0);
    assert!(stats.num_end_summaries > 0);
    let found = leaks(results.get(), &graph);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].sink, "main::4");
    assert_eq!(found[0].var, "v3");
}

#[test]
fn test_incoming_and_end_summary_accessors() {
    let graph = effect_call_sites(3);
    let mut solver = IdeSolver::from_ifds_problem(GenKillProblem::new(&graph), &graph);
    solver.solve();

    let start = "callee::0".to_string();
    let incoming = solver.incoming(&start, &0);
    assert_eq!(incoming.len(), 3);
    assert!(incoming.keys().all(|c| c.starts_with("main::")));

    let summaries = solver.end_summaries(&start, &0);
    let mut exit_facts: Vec<u8> = summaries.iter().map(|(_, d, _)| *d).collect();
    exit_facts.sort();
    assert_eq!(exit_facts, vec![0, 2]);
    assert!(summaries.iter().all(|(exit, _, _)| exit == "callee::3"));
}

// ============================================================================
// Recursion
// ============================================================================

#[test]
fn test_direct_recursion_terminates() {
    let graph = build_effect_program_with_edges(
        &[
            (
                "main",
                vec![
                    Step::Effect(Effect::none()),
                    Step::call("rec"),
                    Step::Effect(Effect::none()),
                ],
            ),
            (
                "rec",
                vec![
                    Step::Effect(Effect::gen(&[1])),
                    Step::call("rec"),
                    Step::Effect(Effect::none()),
                ],
            ),
        ],
        &[("rec::0", "rec::2")],
    );

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let results = results.get();
    assert_facts_at(results, "rec::2", &[0, 1]);
    assert_facts_at(results, "main::2", &[0, 1]);
}

#[test]
fn test_mutual_recursion_terminates() {
    let graph = build_effect_program_with_edges(
        &[
            (
                "main",
                vec![
                    Step::Effect(Effect::none()),
                    Step::call("f"),
                    Step::Effect(Effect::none()),
                ],
            ),
            (
                "f",
                vec![
                    Step::Effect(Effect::gen(&[1])),
                    Step::call("g"),
                    Step::Effect(Effect::none()),
                ],
            ),
            (
                "g",
                vec![
                    Step::Effect(Effect::gen(&[2])),
                    Step::call("f"),
                    Step::Effect(Effect::none()),
                ],
            ),
        ],
        &[("f::0", "f::2"), ("g::0", "g::2")],
    );

    let (results, _) = solve_ifds(GenKillProblem::new(&graph), &graph).unwrap();
    let results = results.get();
    assert_facts_at(results, "f::2", &[0, 1, 2]);
    assert_facts_at(results, "main::2", &[0, 1, 2]);
    assert_zero_everywhere(results);
}

// ============================================================================
// Unbalanced returns
// ============================================================================

fn seeded_in_callee() -> EffectGraph {
    build_effect_program(&[
        (
            "main",
            vec![
                Step::Effect(Effect::none()),
                Step::call("foo"),
                Step::Effect(Effect::none()),
            ],
        ),
        (
            "foo",
            vec![Step::Effect(Effect::gen(&[1])), Step::Effect(Effect::none())],
        ),
    ])
}

#[test]
fn test_returns_past_seeds_are_dropped_by_default() {
    let graph = seeded_in_callee();
    let problem = GenKillProblem::with_seeds(&graph, vec![("foo::0".to_string(), 0)]);
    let (results, stats) = solve_ifds(problem, &graph).unwrap();

    assert_facts_at(results.get(), "foo::1", &[0, 1]);
    assert!(results.ifds_results_at(&"main::2".to_string()).is_empty());
    assert_eq!(stats.num_unbalanced_returns, 0);
}

#[test]
fn test_returns_past_seeds_reach_static_callers() {
    let graph = seeded_in_callee();
    let problem = GenKillProblem::with_seeds(&graph, vec![("foo::0".to_string(), 0)])
        .with_config(SolverConfig::default().follow_returns_past_seeds(true));

    let mut solver = IdeSolver::from_ifds_problem(problem, &graph);
    solver.solve();
    assert!(solver.unbalanced_return_sites().contains("main::2"));
    assert!(solver.statistics().num_unbalanced_returns > 0);
    // foo has a static caller; main, left through the same unbalanced
    // path, does not
    let side_effects = solver.problem().inner().side_effects.borrow().clone();
    assert!(!side_effects.contains(&"foo".to_string()));
    assert!(side_effects.contains(&"main".to_string()));

    let results = solver.solver_results();
    assert_facts_at(results, "main::2", &[0, 1]);
    // The call site itself was never reached
    assert!(results.ifds_results_at(&"main::1".to_string()).is_empty());
}

#[test]
fn test_unbalanced_return_without_callers_runs_side_effects() {
    let graph = build_effect_program(&[
        ("main", vec![Step::Effect(Effect::none())]),
        (
            "lonely",
            vec![Step::Effect(Effect::gen(&[3])), Step::Effect(Effect::none())],
        ),
    ]);
    let problem = GenKillProblem::with_seeds(&graph, vec![("lonely::0".to_string(), 0)])
        .with_config(SolverConfig::default().follow_returns_past_seeds(true));

    let mut solver = IdeSolver::from_ifds_problem(problem, &graph);
    solver.solve();
    let side_effects = solver.problem().inner().side_effects.borrow().clone();
    assert!(!side_effects.is_empty());
    assert!(side_effects.iter().all(|callee| callee == "lonely"));
    assert!(solver.unbalanced_return_sites().is_empty());
}
