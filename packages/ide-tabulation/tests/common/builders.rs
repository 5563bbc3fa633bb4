//! Test program builders
//!
//! Node ids are always `<function>::<index>`.

use ide_tabulation::shared::models::{BinOp, Expr, Operand, Statement};
use ide_tabulation::ProgramGraph;

use super::fixtures::{Effect, EffectGraph};

/// Add a function with an explicit CFG
///
/// `edges` and `exits` refer to statement indices. Returns the node ids.
pub fn add_cfg_function<S>(
    graph: &mut ProgramGraph<S>,
    name: &str,
    params: &[&str],
    statements: Vec<S>,
    edges: &[(usize, usize)],
    exits: &[usize],
) -> Vec<String> {
    graph.add_function(name, params).unwrap();
    let ids: Vec<String> = (0..statements.len())
        .map(|i| format!("{}::{}", name, i))
        .collect();
    for (id, statement) in ids.iter().zip(statements) {
        graph.add_node(name, id, statement).unwrap();
    }
    for (from, to) in edges {
        graph.add_edge(&ids[*from], &ids[*to]).unwrap();
    }
    for exit in exits {
        graph.mark_exit(&ids[*exit]).unwrap();
    }
    ids
}

// ═══════════════════════════════════════════════════════════════════════════
// Gen/kill programs
// ═══════════════════════════════════════════════════════════════════════════

/// One node of a straight-line gen/kill function
#[derive(Debug, Clone)]
pub enum Step {
    Effect(Effect),
    Call(String),
}

impl Step {
    pub fn call(callee: &str) -> Self {
        Step::Call(callee.to_string())
    }
}

/// Straight-line gen/kill functions; calls are linked after all functions exist
///
/// Callees that are not listed are declared without a body.
pub fn build_effect_program(functions: &[(&str, Vec<Step>)]) -> EffectGraph {
    build_effect_program_with_edges(functions, &[])
}

/// `build_effect_program` plus extra intra-procedural edges by node id
pub fn build_effect_program_with_edges(
    functions: &[(&str, Vec<Step>)],
    extra_edges: &[(&str, &str)],
) -> EffectGraph {
    let mut graph = EffectGraph::new();
    let mut calls = Vec::new();

    for (name, steps) in functions {
        let statements: Vec<Effect> = steps
            .iter()
            .map(|step| match step {
                Step::Effect(effect) => effect.clone(),
                Step::Call(_) => Effect::none(),
            })
            .collect();
        let edges: Vec<(usize, usize)> = (1..steps.len()).map(|i| (i - 1, i)).collect();
        let ids = add_cfg_function(&mut graph, name, &[], statements, &edges, &[steps.len() - 1]);

        for (id, step) in ids.iter().zip(steps) {
            if let Step::Call(callee) = step {
                calls.push((id.clone(), callee.clone()));
            }
        }
    }

    for (from, to) in extra_edges {
        graph.add_edge(from, to).unwrap();
    }
    for (call_site, callee) in calls {
        graph.add_function(&callee, &[]).unwrap();
        graph.add_call(&call_site, &callee).unwrap();
    }
    graph
}

/// `main` calls `callee` `sites` times; `callee` generates fact 1
pub fn effect_call_sites(sites: usize) -> EffectGraph {
    let mut main = vec![Step::Effect(Effect::none())];
    main.extend((0..sites).map(|_| Step::call("callee")));
    main.push(Step::Effect(Effect::none()));
    build_effect_program(&[
        ("main", main),
        (
            "callee",
            vec![
                Step::Effect(Effect::gen(&[1])),
                Step::Effect(Effect::gen(&[2])),
                Step::Effect(Effect::kill(&[1])),
                Step::Effect(Effect::none()),
            ],
        ),
    ])
}

// ═══════════════════════════════════════════════════════════════════════════
// Statement programs
// ═══════════════════════════════════════════════════════════════════════════

/// `a = foo(3); b = foo(10)` with `foo(x) = x + 1`
pub fn lca_two_calls() -> ProgramGraph {
    let mut graph = ProgramGraph::new();
    graph
        .add_linear_function(
            "main",
            &[],
            vec![
                Statement::Nop,
                Statement::call("foo", vec![Operand::Const(3)], Some("a")),
                Statement::call("foo", vec![Operand::Const(10)], Some("b")),
                Statement::ret(None),
            ],
        )
        .unwrap();
    graph
        .add_linear_function(
            "foo",
            &["x"],
            vec![
                Statement::Nop,
                Statement::assign("y", Expr::binary(BinOp::Add, Operand::var("x"), Operand::Const(1))),
                Statement::ret(Some(Operand::var("y"))),
            ],
        )
        .unwrap();
    graph.link_calls().unwrap();
    graph
}

/// `main` calls `foo(i)` for i in 0..sites; `foo(x) = 2x`
pub fn lca_call_sites(sites: usize) -> ProgramGraph {
    let mut main = vec![Statement::Nop];
    for i in 0..sites {
        let result = format!("r{}", i);
        main.push(Statement::call("foo", vec![Operand::Const(i as i64)], Some(&result)));
    }
    main.push(Statement::ret(None));

    let mut graph = ProgramGraph::new();
    graph.add_linear_function("main", &[], main).unwrap();
    graph
        .add_linear_function(
            "foo",
            &["x"],
            vec![
                Statement::Nop,
                Statement::assign("y", Expr::binary(BinOp::Mul, Operand::var("x"), Operand::Const(2))),
                Statement::ret(Some(Operand::var("y"))),
            ],
        )
        .unwrap();
    graph.link_calls().unwrap();
    graph
}

/// `b = id(a); c = id(b); ...` with a tainted `a`, then `sink(last)`
pub fn taint_chain(calls: usize) -> ProgramGraph {
    let mut main = vec![Statement::source("v0")];
    for i in 0..calls {
        let result = format!("v{}", i + 1);
        main.push(Statement::call("id", vec![Operand::var(format!("v{}", i))], Some(&result)));
    }
    main.push(Statement::sink(Operand::var(format!("v{}", calls))));
    main.push(Statement::ret(None));

    let mut graph = ProgramGraph::new();
    graph.add_linear_function("main", &[], main).unwrap();
    graph
        .add_linear_function(
            "id",
            &["p"],
            vec![Statement::Nop, Statement::ret(Some(Operand::var("p")))],
        )
        .unwrap();
    graph.link_calls().unwrap();
    graph
}

/// `rec(x)` returns `x`, either directly or after calling itself
pub fn lca_direct_recursion() -> ProgramGraph {
    let mut graph = ProgramGraph::new();
    graph
        .add_linear_function(
            "main",
            &[],
            vec![
                Statement::Nop,
                Statement::call("rec", vec![Operand::Const(7)], Some("r")),
                Statement::ret(None),
            ],
        )
        .unwrap();
    add_cfg_function(
        &mut graph,
        "rec",
        &["x"],
        vec![
            Statement::Nop,
            Statement::call("rec", vec![Operand::var("x")], Some("y")),
            Statement::Nop,
            Statement::ret(Some(Operand::var("x"))),
        ],
        &[(0, 1), (1, 2), (2, 3), (0, 3)],
        &[3],
    );
    graph.link_calls().unwrap();
    graph
}

/// `even`/`odd` call each other with `x - 1`; both always return 1
pub fn lca_mutual_recursion() -> ProgramGraph {
    let mut graph = ProgramGraph::new();
    graph
        .add_linear_function(
            "main",
            &[],
            vec![
                Statement::Nop,
                Statement::call("even", vec![Operand::Const(10)], Some("r")),
                Statement::ret(None),
            ],
        )
        .unwrap();
    for (name, other) in [("even", "odd"), ("odd", "even")] {
        add_cfg_function(
            &mut graph,
            name,
            &["x"],
            vec![
                Statement::Nop,
                Statement::assign("y", Expr::binary(BinOp::Sub, Operand::var("x"), Operand::Const(1))),
                Statement::call(other, vec![Operand::var("y")], Some("r")),
                Statement::ret(Some(Operand::var("r"))),
                Statement::assign("r", Expr::constant(1)),
            ],
            &[(0, 1), (1, 2), (2, 3), (0, 4), (4, 3)],
            &[3],
        );
    }
    graph.link_calls().unwrap();
    graph
}
