//! End-to-end scenarios
//!
//! Small villages with known outcomes, plus structural properties checked
//! over many generated graphs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use mimetic_core::setup::random_complete_graph;
use mimetic_core::{
    BalanceAnalyzer, CascadeConfig, CascadeOutcome, CascadeSimulator, ContagionPhase,
    ContagionSimulator, ContagionWarning, EdgeKey, NodeChoice, Sign, SignedGraph, SimRng,
};
use mimetic_events::fixtures;

fn load(snapshot: mimetic_events::GraphSnapshot) -> SignedGraph {
    SignedGraph::from_snapshot(&snapshot).unwrap()
}

fn rational() -> CascadeConfig {
    CascadeConfig {
        rationality: 1.0,
        ..CascadeConfig::default()
    }
}

// === CASCADE ===

#[test]
fn test_scenario_a_two_step_scapegoating() {
    let sim = CascadeSimulator::new(load(fixtures::salem_four()), rational(), SimRng::seeded(42))
        .unwrap();
    let report = sim.introduce_perturbation("Alice", "Betty").unwrap();

    assert_eq!(report.outcome, CascadeOutcome::Stable);
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.total_flips(), 3);

    let edges: Vec<&EdgeKey> = report.steps.iter().filter_map(|s| s.decision.edge()).collect();
    assert_eq!(
        edges,
        vec![&EdgeKey::new("Alice", "Charlie"), &EdgeKey::new("Alice", "David")]
    );
    assert_eq!(report.steps[1].decision.triangle_delta(), Some(2));

    assert_eq!(report.summary.scores["Alice"], -3);
    assert_eq!(report.summary.most_disliked(), Some(("Alice", -3)));
    assert!(report.summary.balanced);
}

#[test]
fn test_cascade_never_reverses() {
    for seed in 0..25u64 {
        let mut rng = SimRng::seeded(seed);
        let graph = random_complete_graph(7, 0.6, &mut rng).unwrap();
        let (u, v) = {
            let (key, _) = graph.edges().next().unwrap();
            (key.first().to_string(), key.second().to_string())
        };
        let config = CascadeConfig {
            rationality: 0.3,
            max_steps: 200,
            ..CascadeConfig::default()
        };
        let report = CascadeSimulator::new(graph, config, rng)
            .unwrap()
            .introduce_perturbation(&u, &v)
            .unwrap();

        let mut seen = BTreeSet::new();
        let mut per_edge: BTreeMap<EdgeKey, usize> = BTreeMap::new();
        let locked = EdgeKey::new(u.as_str(), v.as_str());
        for step in &report.steps {
            let edge = step.decision.edge().unwrap().clone();
            assert_ne!(edge, locked, "seed {}: perturbation edge flipped again", seed);
            assert!(
                seen.insert((step.decision.actor().to_string(), edge.clone())),
                "seed {}: {} flipped {} twice",
                seed,
                step.decision.actor(),
                edge
            );
            *per_edge.entry(edge).or_default() += 1;
        }
        assert!(per_edge.values().all(|&n| n <= 2));
    }
}

#[test]
fn test_cascade_outcome_matches_final_graph() {
    for seed in 0..15u64 {
        let mut rng = SimRng::seeded(seed);
        let graph = random_complete_graph(6, 0.5, &mut rng).unwrap();
        let report = CascadeSimulator::new(graph, CascadeConfig::default(), rng)
            .unwrap()
            .run_from_current_state()
            .unwrap();

        let final_graph = SignedGraph::from_snapshot(&report.final_state).unwrap();
        let analyzer = BalanceAnalyzer::new(&final_graph);
        assert_eq!(report.converged(), analyzer.is_balanced(), "seed {}", seed);
        assert_eq!(analyzer.is_balanced(), analyzer.pressured_nodes().is_empty());
        assert_eq!(report.summary, analyzer.summary());
    }
}

// === CONTAGION ===

#[test]
fn test_scenario_b_all_against_one() {
    let report = ContagionSimulator::new(load(fixtures::salem_four()), SimRng::seeded(42))
        .introduce_accusation(NodeChoice::named("Betty"), NodeChoice::named("Alice"))
        .unwrap();

    assert_eq!(report.accusers, vec!["Alice", "Charlie", "David"]);
    assert!(report.defenders.is_empty());
    assert!(report.neutral.is_empty());
    assert!(report.all_against_one);
    assert!(report.warnings.is_empty());
    assert!(report.summary.balanced);
    assert_eq!(report.summary.scores["Betty"], -3);
}

#[test]
fn test_scenario_c_isolated_accuser() {
    let report = ContagionSimulator::new(load(fixtures::isolated_accuser()), SimRng::seeded(42))
        .introduce_accusation(NodeChoice::named("Betty"), NodeChoice::named("Alice"))
        .unwrap();

    assert_eq!(report.accusers, vec!["Alice"]);
    assert_eq!(report.defenders, vec!["Charlie", "David"]);
    assert!(!report.all_against_one);
    assert!(report.warnings.contains(&ContagionWarning::AccuserIsolated {
        accuser: "Alice".into()
    }));
    assert!(report.incomplete());
}

#[test]
fn test_scenario_d_disconnected_component_stays_neutral() {
    let report = ContagionSimulator::new(load(fixtures::two_components()), SimRng::seeded(42))
        .introduce_accusation(NodeChoice::named("Betty"), NodeChoice::named("Alice"))
        .unwrap();

    assert_eq!(report.accusers, vec!["Alice", "Charlie", "David"]);
    assert_eq!(report.neutral, vec!["Eve", "Frank", "Grace"]);
    assert!(!report.all_against_one);
    assert!(report.warnings.contains(&ContagionWarning::UnreachedNodes {
        nodes: vec!["Eve".into(), "Frank".into(), "Grace".into()]
    }));
    assert_eq!(report.steps_in(ContagionPhase::Unreached).count(), 3);
    assert!(report
        .steps_in(ContagionPhase::Unreached)
        .all(|s| !s.decision.is_action()));
}

#[test]
fn test_pre_existing_enemy_spreads_to_strangers() {
    // Mary already hates Elizabeth; Tituba has no tie to her at all
    let mut graph = load(fixtures::village_six());
    graph.add_edge("John", "Sarah", Sign::Positive).unwrap();
    let report = ContagionSimulator::new(graph, SimRng::seeded(1))
        .introduce_accusation(NodeChoice::named("Elizabeth"), NodeChoice::named("Abigail"))
        .unwrap();

    assert!(report.accusers.contains(&"Mary".to_string()));
    assert!(report.accusers.contains(&"John".to_string()));
    assert_eq!(
        report.final_state.sign_of("Elizabeth", "Tituba"),
        Some(Sign::Negative)
    );
    assert!(report.all_against_one);
}

/// Friendship components of everyone but `excluded`
fn friendship_connected(graph: &SignedGraph, excluded: &str) -> bool {
    let nodes: Vec<&str> = graph.nodes().filter(|n| *n != excluded).collect();
    let Some(start) = nodes.first() else {
        return true;
    };
    let mut seen = BTreeSet::from([start.to_string()]);
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(node) = queue.pop_front() {
        for friend in graph.friends(&node) {
            if friend != excluded && seen.insert(friend.clone()) {
                queue.push_back(friend);
            }
        }
    }
    seen.len() == nodes.len()
}

#[test]
fn test_contagion_unifies_connected_communities() {
    let mut checked = 0;
    for seed in 0..40u64 {
        let mut rng = SimRng::seeded(seed);
        let graph = random_complete_graph(8, 0.7, &mut rng).unwrap();
        if !friendship_connected(&graph, "n0") {
            continue;
        }
        checked += 1;

        let report = ContagionSimulator::new(graph, rng)
            .introduce_accusation(NodeChoice::named("n0"), NodeChoice::named("n1"))
            .unwrap();

        assert!(report.all_against_one, "seed {}", seed);
        let community_enemies = report
            .final_state
            .edges
            .iter()
            .filter(|e| e.source != "n0" && e.target != "n0")
            .filter(|e| e.sign.is_negative())
            .count();
        assert_eq!(community_enemies, 0, "seed {}", seed);
        assert!(report.summary.balanced, "seed {}", seed);
    }
    assert!(checked > 10, "only {} connected graphs generated", checked);
}
