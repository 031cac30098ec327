//! Determinism verification tests
//!
//! Tests to ensure runs produce identical results given the same seed.

use mimetic_core::setup::{random_complete_graph, sparse_graph};
use mimetic_core::{
    CascadeConfig, CascadeReport, CascadeSimulator, ContagionReport, ContagionSimulator,
    NodeChoice, SimRng,
};

fn cascade_run(seed: u64, rationality: f64) -> CascadeReport {
    let mut rng = SimRng::seeded(seed);
    let graph = random_complete_graph(9, 0.55, &mut rng).unwrap();
    let config = CascadeConfig {
        rationality,
        max_steps: 300,
        ..CascadeConfig::default()
    };
    CascadeSimulator::new(graph, config, rng)
        .unwrap()
        .introduce_perturbation("n0", "n1")
        .unwrap()
}

fn contagion_run(seed: u64) -> ContagionReport {
    let mut rng = SimRng::seeded(seed);
    let graph = sparse_graph(30, 2, 6, 0.6, &mut rng).unwrap();
    ContagionSimulator::new(graph, rng)
        .introduce_accusation(NodeChoice::Random, NodeChoice::Random)
        .unwrap()
}

/// Same seed and inputs give a byte-identical step sequence
#[test]
fn test_cascade_determinism() {
    for rationality in [0.0, 0.5, 1.0] {
        let first = cascade_run(42, rationality).to_json_pretty().unwrap();
        let second = cascade_run(42, rationality).to_json_pretty().unwrap();
        assert_eq!(first, second, "rationality {}", rationality);
    }
}

#[test]
fn test_cascade_records_seed() {
    let report = cascade_run(7, 0.5);
    assert_eq!(report.seed, Some(7));
    assert_eq!(report.rationality, 0.5);
}

#[test]
fn test_different_seeds_can_diverge() {
    let traces: Vec<String> = (0..8u64)
        .map(|seed| cascade_run(seed, 0.0).to_json_pretty().unwrap())
        .collect();
    assert!(traces.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn test_contagion_determinism() {
    let first = contagion_run(1234);
    let second = contagion_run(1234);
    assert_eq!(first.scapegoat, second.scapegoat);
    assert_eq!(first.accuser, second.accuser);
    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
}
