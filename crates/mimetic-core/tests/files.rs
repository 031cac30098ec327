//! Graph files and report round-trips on disk

use std::fs;

use mimetic_core::events::{LoggedStep, StepLogger};
use mimetic_core::output::{load_graph, save_graph, GraphFormat};
use mimetic_core::setup::sparse_graph;
use mimetic_core::{
    CascadeConfig, CascadeReport, CascadeSimulator, ContagionReport, ContagionSimulator,
    NodeChoice, Sign, SignedGraph, SimRng,
};
use mimetic_events::fixtures;

#[test]
fn test_graph_round_trips_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let graph = sparse_graph(20, 2, 5, 0.5, &mut SimRng::seeded(3)).unwrap();

    for format in [GraphFormat::Json, GraphFormat::Csv, GraphFormat::Txt] {
        let path = dir.path().join(format!("village.{}", format.extension()));
        save_graph(&graph, &path).unwrap();
        let loaded = load_graph(&path).unwrap();
        assert_eq!(loaded, graph, "{:?}", format);
    }
}

#[test]
fn test_json_keeps_isolated_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let mut graph = SignedGraph::complete_positive(["A", "B"]);
    graph.add_node("Hermit");

    let json = dir.path().join("g.json");
    save_graph(&graph, &json).unwrap();
    assert!(load_graph(&json).unwrap().contains_node("Hermit"));

    let txt = dir.path().join("g.txt");
    save_graph(&graph, &txt).unwrap();
    assert!(!load_graph(&txt).unwrap().contains_node("Hermit"));
}

#[test]
fn test_fixture_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salem.json");
    fs::write(&path, fixtures::salem_four().to_json_pretty().unwrap()).unwrap();

    let graph = load_graph(&path).unwrap();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.positive_edge_count(), 6);
}

#[test]
fn test_nested_output_directory_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graphs").join("deep").join("g.csv");
    save_graph(&SignedGraph::complete_negative(["X", "Y"]), &path).unwrap();
    assert_eq!(load_graph(&path).unwrap().get_edge("Y", "X"), Some(Sign::Negative));
}

#[test]
fn test_reports_round_trip_through_json() {
    let cascade = CascadeSimulator::new(
        SignedGraph::from_snapshot(&fixtures::village_six()).unwrap(),
        CascadeConfig::default(),
        SimRng::seeded(11),
    )
    .unwrap()
    .run_from_current_state()
    .unwrap();
    let json = cascade.to_json_pretty().unwrap();
    assert_eq!(CascadeReport::from_json(&json).unwrap(), cascade);

    let contagion = ContagionSimulator::new(
        SignedGraph::from_snapshot(&fixtures::two_components()).unwrap(),
        SimRng::seeded(11),
    )
    .introduce_accusation(NodeChoice::named("Betty"), NodeChoice::named("Alice"))
    .unwrap();
    let json = contagion.to_json_pretty().unwrap();
    assert_eq!(ContagionReport::from_json(&json).unwrap(), contagion);
}

#[test]
fn test_step_log_has_one_line_per_decision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steps.jsonl");

    let report = CascadeSimulator::new(
        SignedGraph::from_snapshot(&fixtures::salem_four()).unwrap(),
        CascadeConfig {
            rationality: 1.0,
            ..CascadeConfig::default()
        },
        SimRng::seeded(42),
    )
    .unwrap()
    .introduce_perturbation("Alice", "Betty")
    .unwrap();

    {
        let mut logger = StepLogger::new(&path).unwrap();
        logger.log_cascade(&report).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<LoggedStep> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), report.total_flips());
    assert!(matches!(
        &lines[0],
        LoggedStep::Cascade { step, .. } if step.step == 0
    ));
}

#[test]
fn test_ids_with_commas_survive_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut graph = SignedGraph::new();
    graph.add_edge("Abigail", "Proctor, John", Sign::Negative).unwrap();
    graph.add_edge("Proctor, John", "Elizabeth", Sign::Positive).unwrap();

    for name in ["salem.csv", "salem.json"] {
        let path = dir.path().join(name);
        save_graph(&graph, &path).unwrap();
        assert_eq!(load_graph(&path).unwrap(), graph, "{}", name);
    }

    let txt = dir.path().join("salem.txt");
    assert!(save_graph(&graph, &txt).is_err());
    assert!(!txt.exists());
}
