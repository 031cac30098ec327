//! Graph Setup
//!
//! Generators for test and demo graphs. Node ids are `n0`, `n1`, ...; every
//! random draw comes from the run's [`SimRng`].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use mimetic_events::{NodeId, Sign};

use crate::components::SignedGraph;
use crate::config::GeneratorConfig;
use crate::error::SimError;
use crate::SimRng;

/// Rejected generator parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    #[error("graph needs at least {min} nodes, got {got}")]
    TooFewNodes { min: usize, got: usize },

    #[error("p_positive must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("min_degree must be at least 2, got {0}")]
    MinDegreeTooSmall(usize),

    #[error("max_degree ({max}) must be >= min_degree ({min})")]
    DegreeRange { min: usize, max: usize },

    #[error(transparent)]
    Graph(#[from] SimError),
}

/// Shape of a generated graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GraphKind {
    /// Complete graph, every edge +1
    AllPositive,
    /// Complete graph, every edge -1
    AllNegative,
    /// Complete graph, each edge +1 with probability `p_positive`
    Random,
    /// Bounded-degree graph
    Sparse,
}

/// `n0` .. `n{count-1}`
pub fn node_ids(count: usize) -> Vec<NodeId> {
    (0..count).map(|i| format!("n{}", i)).collect()
}

fn check_probability(p_positive: f64) -> Result<(), GeneratorError> {
    if (0.0..=1.0).contains(&p_positive) {
        Ok(())
    } else {
        Err(GeneratorError::InvalidProbability(p_positive))
    }
}

fn random_sign(rng: &mut SimRng, p_positive: f64) -> Sign {
    if rng.gen::<f64>() < p_positive {
        Sign::Positive
    } else {
        Sign::Negative
    }
}

/// Complete graph on `count` generated nodes with one sign everywhere
pub fn complete_graph(count: usize, sign: Sign) -> Result<SignedGraph, GeneratorError> {
    if count == 0 {
        return Err(GeneratorError::TooFewNodes { min: 1, got: 0 });
    }
    Ok(SignedGraph::complete(node_ids(count), sign))
}

/// Complete graph with each edge drawn independently
pub fn random_complete_graph(
    count: usize,
    p_positive: f64,
    rng: &mut SimRng,
) -> Result<SignedGraph, GeneratorError> {
    check_probability(p_positive)?;
    if count == 0 {
        return Err(GeneratorError::TooFewNodes { min: 1, got: 0 });
    }

    // Sorted names: pairs come out in EdgeKey order
    let mut nodes = node_ids(count);
    nodes.sort();
    let mut graph = SignedGraph::new();
    for node in &nodes {
        graph.add_node(node.clone());
    }
    for (i, u) in nodes.iter().enumerate() {
        for v in &nodes[i + 1..] {
            graph.add_edge(u.clone(), v.clone(), random_sign(rng, p_positive))?;
        }
    }
    Ok(graph)
}

/// Sparse graph where every node ends with degree in `[min_degree,
/// max_degree]` when the node count allows it.
///
/// First every node is topped up to `min_degree`, preferring partners not yet
/// at `max_degree`; then each node draws a target degree up to `max_degree`
/// and adds edges toward it.
pub fn sparse_graph(
    count: usize,
    min_degree: usize,
    max_degree: usize,
    p_positive: f64,
    rng: &mut SimRng,
) -> Result<SignedGraph, GeneratorError> {
    if min_degree < 2 {
        return Err(GeneratorError::MinDegreeTooSmall(min_degree));
    }
    if max_degree < min_degree {
        return Err(GeneratorError::DegreeRange {
            min: min_degree,
            max: max_degree,
        });
    }
    if count < 2 {
        return Err(GeneratorError::TooFewNodes { min: 2, got: count });
    }
    check_probability(p_positive)?;

    let nodes = node_ids(count);
    let mut graph = SignedGraph::new();
    for node in &nodes {
        graph.add_node(node.clone());
    }
    let mut degree = vec![0usize; count];

    // === Minimum degree ===
    for i in 0..count {
        while degree[i] < min_degree {
            let mut candidates = open_partners(&graph, &nodes, &degree, i, Some(max_degree));
            if candidates.is_empty() {
                candidates = open_partners(&graph, &nodes, &degree, i, None);
            }
            let Some(&j) = candidates.choose(rng) else {
                break;
            };
            connect(&mut graph, &nodes, &mut degree, i, j, random_sign(rng, p_positive))?;
        }
    }

    // === Extra connectivity ===
    for i in 0..count {
        if degree[i] >= max_degree {
            continue;
        }
        let target = rng.gen_range(degree[i]..=max_degree);
        while degree[i] < target {
            let candidates = open_partners(&graph, &nodes, &degree, i, Some(max_degree));
            let Some(&j) = candidates.choose(rng) else {
                break;
            };
            connect(&mut graph, &nodes, &mut degree, i, j, random_sign(rng, p_positive))?;
        }
    }

    debug!(
        nodes = count,
        edges = graph.edge_count(),
        "Generated sparse graph"
    );
    Ok(graph)
}

/// Indices not yet joined to `i`, optionally limited to those below `cap`
fn open_partners(
    graph: &SignedGraph,
    nodes: &[NodeId],
    degree: &[usize],
    i: usize,
    cap: Option<usize>,
) -> Vec<usize> {
    (0..nodes.len())
        .filter(|&j| j != i)
        .filter(|&j| cap.map_or(true, |cap| degree[j] < cap))
        .filter(|&j| !graph.has_edge(&nodes[i], &nodes[j]))
        .collect()
}

fn connect(
    graph: &mut SignedGraph,
    nodes: &[NodeId],
    degree: &mut [usize],
    i: usize,
    j: usize,
    sign: Sign,
) -> Result<(), GeneratorError> {
    graph.add_edge(nodes[i].clone(), nodes[j].clone(), sign)?;
    degree[i] += 1;
    degree[j] += 1;
    Ok(())
}

/// Build the graph described by a generator config
pub fn generate(config: &GeneratorConfig, rng: &mut SimRng) -> Result<SignedGraph, GeneratorError> {
    match config.kind {
        GraphKind::AllPositive => complete_graph(config.nodes, Sign::Positive),
        GraphKind::AllNegative => complete_graph(config.nodes, Sign::Negative),
        GraphKind::Random => random_complete_graph(config.nodes, config.p_positive, rng),
        GraphKind::Sparse => sparse_graph(
            config.nodes,
            config.min_degree,
            config.max_degree,
            config.p_positive,
            rng,
        ),
    }
}
