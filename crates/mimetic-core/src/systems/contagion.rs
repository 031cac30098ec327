//! Contagion Simulator
//!
//! Spreads a single accusation breadth-first through the friendship
//! subgraph, then sweeps the community for leftover all-negative triangles.
//!
//! Phases: Initializing → Propagating → (Unreached) → CommunityCleanup.

use std::collections::{BTreeSet, VecDeque};

use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use mimetic_events::{
    ContagionPhase, ContagionReport, ContagionStep, ContagionWarning, Decision, EdgeKey,
    GraphSnapshot, NodeId, Sign,
};

use crate::actions::contagion::{apply, decide_and_apply, enemys_enemy};
use crate::components::SignedGraph;
use crate::error::{SimError, SimResult};
use crate::systems::balance::BalanceAnalyzer;
use crate::SimRng;

/// How a role in the accusation is filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeChoice {
    Named(NodeId),
    /// Drawn from the run's randomness source
    Random,
}

impl NodeChoice {
    pub fn named(node: impl Into<NodeId>) -> Self {
        NodeChoice::Named(node.into())
    }
}

impl From<Option<NodeId>> for NodeChoice {
    fn from(node: Option<NodeId>) -> Self {
        node.map_or(NodeChoice::Random, NodeChoice::Named)
    }
}

/// Owns one graph for the duration of a contagion run
pub struct ContagionSimulator {
    graph: SignedGraph,
    initial_state: GraphSnapshot,
    rng: SimRng,
}

/// Run-local bookkeeping
struct Trace {
    steps: Vec<ContagionStep>,
}

impl Trace {
    fn record(&mut self, phase: ContagionPhase, decision: Decision) {
        debug!(
            index = self.steps.len(),
            phase = ?phase,
            kind = decision.kind(),
            actor = decision.actor(),
            "Contagion decision"
        );
        self.steps.push(ContagionStep {
            index: self.steps.len(),
            phase,
            decision,
        });
    }
}

impl ContagionSimulator {
    pub fn new(graph: SignedGraph, rng: SimRng) -> Self {
        if !rng.is_seeded() {
            warn!("Contagion run has no seed; random roles are not reproducible");
        }
        Self {
            initial_state: graph.snapshot(),
            graph,
            rng,
        }
    }

    pub fn graph(&self) -> &SignedGraph {
        &self.graph
    }

    pub fn initial_state(&self) -> &GraphSnapshot {
        &self.initial_state
    }

    /// Resolve and validate scapegoat and accuser.
    ///
    /// A random scapegoat is drawn among nodes with at least one edge; a
    /// random accuser among the scapegoat's neighbors.
    pub fn choose_roles(
        &mut self,
        scapegoat: NodeChoice,
        accuser: NodeChoice,
    ) -> SimResult<(NodeId, NodeId)> {
        let scapegoat = match scapegoat {
            NodeChoice::Named(node) => node,
            NodeChoice::Random => {
                let connected: Vec<&str> =
                    self.graph.nodes().filter(|n| self.graph.degree(n) > 0).collect();
                connected
                    .choose(&mut self.rng)
                    .map(|n| n.to_string())
                    .ok_or_else(|| SimError::invalid("graph has no node with an edge to accuse"))?
            }
        };
        if !self.graph.contains_node(&scapegoat) {
            return Err(SimError::unknown_node(&scapegoat));
        }
        if self.graph.degree(&scapegoat) == 0 {
            return Err(SimError::invalid(format!(
                "scapegoat {} has no edges",
                scapegoat
            )));
        }

        let accuser = match accuser {
            NodeChoice::Named(node) => node,
            NodeChoice::Random => {
                let neighbors: Vec<&str> = self.graph.neighbors(&scapegoat).collect();
                neighbors
                    .choose(&mut self.rng)
                    .map(|n| n.to_string())
                    .ok_or_else(|| SimError::invalid("scapegoat has no neighbors"))?
            }
        };
        if !self.graph.contains_node(&accuser) {
            return Err(SimError::unknown_node(&accuser));
        }
        if accuser == scapegoat {
            return Err(SimError::invalid(format!(
                "{} cannot accuse itself",
                accuser
            )));
        }

        Ok((scapegoat, accuser))
    }

    /// Run a full contagion: the accuser turns on the scapegoat and the
    /// accusation spreads.
    pub fn introduce_accusation(
        mut self,
        scapegoat: NodeChoice,
        accuser: NodeChoice,
    ) -> SimResult<ContagionReport> {
        let (scapegoat, accuser) = self.choose_roles(scapegoat, accuser)?;
        info!(scapegoat = %scapegoat, accuser = %accuser, "Accusation introduced");

        let mut trace = Trace { steps: Vec::new() };
        let mut warnings = Vec::new();

        // === Initializing ===
        let edge = EdgeKey::new(accuser.as_str(), scapegoat.as_str());
        let from = self.graph.sign_of(&edge);
        if from != Some(Sign::Negative) {
            let decision = Decision::Accuse {
                rationale: match from {
                    Some(_) => format!("{} accuses former friend {}", accuser, scapegoat),
                    None => format!("{} accuses {}, a stranger until now", accuser, scapegoat),
                },
                actor: accuser.clone(),
                scapegoat: scapegoat.clone(),
                edge,
                from,
                to: Sign::Negative,
            };
            apply(&mut self.graph, &decision)?;
            trace.record(ContagionPhase::Initializing, decision);
        }

        let mut accusers: BTreeSet<NodeId> = self.graph.enemies(&scapegoat).into_iter().collect();
        accusers.insert(accuser.clone());

        // === Propagating ===
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        visited.insert(scapegoat.clone());
        visited.insert(accuser.clone());
        let mut queue = VecDeque::from([accuser.clone()]);

        while let Some(node) = queue.pop_front() {
            for decision in decide_and_apply(&mut self.graph, &node, &scapegoat, &mut accusers)? {
                trace.record(ContagionPhase::Propagating, decision);
            }
            for friend in self.graph.friends(&node) {
                if visited.insert(friend.clone()) {
                    queue.push_back(friend);
                }
            }
        }

        if visited.len() <= 2 {
            warn!(accuser = %accuser, "Accuser has no friends; the accusation does not spread");
            warnings.push(ContagionWarning::AccuserIsolated {
                accuser: accuser.clone(),
            });
        }

        // === Unreached ===
        let unreached: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| !visited.contains(*n))
            .map(str::to_string)
            .collect();
        if !unreached.is_empty() {
            warn!(count = unreached.len(), "Nodes outside the accuser's friendship network");
            for node in &unreached {
                for decision in decide_and_apply(&mut self.graph, node, &scapegoat, &mut accusers)? {
                    trace.record(ContagionPhase::Unreached, decision);
                }
            }
            warnings.push(ContagionWarning::UnreachedNodes { nodes: unreached });
        }

        // === CommunityCleanup ===
        self.community_cleanup(&scapegoat, &mut trace)?;

        Ok(self.finish(scapegoat, accuser, accusers, trace, warnings))
    }

    /// Befriend every pair of scapegoat enemies that are still enemies of
    /// each other. Each edge is inspected at most once.
    fn community_cleanup(&mut self, scapegoat: &str, trace: &mut Trace) -> SimResult<()> {
        let mut inspected: BTreeSet<EdgeKey> = BTreeSet::new();
        let mut unified = 0usize;

        for node in self.graph.enemies(scapegoat) {
            for decision in enemys_enemy(&self.graph, &node, scapegoat) {
                let Some(edge) = decision.edge() else {
                    continue;
                };
                if !inspected.insert(edge.clone()) {
                    continue;
                }
                apply(&mut self.graph, &decision)?;
                trace.record(ContagionPhase::CommunityCleanup, decision);
                unified += 1;
            }
        }

        debug!(unified, "Community cleanup finished");
        Ok(())
    }

    fn finish(
        self,
        scapegoat: NodeId,
        accuser: NodeId,
        accusers: BTreeSet<NodeId>,
        trace: Trace,
        warnings: Vec<ContagionWarning>,
    ) -> ContagionReport {
        let graph = &self.graph;
        let target = scapegoat.as_str();
        let others = move || graph.nodes().filter(move |n| *n != target);

        let defenders = graph.friends(&scapegoat);
        let neutral: Vec<NodeId> = others()
            .filter(|n| !graph.has_edge(n, &scapegoat))
            .map(str::to_string)
            .collect();
        let all_against_one =
            others().all(|n| graph.get_edge(n, &scapegoat) == Some(Sign::Negative));
        let summary = BalanceAnalyzer::new(graph).summary();

        info!(
            accusers = accusers.len(),
            defenders = defenders.len(),
            neutral = neutral.len(),
            all_against_one,
            balanced = summary.balanced,
            "Contagion finished"
        );

        ContagionReport {
            initial_state: self.initial_state,
            final_state: graph.snapshot(),
            scapegoat,
            accuser,
            steps: trace.steps,
            accusers: accusers.into_iter().collect(),
            defenders,
            neutral,
            all_against_one,
            warnings,
            seed: self.rng.seed(),
            summary,
        }
    }
}
