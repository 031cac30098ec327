//! Cascade Simulator
//!
//! Round-based driver. Each round every pressured actor proposes its
//! preferred flip, each proposal is scored by its triangle delta, and one
//! move is chosen according to rationality. The run ends when no
//! unbalanced triangle remains, when every pressured actor is stuck, or when
//! the step budget runs out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mimetic_events::{
    CascadeOutcome, CascadeReport, CascadeStep, Decision, EdgeKey, GraphSnapshot, NodeId,
};

use crate::actions::pressure::{choose_flip, flip_options, FlipChoice};
use crate::components::{FlipLedger, SignedGraph};
use crate::error::{SimError, SimResult};
use crate::systems::balance::BalanceAnalyzer;
use crate::systems::select::select_move;
use crate::SimRng;

/// Tuning for a cascade run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Rounds after the perturbation before giving up
    pub max_steps: usize,
    /// 0.0 = uniform random moves, 1.0 = always the best delta
    pub rationality: f64,
    /// Keeps the softmax temperature finite near zero rationality
    pub softmax_epsilon: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            rationality: 0.5,
            softmax_epsilon: 0.01,
        }
    }
}

impl CascadeConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..=1.0).contains(&self.rationality) {
            return Err(SimError::invalid(format!(
                "rationality must be within [0, 1], got {}",
                self.rationality
            )));
        }
        if !(self.softmax_epsilon > 0.0) {
            return Err(SimError::invalid(format!(
                "softmax epsilon must be positive, got {}",
                self.softmax_epsilon
            )));
        }
        Ok(())
    }
}

/// What a single round did
#[derive(Debug, Clone, PartialEq)]
pub enum Round {
    /// No pressured nodes left
    Balanced,
    /// One move was executed and recorded
    Moved,
    /// Every pressured node is out of legal flips
    Stuck(Vec<NodeId>),
}

struct Proposal {
    choice: FlipChoice,
    delta: i64,
}

/// Owns one graph for the duration of a cascade run
pub struct CascadeSimulator {
    graph: SignedGraph,
    initial_state: GraphSnapshot,
    config: CascadeConfig,
    ledger: FlipLedger,
    rng: SimRng,
    perturbation: Option<CascadeStep>,
    steps: Vec<CascadeStep>,
}

impl CascadeSimulator {
    /// Take ownership of `graph` and snapshot its starting state
    pub fn new(graph: SignedGraph, config: CascadeConfig, rng: SimRng) -> SimResult<Self> {
        config.validate()?;
        if !rng.is_seeded() {
            warn!("Cascade run has no seed; tie-breaks are not reproducible");
        }
        Ok(Self {
            initial_state: graph.snapshot(),
            graph,
            config,
            ledger: FlipLedger::new(),
            rng,
            perturbation: None,
            steps: Vec::new(),
        })
    }

    pub fn graph(&self) -> &SignedGraph {
        &self.graph
    }

    pub fn ledger(&self) -> &FlipLedger {
        &self.ledger
    }

    pub fn initial_state(&self) -> &GraphSnapshot {
        &self.initial_state
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }

    /// Flip the perturbation edge, lock it for both endpoints and record it
    /// as step 0.
    pub fn perturb(&mut self, u: &str, v: &str) -> SimResult<&CascadeStep> {
        if self.perturbation.is_some() || !self.steps.is_empty() {
            return Err(SimError::invalid("perturbation must be the first event of a run"));
        }
        for node in [u, v] {
            if !self.graph.contains_node(node) {
                return Err(SimError::unknown_node(node));
            }
        }

        let edge = EdgeKey::new(u, v);
        let from = self
            .graph
            .sign_of(&edge)
            .ok_or_else(|| {
                SimError::invalid(format!("no edge between {} and {} to perturb", u, v))
            })?;
        let (delta, before) = {
            let analyzer = BalanceAnalyzer::new(&self.graph);
            (analyzer.triangle_delta(u, v)?, analyzer.pressured_nodes())
        };

        let to = self.graph.flip_edge(u, v)?;
        self.ledger.lock(edge.clone());

        let after = BalanceAnalyzer::new(&self.graph).pressured_nodes();
        info!(edge = %edge, from = %from, to = %to, "Perturbation introduced");

        let step = CascadeStep {
            step: 0,
            decision: Decision::Perturb {
                rationale: format!(
                    "External event: {} and {} fall out ({} → {})",
                    u, v, from, to
                ),
                actor: u.to_string(),
                target: v.to_string(),
                edge,
                from,
                to,
                triangle_delta: delta,
            },
            new_pressured: after.difference(&before).cloned().collect(),
            stuck: Vec::new(),
            candidates: 1,
        };
        Ok(&*self.perturbation.insert(step))
    }

    /// Run one selection round
    pub fn round(&mut self) -> SimResult<Round> {
        let analyzer = BalanceAnalyzer::new(&self.graph);
        let pressured = analyzer.pressured_nodes();
        if pressured.is_empty() {
            return Ok(Round::Balanced);
        }

        let mut proposals = Vec::new();
        let mut stuck = Vec::new();
        for node in &pressured {
            let options = flip_options(&self.graph, &self.ledger, node);
            match choose_flip(&options, &mut self.rng) {
                Some(choice) => {
                    let delta =
                        analyzer.triangle_delta(&choice.option.actor, &choice.option.target)?;
                    proposals.push(Proposal { choice, delta });
                }
                None => stuck.push(node.clone()),
            }
        }

        let deltas: Vec<i64> = proposals.iter().map(|p| p.delta).collect();
        let candidates = proposals.len();
        let Some(index) = select_move(
            &deltas,
            self.config.rationality,
            self.config.softmax_epsilon,
            &mut self.rng,
        ) else {
            debug!(stuck = ?stuck, "Every pressured node is stuck");
            return Ok(Round::Stuck(stuck));
        };

        let Proposal { choice, delta } = proposals.swap_remove(index);
        self.execute(choice, delta, &pressured, stuck, candidates)?;
        Ok(Round::Moved)
    }

    fn execute(
        &mut self,
        choice: FlipChoice,
        delta: i64,
        pressured_before: &BTreeSet<NodeId>,
        stuck: Vec<NodeId>,
        candidates: usize,
    ) -> SimResult<()> {
        let option = choice.option;
        let to = self.graph.flip_edge(&option.actor, &option.target)?;
        self.ledger.record(option.actor.clone(), option.edge.clone());

        let after = BalanceAnalyzer::new(&self.graph).pressured_nodes();
        let step_number = self.steps.len() + 1;
        debug!(
            step = step_number,
            actor = %option.actor,
            edge = %option.edge,
            delta,
            candidates,
            "Cascade step"
        );

        self.steps.push(CascadeStep {
            step: step_number,
            decision: Decision::FlipForPressure {
                actor: option.actor,
                target: option.target,
                edge: option.edge,
                from: option.current,
                to,
                triangle_delta: delta,
                rationale: choice.rationale,
            },
            new_pressured: after.difference(pressured_before).cloned().collect(),
            stuck,
            candidates,
        });
        Ok(())
    }

    /// Run rounds until the graph settles or the budget is spent
    pub fn run(mut self) -> SimResult<CascadeReport> {
        let mut outcome = None;
        while self.steps.len() < self.config.max_steps {
            match self.round()? {
                Round::Balanced => {
                    outcome = Some(CascadeOutcome::Stable);
                    break;
                }
                Round::Moved => {}
                Round::Stuck(nodes) => {
                    outcome = Some(CascadeOutcome::Stuck { nodes });
                    break;
                }
            }
        }

        let analyzer = BalanceAnalyzer::new(&self.graph);
        let outcome = match outcome {
            Some(outcome) => outcome,
            None if analyzer.is_balanced() => CascadeOutcome::Stable,
            None => CascadeOutcome::MaxStepsExceeded {
                max_steps: self.config.max_steps,
            },
        };

        match &outcome {
            CascadeOutcome::Stable => {
                info!(steps = self.steps.len(), "Cascade converged to balance")
            }
            CascadeOutcome::MaxStepsExceeded { max_steps } => {
                warn!(max_steps, "Cascade did not converge within the step budget")
            }
            CascadeOutcome::Stuck { nodes } => {
                warn!(stuck = ?nodes, "Cascade stopped: every pressured node is stuck")
            }
        }

        let summary = analyzer.summary();
        let final_state = self.graph.snapshot();
        Ok(CascadeReport {
            initial_state: self.initial_state,
            perturbation: self.perturbation,
            steps: self.steps,
            final_state,
            outcome,
            rationality: self.config.rationality,
            seed: self.rng.seed(),
            summary,
        })
    }

    /// Perturb `(u, v)` and run the cascade it triggers
    pub fn introduce_perturbation(mut self, u: &str, v: &str) -> SimResult<CascadeReport> {
        self.perturb(u, v)?;
        self.run()
    }

    /// Run the cascade driven by the graph's own imbalances, with no
    /// perturbation
    pub fn run_from_current_state(self) -> SimResult<CascadeReport> {
        self.run()
    }
}
