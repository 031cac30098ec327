//! Run Reports
//!
//! Structured results of cascade and contagion runs. These are the engine's
//! complete output: formatters, loggers and loaders read nothing else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Decision, GraphSnapshot, NodeId};

/// Balance and score summary of a graph at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSummary {
    /// Social score per node (friends - enemies)
    pub scores: BTreeMap<NodeId, i32>,
    pub balanced: bool,
    pub unbalanced_triangles: usize,
    pub positive_edges: usize,
    pub negative_edges: usize,
}

impl FinalSummary {
    /// Node with the lowest social score (ties resolved by name)
    pub fn most_disliked(&self) -> Option<(&str, i32)> {
        self.scores
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(node, score)| (node.as_str(), *score))
    }
}

// === CASCADE ===

/// One executed cascade move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeStep {
    /// 0 for the perturbation, then 1, 2, ...
    pub step: usize,
    pub decision: Decision,
    /// Nodes pressured after this step that were not pressured before it
    #[serde(default)]
    pub new_pressured: Vec<NodeId>,
    /// Pressured nodes that had no legal move this round
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stuck: Vec<NodeId>,
    /// Number of candidate moves the selection drew from
    #[serde(default)]
    pub candidates: usize,
}

/// How a cascade run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CascadeOutcome {
    /// No unbalanced triangle remains
    Stable,
    /// Step budget exhausted while pressure remained
    MaxStepsExceeded { max_steps: usize },
    /// Every pressured node was out of legal moves
    Stuck { nodes: Vec<NodeId> },
}

impl CascadeOutcome {
    pub fn is_stable(&self) -> bool {
        matches!(self, CascadeOutcome::Stable)
    }
}

/// Complete cascade run result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub initial_state: GraphSnapshot,
    /// Step 0, absent when the run started from existing imbalance
    pub perturbation: Option<CascadeStep>,
    pub steps: Vec<CascadeStep>,
    pub final_state: GraphSnapshot,
    pub outcome: CascadeOutcome,
    pub rationality: f64,
    pub seed: Option<u64>,
    pub summary: FinalSummary,
}

impl CascadeReport {
    pub fn converged(&self) -> bool {
        self.outcome.is_stable()
    }

    /// Flips executed, including the perturbation
    pub fn total_flips(&self) -> usize {
        self.steps.len() + usize::from(self.perturbation.is_some())
    }

    /// Perturbation followed by every cascade step
    pub fn history(&self) -> impl Iterator<Item = &CascadeStep> {
        self.perturbation.iter().chain(self.steps.iter())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// === CONTAGION ===

/// Phase of a contagion run in which a decision was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContagionPhase {
    Initializing,
    Propagating,
    /// Nodes the friendship traversal never reached
    Unreached,
    CommunityCleanup,
}

/// One recorded contagion decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContagionStep {
    pub index: usize,
    pub phase: ContagionPhase,
    pub decision: Decision,
}

/// Degenerate-but-valid conditions observed during a contagion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ContagionWarning {
    /// Accuser had no friends, so the accusation could not travel
    AccuserIsolated { accuser: NodeId },
    /// Nodes outside the accuser's friendship component
    UnreachedNodes { nodes: Vec<NodeId> },
}

/// Complete contagion run result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContagionReport {
    pub initial_state: GraphSnapshot,
    pub scapegoat: NodeId,
    pub accuser: NodeId,
    pub steps: Vec<ContagionStep>,
    pub final_state: GraphSnapshot,
    /// Nodes hostile to the scapegoat at the end of the run
    pub accusers: Vec<NodeId>,
    /// Nodes still friends with the scapegoat
    pub defenders: Vec<NodeId>,
    /// Nodes with no edge to the scapegoat
    pub neutral: Vec<NodeId>,
    pub all_against_one: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ContagionWarning>,
    pub seed: Option<u64>,
    pub summary: FinalSummary,
}

impl ContagionReport {
    /// Decisions that changed the graph
    pub fn actions(&self) -> impl Iterator<Item = &ContagionStep> {
        self.steps.iter().filter(|s| s.decision.is_action())
    }

    pub fn steps_in(&self, phase: ContagionPhase) -> impl Iterator<Item = &ContagionStep> {
        self.steps.iter().filter(move |s| s.phase == phase)
    }

    /// True when the run hit a degenerate condition
    pub fn incomplete(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
