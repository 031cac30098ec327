//! Error types for the engine.
//!
//! Only conditions that prevent a run from starting, or that break a graph
//! invariant, are errors. Running out of steps, stuck actors and incomplete
//! contagion are reported in the run's result instead.

use mimetic_events::NodeId;

/// Errors raised by graph operations and simulators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A node, edge or parameter reference does not make sense for this graph.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation required an edge that does not exist.
    #[error("no edge between {0} and {1}")]
    MissingEdge(NodeId, NodeId),
}

impl SimError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SimError::InvalidInput(reason.into())
    }

    pub(crate) fn unknown_node(node: &str) -> Self {
        SimError::InvalidInput(format!("node not in graph: {}", node))
    }
}

pub type SimResult<T> = Result<T, SimError>;
