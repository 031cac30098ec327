//! Graph Snapshot Types
//!
//! Serialization structs for a signed graph frozen at a point in time.
//!
//! Snapshots capture the before/after state of a run. They are also the
//! on-disk JSON graph format, so loaders and reports share one shape.

use serde::{Deserialize, Serialize};

use crate::{EdgeKey, NodeId, Sign};

/// One signed edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: NodeId,
    pub target: NodeId,
    pub sign: Sign,
}

impl EdgeSnapshot {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, sign: Sign) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            sign,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.target.clone())
    }
}

/// Complete graph snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign of the edge between two nodes, if present
    pub fn sign_of(&self, u: &str, v: &str) -> Option<Sign> {
        let key = EdgeKey::new(u, v);
        self.edges.iter().find(|e| e.key() == key).map(|e| e.sign)
    }

    pub fn positive_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.sign.is_positive()).count()
    }

    pub fn negative_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.sign.is_negative()).count()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
