//! Flip Ledger
//!
//! Records which actor has spent its one-time right to flip which edge, and
//! which edges are locked outright by a perturbation.

use std::collections::BTreeSet;

use mimetic_events::{EdgeKey, NodeId};

/// Per-run record of flip rights already used
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipLedger {
    flips: BTreeSet<(NodeId, EdgeKey)>,
    locked: BTreeSet<EdgeKey>,
}

impl FlipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock an edge against both of its endpoints for the rest of the run
    pub fn lock(&mut self, edge: EdgeKey) {
        self.locked.insert(edge);
    }

    pub fn is_locked(&self, edge: &EdgeKey) -> bool {
        self.locked.contains(edge)
    }

    /// Record that `actor` flipped `edge`. Returns false if it already had.
    pub fn record(&mut self, actor: impl Into<NodeId>, edge: EdgeKey) -> bool {
        self.flips.insert((actor.into(), edge))
    }

    pub fn has_flipped(&self, actor: &str, edge: &EdgeKey) -> bool {
        // BTreeSet of tuples can't be probed with borrowed parts
        self.flips.contains(&(actor.to_string(), edge.clone()))
    }

    /// Whether `actor` may still flip `edge`
    pub fn can_flip(&self, actor: &str, edge: &EdgeKey) -> bool {
        !self.is_locked(edge) && !self.has_flipped(actor, edge)
    }

    /// Number of recorded flips of `edge` (at most one per endpoint)
    pub fn flips_of(&self, edge: &EdgeKey) -> usize {
        self.flips.iter().filter(|(_, e)| e == edge).count()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &EdgeKey)> {
        self.flips.iter().map(|(actor, edge)| (actor.as_str(), edge))
    }

    pub fn len(&self) -> usize {
        self.flips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flips.is_empty()
    }
}
