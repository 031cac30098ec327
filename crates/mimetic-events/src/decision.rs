//! Decision Records
//!
//! Every edge change an actor makes, in either simulation mode, is recorded
//! as one tagged [`Decision`]. Formatters and loggers consume these directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{EdgeKey, NodeId, Sign};

/// The three contagion rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContagionRule {
    /// Rule 1: a friend of the scapegoat befriended by an accuser turns
    ForcedChoice,
    /// Rule 2: two enemies of the scapegoat reconcile
    EnemysEnemy,
    /// Rule 3: a stranger to the scapegoat hears the accusation from a friend
    HearAccusation,
}

impl ContagionRule {
    pub fn name(self) -> &'static str {
        match self {
            ContagionRule::ForcedChoice => "rule 1 (forced choice)",
            ContagionRule::EnemysEnemy => "rule 2 (enemy's enemy)",
            ContagionRule::HearAccusation => "rule 3 (hear accusation)",
        }
    }
}

impl fmt::Display for ContagionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single actor's decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// The accuser turns on the scapegoat, opening a contagion run
    Accuse {
        actor: NodeId,
        scapegoat: NodeId,
        edge: EdgeKey,
        /// `None` when the accusation created the edge
        from: Option<Sign>,
        to: Sign,
        rationale: String,
    },
    /// Friend of the scapegoat sides with an accusing friend
    JoinAccusers {
        actor: NodeId,
        scapegoat: NodeId,
        /// Accuser friend whose side was taken
        source: NodeId,
        edge: EdgeKey,
        from: Sign,
        to: Sign,
        rationale: String,
    },
    /// Stranger to the scapegoat adopts a friend's accusation
    HearAccusation {
        actor: NodeId,
        scapegoat: NodeId,
        source: NodeId,
        edge: EdgeKey,
        to: Sign,
        rationale: String,
    },
    /// Two enemies of the scapegoat reconcile
    BefriendOther {
        actor: NodeId,
        other: NodeId,
        scapegoat: NodeId,
        edge: EdgeKey,
        from: Sign,
        to: Sign,
        rationale: String,
    },
    /// External flip that opens a cascade run
    Perturb {
        actor: NodeId,
        target: NodeId,
        edge: EdgeKey,
        from: Sign,
        to: Sign,
        triangle_delta: i64,
        rationale: String,
    },
    /// Cascade-mode flip made to relieve triangle pressure
    FlipForPressure {
        actor: NodeId,
        target: NodeId,
        edge: EdgeKey,
        from: Sign,
        to: Sign,
        triangle_delta: i64,
        rationale: String,
    },
    /// Node was considered and left its edges alone
    NoAction { actor: NodeId, rationale: String },
}

impl Decision {
    pub fn actor(&self) -> &str {
        match self {
            Decision::Accuse { actor, .. }
            | Decision::JoinAccusers { actor, .. }
            | Decision::HearAccusation { actor, .. }
            | Decision::BefriendOther { actor, .. }
            | Decision::Perturb { actor, .. }
            | Decision::FlipForPressure { actor, .. }
            | Decision::NoAction { actor, .. } => actor,
        }
    }

    /// The edge this decision touched, if any
    pub fn edge(&self) -> Option<&EdgeKey> {
        match self {
            Decision::Accuse { edge, .. }
            | Decision::JoinAccusers { edge, .. }
            | Decision::HearAccusation { edge, .. }
            | Decision::BefriendOther { edge, .. }
            | Decision::Perturb { edge, .. }
            | Decision::FlipForPressure { edge, .. } => Some(edge),
            Decision::NoAction { .. } => None,
        }
    }

    /// Sign before the decision; `None` for created edges and no-ops
    pub fn from_sign(&self) -> Option<Sign> {
        match self {
            Decision::Accuse { from, .. } => *from,
            Decision::JoinAccusers { from, .. }
            | Decision::BefriendOther { from, .. }
            | Decision::Perturb { from, .. }
            | Decision::FlipForPressure { from, .. } => Some(*from),
            Decision::HearAccusation { .. } | Decision::NoAction { .. } => None,
        }
    }

    /// Sign after the decision; `None` for no-ops
    pub fn to_sign(&self) -> Option<Sign> {
        match self {
            Decision::Accuse { to, .. }
            | Decision::JoinAccusers { to, .. }
            | Decision::HearAccusation { to, .. }
            | Decision::BefriendOther { to, .. }
            | Decision::Perturb { to, .. }
            | Decision::FlipForPressure { to, .. } => Some(*to),
            Decision::NoAction { .. } => None,
        }
    }

    pub fn rationale(&self) -> &str {
        match self {
            Decision::Accuse { rationale, .. }
            | Decision::JoinAccusers { rationale, .. }
            | Decision::HearAccusation { rationale, .. }
            | Decision::BefriendOther { rationale, .. }
            | Decision::Perturb { rationale, .. }
            | Decision::FlipForPressure { rationale, .. }
            | Decision::NoAction { rationale, .. } => rationale,
        }
    }

    /// Contagion rule that produced this decision, if any
    pub fn rule(&self) -> Option<ContagionRule> {
        match self {
            Decision::JoinAccusers { .. } => Some(ContagionRule::ForcedChoice),
            Decision::BefriendOther { .. } => Some(ContagionRule::EnemysEnemy),
            Decision::HearAccusation { .. } => Some(ContagionRule::HearAccusation),
            _ => None,
        }
    }

    /// Triangle delta carried by cascade-mode decisions
    pub fn triangle_delta(&self) -> Option<i64> {
        match self {
            Decision::Perturb { triangle_delta, .. }
            | Decision::FlipForPressure { triangle_delta, .. } => Some(*triangle_delta),
            _ => None,
        }
    }

    /// Whether the decision changed the graph
    pub fn is_action(&self) -> bool {
        !matches!(self, Decision::NoAction { .. })
    }

    /// Short snake_case label, matching the serialized tag
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Accuse { .. } => "accuse",
            Decision::JoinAccusers { .. } => "join_accusers",
            Decision::HearAccusation { .. } => "hear_accusation",
            Decision::BefriendOther { .. } => "befriend_other",
            Decision::Perturb { .. } => "perturb",
            Decision::FlipForPressure { .. } => "flip_for_pressure",
            Decision::NoAction { .. } => "no_action",
        }
    }
}
