//! Signs and Edge Keys
//!
//! The two primitive values every record in this crate is built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier. Nodes are opaque names ordered lexicographically.
pub type NodeId = String;

/// Sign of a relationship: friend (+1) or enemy (-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// Numeric value of the sign (+1 or -1)
    pub fn value(self) -> i8 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }

    /// The opposite sign
    pub fn flipped(self) -> Self {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Sign::Positive
    }

    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }

    /// Short symbol used in chains and triangle patterns
    pub fn symbol(self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }

    /// Numeric value of an optional sign, 0 meaning "no edge"
    pub fn value_of(sign: Option<Sign>) -> i8 {
        sign.map(Sign::value).unwrap_or(0)
    }
}

impl From<Sign> for i8 {
    fn from(sign: Sign) -> Self {
        sign.value()
    }
}

impl TryFrom<i8> for Sign {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Sign::Positive),
            -1 => Ok(Sign::Negative),
            other => Err(format!("edge sign must be +1 or -1, got {}", other)),
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Canonical key of an undirected edge.
///
/// The smaller identifier always comes first, so `(u, v)` and `(v, u)`
/// normalize to the same key. Serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId)")]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    pub fn new(u: impl Into<NodeId>, v: impl Into<NodeId>) -> Self {
        let (u, v) = (u.into(), v.into());
        if u <= v {
            Self(u, v)
        } else {
            Self(v, u)
        }
    }

    /// Lexicographically smaller endpoint
    pub fn first(&self) -> &str {
        &self.0
    }

    /// Lexicographically larger endpoint
    pub fn second(&self) -> &str {
        &self.1
    }

    pub fn contains(&self, node: &str) -> bool {
        self.0 == node || self.1 == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint
    pub fn other(&self, node: &str) -> Option<&str> {
        if self.0 == node {
            Some(&self.1)
        } else if self.1 == node {
            Some(&self.0)
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.0 == self.1
    }
}

impl From<(NodeId, NodeId)> for EdgeKey {
    fn from((u, v): (NodeId, NodeId)) -> Self {
        Self::new(u, v)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}↔{}", self.0, self.1)
    }
}
