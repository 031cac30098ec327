//! Balance Analyzer
//!
//! Triangle enumeration, structural balance, social scores and the
//! triangle delta of hypothetical flips. Everything here is derived from the
//! graph on demand; nothing is cached across mutations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mimetic_events::{FinalSummary, NodeId, Sign};

use crate::components::SignedGraph;
use crate::error::{SimError, SimResult};

/// Sign pattern of a triangle, independent of which edge carries which sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrianglePattern {
    /// `+++` balanced: three friends
    AllPositive,
    /// `++-` unbalanced: two friends who are enemies of each other
    OneNegative,
    /// `+--` balanced: two friends with a common enemy
    TwoNegative,
    /// `---` unbalanced: three mutual enemies
    AllNegative,
}

impl TrianglePattern {
    pub fn symbol(self) -> &'static str {
        match self {
            TrianglePattern::AllPositive => "+++",
            TrianglePattern::OneNegative => "++-",
            TrianglePattern::TwoNegative => "+--",
            TrianglePattern::AllNegative => "---",
        }
    }
}

/// Three mutually connected nodes and the signs between them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle {
    /// Members in name order `[a, b, c]`
    pub nodes: [NodeId; 3],
    /// Signs of `(a, b)`, `(b, c)`, `(a, c)`
    pub signs: [Sign; 3],
}

impl Triangle {
    /// Build the triangle on three nodes, if all three edges exist
    pub fn from_graph(graph: &SignedGraph, x: &str, y: &str, z: &str) -> Option<Self> {
        let mut names = [x, y, z];
        names.sort_unstable();
        let [a, b, c] = names;
        let signs = [
            graph.get_edge(a, b)?,
            graph.get_edge(b, c)?,
            graph.get_edge(a, c)?,
        ];
        Some(Self {
            nodes: [a.to_string(), b.to_string(), c.to_string()],
            signs,
        })
    }

    pub fn negative_count(&self) -> usize {
        self.signs.iter().filter(|s| s.is_negative()).count()
    }

    /// Balanced iff the product of the three signs is +1
    pub fn is_balanced(&self) -> bool {
        self.negative_count() % 2 == 0
    }

    pub fn is_unbalanced(&self) -> bool {
        !self.is_balanced()
    }

    pub fn pattern(&self) -> TrianglePattern {
        match self.negative_count() {
            0 => TrianglePattern::AllPositive,
            1 => TrianglePattern::OneNegative,
            2 => TrianglePattern::TwoNegative,
            _ => TrianglePattern::AllNegative,
        }
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    /// The two members other than `node`
    pub fn others<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.nodes
            .iter()
            .map(String::as_str)
            .filter(move |n| *n != node)
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}) [{}]",
            self.nodes[0],
            self.nodes[1],
            self.nodes[2],
            self.pattern().symbol()
        )
    }
}

/// Read-only structural-balance view over a graph
#[derive(Debug, Clone, Copy)]
pub struct BalanceAnalyzer<'a> {
    graph: &'a SignedGraph,
}

impl<'a> BalanceAnalyzer<'a> {
    pub fn new(graph: &'a SignedGraph) -> Self {
        Self { graph }
    }

    /// Every triangle in the graph, ordered by member names.
    ///
    /// Uses neighbor intersection: each triangle is found once, from its
    /// lexicographically smallest member.
    pub fn enumerate_triangles(&self) -> Vec<Triangle> {
        let mut triangles = Vec::new();
        for a in self.graph.nodes() {
            let later: Vec<&str> = self.graph.neighbors(a).filter(|n| *n > a).collect();
            for (i, b) in later.iter().enumerate() {
                for c in &later[i + 1..] {
                    if let Some(triangle) = Triangle::from_graph(self.graph, a, b, c) {
                        triangles.push(triangle);
                    }
                }
            }
        }
        triangles
    }

    pub fn unbalanced_triangles(&self) -> Vec<Triangle> {
        self.enumerate_triangles()
            .into_iter()
            .filter(Triangle::is_unbalanced)
            .collect()
    }

    /// Triangles that include `node`
    pub fn node_triangles(&self, node: &str) -> Vec<Triangle> {
        let around: Vec<&str> = self.graph.neighbors(node).collect();
        let mut triangles = Vec::new();
        for (i, b) in around.iter().enumerate() {
            for c in &around[i + 1..] {
                if let Some(triangle) = Triangle::from_graph(self.graph, node, b, c) {
                    triangles.push(triangle);
                }
            }
        }
        triangles
    }

    /// Unbalanced triangles that put pressure on `node`
    pub fn node_unbalanced_triangles(&self, node: &str) -> Vec<Triangle> {
        self.node_triangles(node)
            .into_iter()
            .filter(Triangle::is_unbalanced)
            .collect()
    }

    /// Nodes that belong to at least one unbalanced triangle
    pub fn pressured_nodes(&self) -> BTreeSet<NodeId> {
        self.unbalanced_triangles()
            .into_iter()
            .flat_map(|t| t.nodes)
            .collect()
    }

    pub fn is_pressured(&self, node: &str) -> bool {
        !self.node_unbalanced_triangles(node).is_empty()
    }

    /// True when no unbalanced triangle exists
    pub fn is_balanced(&self) -> bool {
        self.enumerate_triangles().iter().all(Triangle::is_balanced)
    }

    /// Friends minus enemies
    pub fn score(&self, node: &str) -> i32 {
        self.graph
            .neighbors(node)
            .filter_map(|other| self.graph.get_edge(node, other))
            .map(|sign| i32::from(sign.value()))
            .sum()
    }

    pub fn scores(&self) -> BTreeMap<NodeId, i32> {
        self.graph
            .nodes()
            .map(|node| (node.to_string(), self.score(node)))
            .collect()
    }

    /// Unbalanced triangles before minus after flipping `(u, v)`.
    ///
    /// Positive means the flip reduces global imbalance. Only triangles on the
    /// edge change balance, so only those are examined; the graph is untouched.
    pub fn triangle_delta(&self, u: &str, v: &str) -> SimResult<i64> {
        let uv = self
            .graph
            .get_edge(u, v)
            .ok_or_else(|| SimError::MissingEdge(u.to_string(), v.to_string()))?;

        let mut delta = 0i64;
        for w in self.graph.neighbors(u) {
            if w == v {
                continue;
            }
            let (Some(uw), Some(vw)) = (self.graph.get_edge(u, w), self.graph.get_edge(v, w)) else {
                continue;
            };
            let product = uv.value() * uw.value() * vw.value();
            // Unbalanced now: resolved by the flip. Balanced now: broken by it.
            delta += if product < 0 { 1 } else { -1 };
        }
        Ok(delta)
    }

    /// Scores, balance and edge counts for reporting
    pub fn summary(&self) -> FinalSummary {
        FinalSummary {
            scores: self.scores(),
            balanced: self.is_balanced(),
            unbalanced_triangles: self.unbalanced_triangles().len(),
            positive_edges: self.graph.positive_edge_count(),
            negative_edges: self.graph.negative_edge_count(),
        }
    }
}
