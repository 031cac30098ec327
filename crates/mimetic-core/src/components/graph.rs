//! Signed Graph
//!
//! Nodes joined by undirected friend (+1) or enemy (-1) edges.
//!
//! Every edge is stored once under its canonical [`EdgeKey`], so a query for
//! `(u, v)` and `(v, u)` always reads the same entry. A neighbor index is kept
//! alongside for fast traversal; it never carries signs of its own.

use std::collections::{BTreeMap, BTreeSet};

use mimetic_events::{EdgeKey, EdgeSnapshot, GraphSnapshot, NodeId, Sign};

use crate::error::{SimError, SimResult};

/// Undirected graph with signed edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedGraph {
    nodes: BTreeSet<NodeId>,
    edges: BTreeMap<EdgeKey, Sign>,
    neighbors: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl SignedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a complete graph where every pair shares an edge of `sign`
    pub fn complete<I, S>(nodes: I, sign: Sign) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }

        let names: Vec<NodeId> = graph.nodes.iter().cloned().collect();
        for (i, u) in names.iter().enumerate() {
            for v in &names[i + 1..] {
                graph.insert_edge(EdgeKey::new(u.clone(), v.clone()), sign);
            }
        }
        graph
    }

    /// Everyone friends with everyone
    pub fn complete_positive<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        Self::complete(nodes, Sign::Positive)
    }

    /// Everyone enemies with everyone
    pub fn complete_negative<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        Self::complete(nodes, Sign::Negative)
    }

    /// Add a node. Returns false if it was already present.
    pub fn add_node(&mut self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        self.neighbors.entry(node.clone()).or_default();
        self.nodes.insert(node)
    }

    /// Add or overwrite an edge, adding missing endpoints.
    ///
    /// Returns the previous sign, if the edge already existed.
    pub fn add_edge(
        &mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        sign: Sign,
    ) -> SimResult<Option<Sign>> {
        let key = EdgeKey::new(u, v);
        if key.is_self_loop() {
            return Err(SimError::invalid(format!(
                "self-loop on {} is not allowed",
                key.first()
            )));
        }
        self.add_node(key.first());
        self.add_node(key.second());
        Ok(self.insert_edge(key, sign))
    }

    fn insert_edge(&mut self, key: EdgeKey, sign: Sign) -> Option<Sign> {
        let (a, b) = (key.first().to_string(), key.second().to_string());
        self.neighbors.entry(a.clone()).or_default().insert(b.clone());
        self.neighbors.entry(b).or_default().insert(a);
        self.edges.insert(key, sign)
    }

    /// Flip an existing edge and return its new sign
    pub fn flip_edge(&mut self, u: &str, v: &str) -> SimResult<Sign> {
        match self.edges.get_mut(&EdgeKey::new(u, v)) {
            Some(sign) => {
                *sign = sign.flipped();
                Ok(*sign)
            }
            None => Err(SimError::MissingEdge(u.to_string(), v.to_string())),
        }
    }

    /// Sign of the edge between two nodes; `None` means no edge
    pub fn get_edge(&self, u: &str, v: &str) -> Option<Sign> {
        self.edges.get(&EdgeKey::new(u, v)).copied()
    }

    pub fn sign_of(&self, key: &EdgeKey) -> Option<Sign> {
        self.edges.get(key).copied()
    }

    pub fn has_edge(&self, u: &str, v: &str) -> bool {
        self.edges.contains_key(&EdgeKey::new(u, v))
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// All nodes sharing an edge with `node`, in name order
    pub fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.neighbors
            .get(node)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Neighbors joined to `node` by an edge of the given sign
    pub fn neighbors_with_sign(&self, node: &str, sign: Sign) -> Vec<NodeId> {
        self.neighbors(node)
            .filter(|other| self.get_edge(node, other) == Some(sign))
            .map(str::to_string)
            .collect()
    }

    pub fn friends(&self, node: &str) -> Vec<NodeId> {
        self.neighbors_with_sign(node, Sign::Positive)
    }

    pub fn enemies(&self, node: &str) -> Vec<NodeId> {
        self.neighbors_with_sign(node, Sign::Negative)
    }

    pub fn degree(&self, node: &str) -> usize {
        self.neighbors.get(node).map_or(0, BTreeSet::len)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, Sign)> {
        self.edges.iter().map(|(key, sign)| (key, *sign))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn positive_edge_count(&self) -> usize {
        self.edges.values().filter(|s| s.is_positive()).count()
    }

    pub fn negative_edge_count(&self) -> usize {
        self.edges.values().filter(|s| s.is_negative()).count()
    }

    /// Freeze the graph into a serializable snapshot
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.iter().cloned().collect(),
            edges: self
                .edges
                .iter()
                .map(|(key, sign)| EdgeSnapshot::new(key.first(), key.second(), *sign))
                .collect(),
        }
    }

    /// Rebuild a graph from a snapshot
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> SimResult<Self> {
        let mut graph = Self::new();
        for node in &snapshot.nodes {
            graph.add_node(node.clone());
        }
        for edge in &snapshot.edges {
            graph.add_edge(edge.source.clone(), edge.target.clone(), edge.sign)?;
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_is_undirected() {
        let mut graph = SignedGraph::new();
        graph.add_edge("Betty", "Alice", Sign::Negative).unwrap();

        assert_eq!(graph.get_edge("Alice", "Betty"), Some(Sign::Negative));
        assert_eq!(graph.get_edge("Betty", "Alice"), Some(Sign::Negative));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_add_edge_overwrites() {
        let mut graph = SignedGraph::new();
        assert_eq!(graph.add_edge("A", "B", Sign::Positive).unwrap(), None);
        assert_eq!(
            graph.add_edge("B", "A", Sign::Negative).unwrap(),
            Some(Sign::Positive)
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_edge("A", "B"), Some(Sign::Negative));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = SignedGraph::new();
        let err = graph.add_edge("Alice", "Alice", Sign::Positive).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput(_)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_flip_twice_restores_sign() {
        let mut graph = SignedGraph::complete_positive(["A", "B", "C"]);
        assert_eq!(graph.flip_edge("A", "C").unwrap(), Sign::Negative);
        assert_eq!(graph.flip_edge("C", "A").unwrap(), Sign::Positive);
        assert_eq!(graph.get_edge("A", "C"), Some(Sign::Positive));
    }

    #[test]
    fn test_flip_missing_edge() {
        let mut graph = SignedGraph::new();
        graph.add_node("A");
        graph.add_node("B");
        assert_eq!(
            graph.flip_edge("A", "B"),
            Err(SimError::MissingEdge("A".into(), "B".into()))
        );
    }

    #[test]
    fn test_absent_edge_is_distinct_from_signs() {
        let mut graph = SignedGraph::new();
        graph.add_edge("A", "B", Sign::Positive).unwrap();
        graph.add_node("C");
        assert_eq!(graph.get_edge("A", "C"), None);
        assert!(!graph.has_edge("C", "A"));
        assert_eq!(Sign::value_of(graph.get_edge("A", "C")), 0);
    }

    #[test]
    fn test_complete_graph() {
        let graph = SignedGraph::complete_negative(["A", "B", "C", "D"]);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.negative_edge_count(), 6);
        assert_eq!(graph.degree("A"), 3);
    }

    #[test]
    fn test_neighbors_sorted_and_signed() {
        let mut graph = SignedGraph::new();
        graph.add_edge("M", "Z", Sign::Positive).unwrap();
        graph.add_edge("M", "A", Sign::Negative).unwrap();
        graph.add_edge("M", "K", Sign::Positive).unwrap();
        graph.add_node("Lonely");

        let all: Vec<&str> = graph.neighbors("M").collect();
        assert_eq!(all, vec!["A", "K", "Z"]);
        assert_eq!(graph.friends("M"), vec!["K".to_string(), "Z".to_string()]);
        assert_eq!(graph.enemies("M"), vec!["A".to_string()]);
        assert_eq!(graph.neighbors("Lonely").count(), 0);
        assert_eq!(graph.neighbors("Nobody").count(), 0);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = SignedGraph::complete_positive(["A", "B"]);
        let mut copy = original.clone();
        copy.flip_edge("A", "B").unwrap();
        assert_eq!(original.get_edge("A", "B"), Some(Sign::Positive));
        assert_eq!(copy.get_edge("A", "B"), Some(Sign::Negative));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut graph = SignedGraph::complete_positive(["A", "B", "C"]);
        graph.flip_edge("B", "C").unwrap();
        graph.add_node("D");

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.nodes.len(), 4);
        assert_eq!(snapshot.sign_of("C", "B"), Some(Sign::Negative));

        let rebuilt = SignedGraph::from_snapshot(&snapshot).unwrap();
        assert_eq!(rebuilt, graph);
    }
}
