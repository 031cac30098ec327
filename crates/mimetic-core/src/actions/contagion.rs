//! Contagion-mode decision policy
//!
//! The three accusation rules, as proposals. Each function reads the graph
//! and returns the decisions a node would make; [`apply`] carries them out.
//!
//! Priority: rule 3 (hear accusation) and rule 1 (forced choice) are
//! mutually exclusive, and at most one fires per visit. Rule 2 (enemy's
//! enemy) is then evaluated against the updated edges and may fire once per
//! qualifying neighbor.

use std::collections::BTreeSet;

use mimetic_events::{Decision, EdgeKey, NodeId, Sign};

use crate::components::SignedGraph;
use crate::error::SimResult;

/// First friend of `node` who is already an accuser
fn accusing_friend(graph: &SignedGraph, node: &str, accusers: &BTreeSet<NodeId>) -> Option<NodeId> {
    graph
        .friends(node)
        .into_iter()
        .find(|friend| accusers.contains(friend))
}

/// Rule 3: no edge to the scapegoat, but an accusing friend
pub fn hear_accusation(
    graph: &SignedGraph,
    node: &str,
    scapegoat: &str,
    accusers: &BTreeSet<NodeId>,
) -> Option<Decision> {
    if graph.has_edge(node, scapegoat) {
        return None;
    }
    let source = accusing_friend(graph, node, accusers)?;
    Some(Decision::HearAccusation {
        rationale: format!(
            "{} hears from friend {} that {} is to blame and turns against {}",
            node, source, scapegoat, scapegoat
        ),
        actor: node.to_string(),
        scapegoat: scapegoat.to_string(),
        source,
        edge: EdgeKey::new(node, scapegoat),
        to: Sign::Negative,
    })
}

/// Rule 1: friend of the scapegoat, but also friend of an accuser
pub fn forced_choice(
    graph: &SignedGraph,
    node: &str,
    scapegoat: &str,
    accusers: &BTreeSet<NodeId>,
) -> Option<Decision> {
    if graph.get_edge(node, scapegoat) != Some(Sign::Positive) {
        return None;
    }
    let source = accusing_friend(graph, node, accusers)?;
    Some(Decision::JoinAccusers {
        rationale: format!(
            "{} must choose between friends {} and {} and sides with the accuser {}",
            node, source, scapegoat, source
        ),
        actor: node.to_string(),
        scapegoat: scapegoat.to_string(),
        source,
        edge: EdgeKey::new(node, scapegoat),
        from: Sign::Positive,
        to: Sign::Negative,
    })
}

/// Rule 2: every enemy of `node` who is also an enemy of the scapegoat
/// becomes a friend.
pub fn enemys_enemy(graph: &SignedGraph, node: &str, scapegoat: &str) -> Vec<Decision> {
    if graph.get_edge(node, scapegoat) != Some(Sign::Negative) {
        return Vec::new();
    }
    graph
        .enemies(node)
        .into_iter()
        .filter(|other| other != scapegoat)
        .filter(|other| graph.get_edge(scapegoat, other) == Some(Sign::Negative))
        .map(|other| Decision::BefriendOther {
            rationale: format!(
                "{} and {} are both enemies of {}; the enemy of my enemy is my friend",
                node, other, scapegoat
            ),
            actor: node.to_string(),
            edge: EdgeKey::new(node, other.as_str()),
            other,
            scapegoat: scapegoat.to_string(),
            from: Sign::Negative,
            to: Sign::Positive,
        })
        .collect()
}

/// Record for a node no rule applied to
pub fn no_action(graph: &SignedGraph, node: &str, scapegoat: &str) -> Decision {
    let rationale = match graph.get_edge(node, scapegoat) {
        Some(Sign::Positive) => format!(
            "{} stays loyal to {}: no friend among the accusers",
            node, scapegoat
        ),
        Some(Sign::Negative) => format!(
            "{} already opposes {} and has no enemy to reconcile with",
            node, scapegoat
        ),
        None => format!(
            "{} has no tie to {} and no accusing friend",
            node, scapegoat
        ),
    };
    Decision::NoAction {
        actor: node.to_string(),
        rationale,
    }
}

/// Carry out a contagion decision on the graph.
///
/// Flips require the edge to exist; accusations may create it.
pub fn apply(graph: &mut SignedGraph, decision: &Decision) -> SimResult<()> {
    match decision {
        Decision::Accuse { edge, to, .. } | Decision::HearAccusation { edge, to, .. } => {
            graph.add_edge(edge.first(), edge.second(), *to)?;
        }
        Decision::JoinAccusers { edge, to, .. }
        | Decision::BefriendOther { edge, to, .. }
        | Decision::FlipForPressure { edge, to, .. }
        | Decision::Perturb { edge, to, .. } => {
            if graph.get_edge(edge.first(), edge.second()) != Some(*to) {
                graph.flip_edge(edge.first(), edge.second())?;
            }
        }
        Decision::NoAction { .. } => {}
    }
    Ok(())
}

/// Run the rules for one visit of `node`, applying each decision as it is
/// made. Accusers gained by rule 1 or 3 are added to `accusers`.
pub fn decide_and_apply(
    graph: &mut SignedGraph,
    node: &str,
    scapegoat: &str,
    accusers: &mut BTreeSet<NodeId>,
) -> SimResult<Vec<Decision>> {
    let mut decisions = Vec::new();

    let turned = hear_accusation(graph, node, scapegoat, accusers)
        .or_else(|| forced_choice(graph, node, scapegoat, accusers));
    if let Some(decision) = turned {
        apply(graph, &decision)?;
        accusers.insert(node.to_string());
        decisions.push(decision);
    }

    for decision in enemys_enemy(graph, node, scapegoat) {
        apply(graph, &decision)?;
        decisions.push(decision);
    }

    if decisions.is_empty() {
        decisions.push(no_action(graph, node, scapegoat));
    }
    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accusers(names: &[&str]) -> BTreeSet<NodeId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_hear_accusation_creates_edge() {
        let mut graph = SignedGraph::new();
        graph.add_edge("Alice", "Betty", Sign::Negative).unwrap();
        graph.add_edge("Alice", "Charlie", Sign::Positive).unwrap();
        let mut set = accusers(&["Alice"]);

        let decisions = decide_and_apply(&mut graph, "Charlie", "Betty", &mut set).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].kind(), "hear_accusation");
        assert_eq!(graph.get_edge("Charlie", "Betty"), Some(Sign::Negative));
        assert!(set.contains("Charlie"));
    }

    #[test]
    fn test_forced_choice_flips_friendship() {
        let mut graph = SignedGraph::complete_positive(["Alice", "Betty", "Charlie"]);
        graph.flip_edge("Alice", "Betty").unwrap();
        let set = accusers(&["Alice"]);

        let decision = forced_choice(&graph, "Charlie", "Betty", &set).unwrap();
        assert!(matches!(
            &decision,
            Decision::JoinAccusers { source, .. } if source == "Alice"
        ));
        assert!(hear_accusation(&graph, "Charlie", "Betty", &set).is_none());
    }

    #[test]
    fn test_no_accusing_friend_means_no_turn() {
        let graph = SignedGraph::complete_positive(["Alice", "Betty", "Charlie"]);
        let set = accusers(&["Zed"]);
        assert!(forced_choice(&graph, "Charlie", "Betty", &set).is_none());
        assert!(matches!(
            no_action(&graph, "Charlie", "Betty"),
            Decision::NoAction { rationale, .. } if rationale.contains("loyal")
        ));
    }

    #[test]
    fn test_enemys_enemy_fires_per_triangle() {
        let mut graph = SignedGraph::complete_negative(["S", "V", "W1", "W2"]);
        graph.add_edge("V", "Friend", Sign::Positive).unwrap();

        let decisions = enemys_enemy(&graph, "V", "S");
        let others: Vec<&str> = decisions
            .iter()
            .map(|d| match d {
                Decision::BefriendOther { other, .. } => other.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(others, vec!["W1", "W2"]);
    }

    #[test]
    fn test_rule_two_runs_after_joining() {
        // V is S's friend, friend of accuser A, and enemy of W who already hates S
        let mut graph = SignedGraph::new();
        graph.add_edge("V", "S", Sign::Positive).unwrap();
        graph.add_edge("V", "A", Sign::Positive).unwrap();
        graph.add_edge("A", "S", Sign::Negative).unwrap();
        graph.add_edge("V", "W", Sign::Negative).unwrap();
        graph.add_edge("W", "S", Sign::Negative).unwrap();
        let mut set = accusers(&["A", "W"]);

        let decisions = decide_and_apply(&mut graph, "V", "S", &mut set).unwrap();
        let kinds: Vec<&str> = decisions.iter().map(Decision::kind).collect();
        assert_eq!(kinds, vec!["join_accusers", "befriend_other"]);
        assert_eq!(graph.get_edge("V", "W"), Some(Sign::Positive));
    }

    #[test]
    fn test_apply_flip_requires_edge() {
        let mut graph = SignedGraph::new();
        graph.add_node("A");
        graph.add_node("B");
        let decision = Decision::BefriendOther {
            actor: "A".into(),
            other: "B".into(),
            scapegoat: "S".into(),
            edge: EdgeKey::new("A", "B"),
            from: Sign::Negative,
            to: Sign::Positive,
            rationale: String::new(),
        };
        assert!(apply(&mut graph, &decision).is_err());
    }
}
