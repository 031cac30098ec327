//! Cascade-mode decision policy
//!
//! A pressured actor looks at the unbalanced triangles it belongs to and
//! picks one edge of its own to flip. Friendships are severed toward the
//! least-liked candidate; enmities are mended toward the most-liked one.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use mimetic_events::{EdgeKey, NodeId, Sign};

use crate::components::{FlipLedger, SignedGraph};
use crate::systems::BalanceAnalyzer;
use crate::SimRng;

/// One edge an actor may still flip to relieve pressure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipOption {
    pub actor: NodeId,
    pub target: NodeId,
    pub edge: EdgeKey,
    pub current: Sign,
    /// Social score of `target` when the option was built
    pub target_score: i32,
}

impl FlipOption {
    /// Flipping a friendship breaks it; flipping an enmity forms an alliance
    pub fn is_break(&self) -> bool {
        self.current.is_positive()
    }
}

/// The move an actor prefers, with the reason it gives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipChoice {
    pub option: FlipOption,
    pub rationale: String,
}

/// Every flip `actor` may legally make to resolve one of its unbalanced
/// triangles, in target name order.
///
/// Edges the actor has already flipped, and perturbation-locked edges, are
/// left out. Each target appears once even if it shares several triangles.
pub fn flip_options(graph: &SignedGraph, ledger: &FlipLedger, actor: &str) -> Vec<FlipOption> {
    let analyzer = BalanceAnalyzer::new(graph);
    let mut options: BTreeMap<NodeId, FlipOption> = BTreeMap::new();

    for triangle in analyzer.node_unbalanced_triangles(actor) {
        for other in triangle.others(actor) {
            if options.contains_key(other) {
                continue;
            }
            let edge = EdgeKey::new(actor, other);
            if !ledger.can_flip(actor, &edge) {
                continue;
            }
            let Some(current) = graph.sign_of(&edge) else {
                continue;
            };
            options.insert(
                other.to_string(),
                FlipOption {
                    actor: actor.to_string(),
                    target: other.to_string(),
                    edge,
                    current,
                    target_score: analyzer.score(other),
                },
            );
        }
    }

    options.into_values().collect()
}

/// Pick the actor's preferred flip among `options`.
///
/// Breaking a friendship takes priority over forming an alliance. Score ties
/// go to the first name when the run is seeded and to a random candidate
/// otherwise. Returns `None` when the actor has nothing left to flip.
pub fn choose_flip(options: &[FlipOption], rng: &mut SimRng) -> Option<FlipChoice> {
    let breaks: Vec<&FlipOption> = options.iter().filter(|o| o.is_break()).collect();
    let (pool, best) = if breaks.is_empty() {
        let best = options.iter().map(|o| o.target_score).max()?;
        (options.iter().collect::<Vec<_>>(), best)
    } else {
        let best = breaks.iter().map(|o| o.target_score).min()?;
        (breaks, best)
    };

    let tied: Vec<&FlipOption> = pool
        .into_iter()
        .filter(|o| o.target_score == best)
        .collect();

    let chosen = if rng.is_seeded() {
        tied.first().copied()?
    } else {
        tied.choose(rng).copied()?
    };

    Some(FlipChoice {
        option: chosen.clone(),
        rationale: rationale_for(chosen, tied.len()),
    })
}

fn rationale_for(option: &FlipOption, tied: usize) -> String {
    let tie_note = if tied > 1 {
        format!(" (tied with {} others)", tied - 1)
    } else {
        String::new()
    };
    if option.is_break() {
        format!(
            "{} breaks with {}, the least-liked friend in an unbalanced triangle (score {}){}",
            option.actor, option.target, option.target_score, tie_note
        )
    } else {
        format!(
            "{} allies with {}, the most-liked enemy in an all-negative triangle (score {}){}",
            option.actor, option.target, option.target_score, tie_note
        )
    }
}
