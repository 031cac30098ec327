//! Move Selection
//!
//! Picks one move among the candidates of a cascade round, controlled by
//! rationality: 1.0 always takes the best triangle delta, 0.0 ignores deltas
//! entirely, and values in between sample from a softmax over deltas.

use rand::Rng;

use crate::SimRng;

/// Index of the chosen move, or `None` if there are no candidates.
///
/// `epsilon` keeps the softmax temperature `1 / (r + epsilon)` finite as
/// rationality approaches zero.
pub fn select_move(
    deltas: &[i64],
    rationality: f64,
    epsilon: f64,
    rng: &mut SimRng,
) -> Option<usize> {
    if deltas.is_empty() {
        return None;
    }

    if rationality >= 1.0 {
        return Some(best_move(deltas, rng));
    }

    if rationality <= 0.0 {
        return Some(rng.gen_range(0..deltas.len()));
    }

    let temperature = 1.0 / (rationality + epsilon);
    let weights = softmax_weights(deltas, temperature);
    Some(weighted_random_choice(rng, &weights))
}

/// Argmax over deltas. Ties go to the first index when seeded, otherwise to a
/// random tied index.
fn best_move(deltas: &[i64], rng: &mut SimRng) -> usize {
    let best = deltas.iter().copied().max().unwrap_or_default();
    let tied: Vec<usize> = deltas
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == best)
        .map(|(i, _)| i)
        .collect();

    if rng.is_seeded() || tied.len() == 1 {
        tied[0]
    } else {
        tied[rng.gen_range(0..tied.len())]
    }
}

/// Unnormalized softmax weights, shifted by the max delta so large deltas
/// cannot overflow `exp`.
pub fn softmax_weights(deltas: &[i64], temperature: f64) -> Vec<f64> {
    let max = deltas.iter().copied().max().unwrap_or_default() as f64;
    deltas
        .iter()
        .map(|d| ((*d as f64 - max) / temperature).exp())
        .collect()
}

/// Weighted random selection over non-negative weights
fn weighted_random_choice<R: Rng>(rng: &mut R, weights: &[f64]) -> usize {
    let total_weight: f64 = weights.iter().sum();

    if total_weight <= 0.0 || !total_weight.is_finite() {
        return 0;
    }

    let mut roll: f64 = rng.gen::<f64>() * total_weight;

    for (i, weight) in weights.iter().enumerate() {
        roll -= weight;
        if roll <= 0.0 {
            return i;
        }
    }

    // Rounding can leave a sliver past the last weight
    weights.len() - 1
}
