//! Mimetic Contagion Engine Library
//!
//! Public API for the signed-graph contagion engine: the graph model, the
//! structural-balance analyzer, the mimetic decision rules and the cascade
//! and contagion simulators that apply them.

use rand::rngs::SmallRng;
use rand::{Error as RandError, RngCore, SeedableRng};

pub mod actions;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod setup;
pub mod systems;

pub use components::{FlipLedger, SignedGraph};
pub use error::{SimError, SimResult};
pub use systems::{
    BalanceAnalyzer, CascadeConfig, CascadeSimulator, ContagionSimulator, NodeChoice, Triangle,
    TrianglePattern,
};

pub use mimetic_events::{
    CascadeOutcome, CascadeReport, CascadeStep, ContagionPhase, ContagionReport, ContagionRule,
    ContagionStep, ContagionWarning, Decision, EdgeKey, FinalSummary, GraphSnapshot, NodeId, Sign,
};

/// Seeded random number generator threaded through a single run.
///
/// A run without a seed still needs randomness; it draws from entropy and
/// gives up reproducibility. Tie-breaks consult [`SimRng::is_seeded`]:
/// seeded runs break ties by name, unseeded runs break them at random.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: SmallRng,
    seed: Option<u64>,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            seed: None,
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_seeded(&self) -> bool {
        self.seed.is_some()
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.rng.try_fill_bytes(dest)
    }
}
