//! Engine Components
//!
//! The signed graph and the per-run flip ledger.

pub mod graph;
pub mod ledger;

pub use graph::SignedGraph;
pub use ledger::FlipLedger;
