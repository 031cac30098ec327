//! Shared record types and serialization for the mimetic contagion engine.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod decision;
pub mod report;
pub mod sign;
pub mod snapshot;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export primitives
pub use sign::{EdgeKey, NodeId, Sign};

// Re-export decision types
pub use decision::{ContagionRule, Decision};

// Re-export snapshot types
pub use snapshot::{EdgeSnapshot, GraphSnapshot};

// Re-export report types
pub use report::{
    CascadeOutcome, CascadeReport, CascadeStep, ContagionPhase, ContagionReport, ContagionStep,
    ContagionWarning, FinalSummary,
};
