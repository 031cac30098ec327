//! Graph Setup
//!
//! Generated graphs for runs that do not load one from disk.

pub mod graphs;

pub use graphs::{
    complete_graph, generate, node_ids, random_complete_graph, sparse_graph, GeneratorError,
    GraphKind,
};
