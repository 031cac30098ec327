//! Engine Systems
//!
//! Balance analysis, move selection and the two simulation drivers.

pub mod balance;
pub mod cascade;
pub mod contagion;
pub mod select;

// Re-export commonly used systems
pub use balance::{BalanceAnalyzer, Triangle, TrianglePattern};
pub use cascade::{CascadeConfig, CascadeSimulator, Round};
pub use contagion::{ContagionSimulator, NodeChoice};
pub use select::{select_move, softmax_weights};
