//! Decision policies
//!
//! What a single actor does when it is under pressure (cascade mode) or
//! reached by an accusation (contagion mode).

pub mod contagion;
pub mod pressure;

pub use contagion::{decide_and_apply, enemys_enemy, forced_choice, hear_accusation, no_action};
pub use pressure::{choose_flip, flip_options, FlipChoice, FlipOption};
