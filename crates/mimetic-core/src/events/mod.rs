//! Run logging

pub mod logger;

pub use logger::{LoggedStep, StepLogger};
