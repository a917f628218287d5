//! Domain models for the surgery tracker.

mod patient;
mod timestamp;

pub use patient::*;
pub use timestamp::*;
