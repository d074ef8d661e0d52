//! Shared test mocks and utilities for the prize shuffler.

mod clock;
mod rng;
mod sink;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use sink::{FailingResultsSink, RecordingResultsSink};
