//! Shuffler Core — shared abstractions.
//!
//! This crate defines the traits and types the selection engine and its
//! hosts depend on: time, randomness, timers, errors, events and the
//! results sink. It contains no I/O.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod rng;
pub mod sink;
pub mod slot;
pub mod timer;
