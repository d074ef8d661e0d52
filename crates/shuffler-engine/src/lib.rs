//! Prize shuffler — selection engine.
//!
//! Owns the candidate pool, shuffles it for display, draws three winners
//! and reveals them on a staggered schedule while the unrevealed slots
//! flicker through random pool values.

pub mod application;
pub mod domain;
