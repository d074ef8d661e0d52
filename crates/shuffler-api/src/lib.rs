//! Prize shuffler HTTP wrapper.
//!
//! Mounts a single selection engine and exposes its render state and its
//! four controls over JSON.

pub mod config;
pub mod error;
pub mod routes;
pub mod sink;
pub mod state;
