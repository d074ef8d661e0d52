//! Application layer: the async driver and command/query handlers.

pub mod command_handlers;
pub mod query_handlers;
pub mod service;
