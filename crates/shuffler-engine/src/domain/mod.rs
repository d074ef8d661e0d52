//! Domain model: configuration, selection rules, events, commands and the
//! engine state machine.

pub mod commands;
pub mod config;
pub mod engine;
pub mod events;
pub mod selection;
