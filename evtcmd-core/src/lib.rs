//! # evtcmd-core
//!
//! Command dispatch for evtcmd.
//!
//! This crate provides:
//! - The command handler abstraction
//! - An ordered, capacity-bounded command registry
//! - A listener that gates polling and ties a scanner to a registry

pub mod error;
pub mod handler;
pub mod listener;
pub mod registry;

pub use error::CoreError;
pub use handler::{CommandHandler, ListenerGate};
pub use listener::CommandListener;
pub use registry::{CommandRegistry, DispatchOutcome};

/// Default number of registrations a registry accepts.
pub const DEFAULT_MAX_COMMANDS: usize = 10;
