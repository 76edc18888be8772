//! # evtcmd-host
//!
//! Host runtime for evtcmd.
//!
//! This crate provides:
//! - YAML configuration with environment overrides
//! - A byte source fed from an async reader through a channel
//! - Built-in device commands
//! - The blocking poll loop that drives a listener

pub mod channel;
pub mod commands;
pub mod config;
pub mod error;
pub mod runner;

pub use channel::{pump, ChannelSource};
pub use commands::{register_builtins, DeviceContext, BUILTINS};
pub use config::{Config, InputConfig, PollConfig, RegistryConfig, ScannerConfig};
pub use error::HostError;
pub use runner::{build_listener, run_poll_loop, PollStats};
