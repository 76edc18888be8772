//! Host configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via EVTCMD_CONFIG or --config)
//! 3. Environment variables
//! 4. Command-line flags (applied by the binary)

use evtcmd_core::DEFAULT_MAX_COMMANDS;
use evtcmd_protocol::{DEFAULT_MAX_FIELD_LEN, DEFAULT_READ_DELAY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration.
    pub input: InputConfig,
    /// Frame scanner configuration.
    pub scanner: ScannerConfig,
    /// Command registry configuration.
    pub registry: RegistryConfig,
    /// Poll loop configuration.
    pub poll: PollConfig,
}

impl Config {
    /// Loads configuration from the file named by EVTCMD_CONFIG, if any,
    /// then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("EVTCMD_CONFIG").ok().map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Loads configuration from an optional file, then applies environment
    /// variable overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.input.apply_overrides(&lookup);
        self.scanner.apply_overrides(&lookup);
        self.registry.apply_overrides(&lookup);
        self.poll.apply_overrides(&lookup);
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "input.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.registry.max_commands == 0 {
            return Err(ConfigError::ValidationError(
                "registry.max_commands must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File to read commands from. Standard input when unset.
    pub path: Option<PathBuf>,
    /// Maximum bytes handed to the scanner per read.
    pub chunk_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            chunk_size: 256,
        }
    }
}

impl InputConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("EVTCMD_INPUT") {
            self.path = if path.is_empty() || path == "-" {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }

        if let Some(size) = parse_override(lookup, "EVTCMD_CHUNK_SIZE") {
            self.chunk_size = size;
        }
    }
}

/// Frame scanner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Pause before each byte read in milliseconds (0 = no pacing).
    pub read_delay_ms: u64,
    /// Maximum bytes per command or data field (0 = unlimited).
    pub max_field_len: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            read_delay_ms: DEFAULT_READ_DELAY.as_millis() as u64,
            max_field_len: DEFAULT_MAX_FIELD_LEN,
        }
    }
}

impl ScannerConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(ms) = parse_override(lookup, "EVTCMD_READ_DELAY_MS") {
            self.read_delay_ms = ms;
        }

        if let Some(max) = parse_override(lookup, "EVTCMD_MAX_FIELD_LEN") {
            self.max_field_len = max;
        }
    }

    /// Returns the read delay as Duration.
    pub fn read_delay(&self) -> Duration {
        Duration::from_millis(self.read_delay_ms)
    }
}

/// Command registry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of command registrations.
    pub max_commands: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_commands: DEFAULT_MAX_COMMANDS,
        }
    }
}

impl RegistryConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(max) = parse_override(lookup, "EVTCMD_MAX_COMMANDS") {
            self.max_commands = max;
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Sleep between polls that found no complete frame, in milliseconds.
    pub idle_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { idle_ms: 10 }
    }
}

impl PollConfig {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(ms) = parse_override(lookup, "EVTCMD_POLL_IDLE_MS") {
            self.idle_ms = ms;
        }
    }

    /// Returns the idle sleep as Duration.
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    IoError(PathBuf, std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}
