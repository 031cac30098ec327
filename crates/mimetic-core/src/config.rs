//! Configuration loading
//!
//! Run defaults are read from a TOML file (`mimetic.toml` by default). Every
//! table and field is optional; anything missing falls back to the built-in
//! defaults below. Command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::setup::GraphKind;
use crate::systems::CascadeConfig;

/// Default configuration path
pub const DEFAULT_CONFIG_PATH: &str = "mimetic.toml";

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MimeticConfig {
    pub run: RunConfig,
    pub cascade: CascadeConfig,
    pub contagion: ContagionConfig,
    pub generator: GeneratorConfig,
}

/// Settings shared by every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Fixed seed; absent means entropy and no reproducibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Where reports and step logs are written
    pub output_dir: PathBuf,
    /// Write a JSONL log with one line per decision
    pub log_steps: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            output_dir: PathBuf::from("output"),
            log_steps: false,
        }
    }
}

/// Default roles for contagion runs; absent roles are chosen at random
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContagionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scapegoat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuser: Option<String>,
}

/// Graph generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub kind: GraphKind,
    pub nodes: usize,
    /// Probability of a friendship edge (random and sparse graphs)
    pub p_positive: f64,
    /// Sparse graphs only
    pub min_degree: usize,
    /// Sparse graphs only
    pub max_degree: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GraphKind::Random,
            nodes: 10,
            p_positive: 0.5,
            min_degree: 3,
            max_degree: 10,
        }
    }
}

impl MimeticConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, or use defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file; using defaults");
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "Could not load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Commented starting point for a config file
pub fn default_config_toml() -> String {
    r#"# Mimetic contagion engine configuration

[run]
# seed = 42
output_dir = "output"
log_steps = false

[cascade]
max_steps = 1000
rationality = 0.5
softmax_epsilon = 0.01

[contagion]
# scapegoat = "Betty"
# accuser = "Alice"

[generator]
kind = "random"
nodes = 10
p_positive = 0.5
min_degree = 3
max_degree = 10
"#
    .to_string()
}
